pub mod entities;
pub mod errors;
pub mod ports;
pub mod sequencer;
pub mod services;
pub mod validation;
pub mod value_objects;

pub use entities::{Invoice, InvoiceAggregate, InvoiceItem, InvoiceTotals};
pub use errors::InvoiceError;
pub use ports::{InvoicePage, InvoiceQuery, InvoiceRepository};
pub use sequencer::{InvoiceNumberFormatError, next_invoice_number};
pub use services::{InvoiceListFilter, InvoiceListing, InvoiceService, InvoiceServiceConfig};
pub use validation::{InvoiceItemPayload, InvoicePayload, ValidationError};
pub use value_objects::{
  ClientName, InvoiceNumber, InvoiceStatus, LineItemDescription, ListOrder, Money, Quantity,
  ValueObjectError,
};
