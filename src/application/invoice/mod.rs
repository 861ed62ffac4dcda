pub mod create_invoice;
pub mod delete_invoice;
pub mod get_invoice;
pub mod invoice_number;
pub mod list_invoices;
pub mod update_invoice;

pub use create_invoice::{CreateInvoiceCommand, CreateInvoiceResponse, CreateInvoiceUseCase};
pub use delete_invoice::{DeleteInvoiceCommand, DeleteInvoiceUseCase};
pub use get_invoice::{GetInvoiceCommand, GetInvoiceUseCase, InvoiceDto, InvoiceItemDto};
pub use invoice_number::{
  GetLastInvoiceNumberUseCase, GetNextInvoiceNumberUseCase, InvoiceNumberResponse,
};
pub use list_invoices::{ListInvoicesCommand, ListInvoicesResponse, ListInvoicesUseCase};
pub use update_invoice::{UpdateInvoiceCommand, UpdateInvoiceResponse, UpdateInvoiceUseCase};
