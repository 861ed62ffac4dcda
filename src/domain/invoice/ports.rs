use async_trait::async_trait;
use uuid::Uuid;

use super::entities::{InvoiceAggregate, InvoiceItem};
use super::errors::InvoiceError;
use super::value_objects::{InvoiceNumber, ListOrder};

/// Filter and window for a listing query. `offset` and `limit` are already
/// resolved from the caller's page parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceQuery {
  pub search: Option<String>,
  pub offset: i64,
  pub limit: i64,
  pub order: ListOrder,
}

/// One window of invoices plus the number of rows matching the filter
#[derive(Debug, Clone, PartialEq)]
pub struct InvoicePage {
  pub items: Vec<InvoiceAggregate>,
  pub total_count: i64,
}

/// Storage for invoices and their items.
///
/// Every write method is atomic: either the invoice row and all of its items
/// change together, or nothing changes.
#[async_trait]
pub trait InvoiceRepository: Send + Sync {
  /// Inserts the invoice and its items. Fails with `Conflict` when the
  /// invoice number is taken.
  async fn create(&self, aggregate: InvoiceAggregate) -> Result<InvoiceAggregate, InvoiceError>;

  /// Overwrites the invoice row (keeping `created_at`) and replaces every
  /// item. Returns `None` when no invoice has that id.
  async fn replace(
    &self,
    aggregate: InvoiceAggregate,
  ) -> Result<Option<InvoiceAggregate>, InvoiceError>;

  /// Removes the invoice and its items. Returns `false` when nothing matched.
  async fn delete(&self, id: Uuid) -> Result<bool, InvoiceError>;

  async fn find_by_id(&self, id: Uuid) -> Result<Option<InvoiceAggregate>, InvoiceError>;

  async fn find_items_by_invoice_id(
    &self,
    invoice_id: Uuid,
  ) -> Result<Vec<InvoiceItem>, InvoiceError>;

  /// Greatest invoice number in the store, comparing by length first
  async fn find_last_invoice_number(&self) -> Result<Option<InvoiceNumber>, InvoiceError>;

  async fn search(&self, query: &InvoiceQuery) -> Result<InvoicePage, InvoiceError>;
}
