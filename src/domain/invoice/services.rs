use std::sync::Arc;
use uuid::Uuid;

use super::entities::{InvoiceAggregate, InvoiceItem};
use super::errors::InvoiceError;
use super::ports::{InvoiceQuery, InvoiceRepository};
use super::sequencer::{self, EMPTY_LAST_INVOICE_NUMBER};
use super::validation::{self, InvoicePayload};
use super::value_objects::ListOrder;

/// Paging knobs for the listing query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvoiceServiceConfig {
  pub default_page_size: u32,
  pub max_page_size: u32,
  pub default_order: ListOrder,
}

impl Default for InvoiceServiceConfig {
  fn default() -> Self {
    Self {
      default_page_size: 10,
      max_page_size: 100,
      default_order: ListOrder::InvoiceNumberDesc,
    }
  }
}

/// Listing request as it arrives from a caller; absent values fall back to
/// the service configuration.
#[derive(Debug, Clone, Default)]
pub struct InvoiceListFilter {
  pub search: Option<String>,
  pub page: Option<u32>,
  pub page_size: Option<u32>,
  pub order: Option<ListOrder>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceListing {
  pub invoices: Vec<InvoiceAggregate>,
  pub total_count: i64,
  pub page: u32,
  pub page_size: u32,
  pub total_pages: i64,
}

pub struct InvoiceService {
  invoice_repo: Arc<dyn InvoiceRepository>,
  config: InvoiceServiceConfig,
}

impl InvoiceService {
  pub fn new(invoice_repo: Arc<dyn InvoiceRepository>, config: InvoiceServiceConfig) -> Self {
    Self {
      invoice_repo,
      config,
    }
  }

  pub async fn create_invoice(
    &self,
    payload: InvoicePayload,
  ) -> Result<InvoiceAggregate, InvoiceError> {
    let validated = validation::validate(payload)?;
    let aggregate = InvoiceAggregate::create(validated);

    let created = self.invoice_repo.create(aggregate).await?;
    tracing::info!(
      "Created invoice {} ({}) with {} items, total {}",
      created.invoice.invoice_number,
      created.id(),
      created.items.len(),
      created.invoice.total_amount
    );
    Ok(created)
  }

  pub async fn update_invoice(
    &self,
    invoice_id: Option<&str>,
    payload: InvoicePayload,
  ) -> Result<InvoiceAggregate, InvoiceError> {
    let id = parse_invoice_id(invoice_id)?;
    let validated = validation::validate(payload)?;
    let aggregate = InvoiceAggregate::revise(id, validated);

    let updated = self
      .invoice_repo
      .replace(aggregate)
      .await?
      .ok_or_else(|| InvoiceError::NotFound(id.to_string()))?;
    tracing::info!(
      "Updated invoice {} ({}), now {} items, total {}",
      updated.invoice.invoice_number,
      id,
      updated.items.len(),
      updated.invoice.total_amount
    );
    Ok(updated)
  }

  pub async fn delete_invoice(&self, invoice_id: Option<&str>) -> Result<(), InvoiceError> {
    let id = parse_invoice_id(invoice_id)?;

    if !self.invoice_repo.delete(id).await? {
      tracing::warn!("Invoice {} not found for deletion", id);
      return Err(InvoiceError::NotFound(id.to_string()));
    }

    tracing::info!("Deleted invoice {}", id);
    Ok(())
  }

  pub async fn get_invoice(&self, invoice_id: &str) -> Result<InvoiceAggregate, InvoiceError> {
    let id = parse_invoice_id(Some(invoice_id))?;

    self
      .invoice_repo
      .find_by_id(id)
      .await?
      .ok_or_else(|| InvoiceError::NotFound(id.to_string()))
  }

  pub async fn get_invoice_items(&self, invoice_id: Uuid) -> Result<Vec<InvoiceItem>, InvoiceError> {
    self.invoice_repo.find_items_by_invoice_id(invoice_id).await
  }

  pub async fn list_invoices(
    &self,
    filter: InvoiceListFilter,
  ) -> Result<InvoiceListing, InvoiceError> {
    let page = filter.page.unwrap_or(1);
    if page < 1 {
      return Err(InvoiceError::InvalidQuery("page must be >= 1".to_string()));
    }

    let page_size = filter.page_size.unwrap_or(self.config.default_page_size);
    if page_size < 1 {
      return Err(InvoiceError::InvalidQuery(
        "limit must be >= 1".to_string(),
      ));
    }
    let page_size = page_size.min(self.config.max_page_size.max(1));

    let search = filter
      .search
      .map(|s| s.trim().to_string())
      .filter(|s| !s.is_empty());

    let query = InvoiceQuery {
      search,
      offset: (i64::from(page) - 1) * i64::from(page_size),
      limit: i64::from(page_size),
      order: filter.order.unwrap_or(self.config.default_order),
    };

    let result = self.invoice_repo.search(&query).await?;
    tracing::debug!(
      "Listed {} of {} invoices (page {}, size {}, search {:?})",
      result.items.len(),
      result.total_count,
      page,
      page_size,
      query.search
    );

    let total_pages = (result.total_count + query.limit - 1) / query.limit;

    Ok(InvoiceListing {
      invoices: result.items,
      total_count: result.total_count,
      page,
      page_size,
      total_pages,
    })
  }

  /// Greatest invoice number on file, or `INV/00000` when there is none
  pub async fn last_invoice_number(&self) -> Result<String, InvoiceError> {
    Ok(
      self
        .invoice_repo
        .find_last_invoice_number()
        .await?
        .map(|number| number.into_inner())
        .unwrap_or_else(|| EMPTY_LAST_INVOICE_NUMBER.to_string()),
    )
  }

  /// Number the next created invoice should carry
  pub async fn next_invoice_number(&self) -> Result<String, InvoiceError> {
    let last = self.invoice_repo.find_last_invoice_number().await?;
    Ok(sequencer::next_invoice_number(
      last.as_ref().map(|number| number.value()),
    )?)
  }
}

/// Blank ids are missing; ids that are not UUIDs cannot match any invoice.
fn parse_invoice_id(raw: Option<&str>) -> Result<Uuid, InvoiceError> {
  let raw = raw.map(str::trim).unwrap_or_default();
  if raw.is_empty() {
    return Err(InvoiceError::MissingId);
  }
  Uuid::parse_str(raw).map_err(|_| InvoiceError::NotFound(raw.to_string()))
}
