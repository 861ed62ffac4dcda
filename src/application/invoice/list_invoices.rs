use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;

use super::get_invoice::InvoiceDto;
use crate::domain::invoice::{InvoiceError, InvoiceListFilter, InvoiceService, ListOrder};

#[derive(Debug, Default)]
pub struct ListInvoicesCommand {
  pub search: Option<String>,
  pub page: Option<u32>,
  pub page_size: Option<u32>,
  /// `number` or `created`; the configured default when absent
  pub sort: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListInvoicesResponse {
  pub items: Vec<InvoiceDto>,
  pub total_count: i64,
  pub page: u32,
  pub page_size: u32,
  pub total_pages: i64,
}

pub struct ListInvoicesUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl ListInvoicesUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(
    &self,
    command: ListInvoicesCommand,
  ) -> Result<ListInvoicesResponse, InvoiceError> {
    let order = command
      .sort
      .as_deref()
      .map(ListOrder::from_str)
      .transpose()
      .map_err(|e| InvoiceError::InvalidQuery(e.to_string()))?;

    let listing = self
      .invoice_service
      .list_invoices(InvoiceListFilter {
        search: command.search,
        page: command.page,
        page_size: command.page_size,
        order,
      })
      .await?;

    Ok(ListInvoicesResponse {
      items: listing.invoices.into_iter().map(InvoiceDto::from).collect(),
      total_count: listing.total_count,
      page: listing.page,
      page_size: listing.page_size,
      total_pages: listing.total_pages,
    })
  }
}
