use serde::Serialize;
use std::sync::Arc;

use crate::domain::invoice::{InvoiceError, InvoiceService};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceNumberResponse {
  pub invoice_number: String,
}

/// Reports the greatest invoice number issued so far (`INV/00000` when none).
pub struct GetLastInvoiceNumberUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl GetLastInvoiceNumberUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(&self) -> Result<InvoiceNumberResponse, InvoiceError> {
    Ok(InvoiceNumberResponse {
      invoice_number: self.invoice_service.last_invoice_number().await?,
    })
  }
}

/// Suggests the number for the next invoice.
pub struct GetNextInvoiceNumberUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl GetNextInvoiceNumberUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(&self) -> Result<InvoiceNumberResponse, InvoiceError> {
    Ok(InvoiceNumberResponse {
      invoice_number: self.invoice_service.next_invoice_number().await?,
    })
  }
}
