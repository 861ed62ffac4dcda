use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::invoice::{InvoiceError, InvoicePayload, InvoiceService};

#[derive(Debug)]
pub struct UpdateInvoiceCommand {
  /// Kept as text so a blank or absent id is reported as missing
  pub invoice_id: Option<String>,
  pub payload: InvoicePayload,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInvoiceResponse {
  pub invoice_id: Uuid,
  pub invoice_number: String,
  pub total_amount: Decimal,
  pub updated_at: DateTime<Utc>,
}

pub struct UpdateInvoiceUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl UpdateInvoiceUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(
    &self,
    command: UpdateInvoiceCommand,
  ) -> Result<UpdateInvoiceResponse, InvoiceError> {
    let updated = self
      .invoice_service
      .update_invoice(command.invoice_id.as_deref(), command.payload)
      .await?;

    Ok(UpdateInvoiceResponse {
      invoice_id: updated.invoice.id,
      invoice_number: updated.invoice.invoice_number.into_inner(),
      total_amount: updated.invoice.total_amount.amount(),
      updated_at: updated.invoice.updated_at,
    })
  }
}
