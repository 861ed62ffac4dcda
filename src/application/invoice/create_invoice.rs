use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::invoice::{InvoiceError, InvoicePayload, InvoiceService};

#[derive(Debug)]
pub struct CreateInvoiceCommand {
  pub payload: InvoicePayload,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceResponse {
  pub invoice_id: Uuid,
  pub invoice_number: String,
  pub total_amount: Decimal,
  pub created_at: DateTime<Utc>,
}

pub struct CreateInvoiceUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl CreateInvoiceUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(
    &self,
    command: CreateInvoiceCommand,
  ) -> Result<CreateInvoiceResponse, InvoiceError> {
    let created = self.invoice_service.create_invoice(command.payload).await?;

    Ok(CreateInvoiceResponse {
      invoice_id: created.invoice.id,
      invoice_number: created.invoice.invoice_number.into_inner(),
      total_amount: created.invoice.total_amount.amount(),
      created_at: created.invoice.created_at,
    })
  }
}
