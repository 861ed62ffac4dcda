use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::invoice::{InvoiceAggregate, InvoiceError, InvoiceItem, InvoiceService};

#[derive(Debug)]
pub struct GetInvoiceCommand {
  pub invoice_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceItemDto {
  pub id: Uuid,
  pub description: String,
  pub quantity: i32,
  pub unit_price: Decimal,
  pub line_total: Decimal,
  pub line_order: i32,
}

impl From<InvoiceItem> for InvoiceItemDto {
  fn from(item: InvoiceItem) -> Self {
    Self {
      id: item.id,
      description: item.description.value().to_string(),
      quantity: item.quantity.value(),
      unit_price: item.unit_price.amount(),
      line_total: item.line_total.amount(),
      line_order: item.line_order,
    }
  }
}

/// Invoice together with its items, in submission order
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDto {
  pub id: Uuid,
  pub invoice_number: String,
  pub client_name: String,
  pub client_address: String,
  pub invoice_date: NaiveDate,
  pub issue_date: NaiveDate,
  pub due_date: NaiveDate,
  pub total_amount: Decimal,
  pub status: String,
  pub items: Vec<InvoiceItemDto>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl From<InvoiceAggregate> for InvoiceDto {
  fn from(aggregate: InvoiceAggregate) -> Self {
    let InvoiceAggregate { invoice, items } = aggregate;
    Self {
      id: invoice.id,
      invoice_number: invoice.invoice_number.into_inner(),
      client_name: invoice.client_name.value().to_string(),
      client_address: invoice.client_address,
      invoice_date: invoice.invoice_date,
      issue_date: invoice.issue_date,
      due_date: invoice.due_date,
      total_amount: invoice.total_amount.amount(),
      status: invoice.status.as_str().to_string(),
      items: items.into_iter().map(InvoiceItemDto::from).collect(),
      created_at: invoice.created_at,
      updated_at: invoice.updated_at,
    }
  }
}

pub struct GetInvoiceUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl GetInvoiceUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(&self, command: GetInvoiceCommand) -> Result<InvoiceDto, InvoiceError> {
    let aggregate = self
      .invoice_service
      .get_invoice(&command.invoice_id)
      .await?;

    Ok(aggregate.into())
  }
}
