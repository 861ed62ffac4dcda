use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;
use validator::Validate;

use crate::domain::invoice::{InvoiceItemPayload, InvoicePayload};

/// Body of `PUT /invoices`: the invoice fields plus the id they replace.
///
/// Fields are spelled out instead of flattening [`InvoicePayload`]; a
/// flattened struct is buffered by serde and loses exact price digits.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateInvoiceRequest {
  /// Absent and blank ids are both reported as missing
  pub invoice_id: Option<String>,
  pub invoice_number: String,
  pub customer_name: String,
  pub client_address: String,
  pub invoice_date: String,
  pub issue_date: String,
  pub due_date: String,
  pub status: String,
  pub invoice_items: Vec<InvoiceItemPayload>,
}

impl UpdateInvoiceRequest {
  /// Splits the body into the target id and the replacement payload
  pub fn into_parts(self) -> (Option<String>, InvoicePayload) {
    let payload = InvoicePayload {
      invoice_number: self.invoice_number,
      customer_name: self.customer_name,
      client_address: self.client_address,
      invoice_date: self.invoice_date,
      issue_date: self.issue_date,
      due_date: self.due_date,
      status: self.status,
      invoice_items: self.invoice_items,
    };
    (self.invoice_id, payload)
  }
}

/// Query string of `DELETE /invoices`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteInvoiceQuery {
  #[serde(default)]
  pub invoice_id: Option<String>,
}

/// Query string of `GET /invoices`
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ListInvoicesQuery {
  /// Case-insensitive substring of the invoice number
  #[validate(length(max = 50, message = "search cannot exceed 50 characters"))]
  pub search: Option<String>,

  /// 1-based page number
  #[validate(range(min = 1, message = "page must be >= 1"))]
  pub page: Option<u32>,

  /// Page size; capped by the server
  #[validate(range(min = 1, message = "limit must be >= 1"))]
  pub limit: Option<u32>,

  /// `number` (default) or `created`
  pub sort: Option<String>,
}

/// Response after a successful create, update or delete
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationResponse {
  pub success: bool,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub invoice_id: Option<Uuid>,

  pub message: String,
}

impl MutationResponse {
  pub fn new(invoice_id: Option<Uuid>, message: impl Into<String>) -> Self {
    Self {
      success: true,
      invoice_id,
      message: message.into(),
    }
  }
}

/// Standard error response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
  /// Always `false`
  pub success: bool,

  /// Human-readable error message
  pub error: String,

  /// Per-field messages for validation failures
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub field_errors: Option<BTreeMap<String, Vec<String>>>,
}

#[cfg(test)]
mod tests {
  use super::*;
  use rust_decimal_macros::dec;

  #[test]
  fn test_list_query_validation() {
    let query = ListInvoicesQuery {
      page: Some(2),
      limit: Some(20),
      ..Default::default()
    };
    assert!(query.validate().is_ok());

    let query = ListInvoicesQuery {
      page: Some(0),
      ..Default::default()
    };
    assert!(query.validate().is_err());

    let query = ListInvoicesQuery {
      limit: Some(0),
      ..Default::default()
    };
    assert!(query.validate().is_err());

    let query = ListInvoicesQuery {
      search: Some("x".repeat(51)),
      ..Default::default()
    };
    assert!(query.validate().is_err());
  }

  #[test]
  fn test_update_request_splits_into_id_and_payload() {
    let json = r#"{
      "invoiceId": "0b6f3f0e-6f5e-4a57-9a8e-2f4d2b1c9e11",
      "invoiceNumber": "INV/00003",
      "customerName": "Initech",
      "invoiceItems": [
        {"description": "Staplers", "quantity": 4, "price": "2.50"},
        {"description": "Toner", "quantity": 1, "price": 2.0049999999999999}
      ]
    }"#;
    let request: UpdateInvoiceRequest = serde_json::from_str(json).unwrap();
    let (invoice_id, payload) = request.into_parts();

    assert_eq!(
      invoice_id.as_deref(),
      Some("0b6f3f0e-6f5e-4a57-9a8e-2f4d2b1c9e11")
    );
    assert_eq!(payload.invoice_number, "INV/00003");
    assert_eq!(payload.customer_name, "Initech");
    assert_eq!(payload.invoice_items.len(), 2);
    assert_eq!(payload.invoice_items[0].quantity, Some(4));
    assert_eq!(payload.invoice_items[1].price, Some(dec!(2.0049999999999999)));
  }

  #[test]
  fn test_update_request_without_id() {
    let request: UpdateInvoiceRequest = serde_json::from_str(r#"{"invoiceNumber": "INV/1"}"#).unwrap();
    let (invoice_id, payload) = request.into_parts();
    assert!(invoice_id.is_none());
    assert_eq!(payload.invoice_number, "INV/1");
  }

  #[test]
  fn test_mutation_response_omits_absent_id() {
    let json = serde_json::to_value(MutationResponse::new(None, "Invoice deleted successfully")).unwrap();
    assert_eq!(json["success"], true);
    assert!(json.get("invoiceId").is_none());
  }
}
