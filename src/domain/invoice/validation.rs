//! Schema checks for incoming invoice payloads.
//!
//! Every field is checked and every violated rule contributes one message, so
//! a caller gets the complete list of problems in a single round-trip.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::value_objects::{
  ClientName, InvoiceNumber, InvoiceStatus, LineItemDescription, Money, Quantity,
};

lazy_static! {
  static ref DATE_SHAPE: Regex = Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("valid date pattern");
}

const ITEMS_FIELD: &str = "invoiceItems";

/// Invoice as submitted by a client. Missing fields default to empty values so
/// they are reported as field errors rather than as a malformed body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InvoicePayload {
  pub invoice_number: String,
  pub customer_name: String,
  pub client_address: String,
  pub invoice_date: String,
  pub issue_date: String,
  pub due_date: String,
  pub status: String,
  pub invoice_items: Vec<InvoiceItemPayload>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoiceItemPayload {
  pub description: String,
  pub quantity: Option<i64>,
  /// Read from the literal digits of a JSON number or string, never via `f64`
  #[serde(with = "rust_decimal::serde::arbitrary_precision_option")]
  pub price: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedItem {
  pub description: LineItemDescription,
  pub quantity: Quantity,
  pub unit_price: Money,
}

impl ValidatedItem {
  pub fn line_total(&self) -> Money {
    self.unit_price.times(self.quantity)
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedInvoice {
  pub invoice_number: InvoiceNumber,
  pub client_name: ClientName,
  pub client_address: String,
  pub invoice_date: NaiveDate,
  pub issue_date: NaiveDate,
  pub due_date: NaiveDate,
  pub status: InvoiceStatus,
  pub items: Vec<ValidatedItem>,
}

/// Field-level validation failure keyed by the payload's field names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationError {
  field_errors: BTreeMap<String, Vec<String>>,
}

impl ValidationError {
  pub fn add(&mut self, field: &str, message: impl Into<String>) {
    self
      .field_errors
      .entry(field.to_string())
      .or_default()
      .push(message.into());
  }

  pub fn is_empty(&self) -> bool {
    self.field_errors.is_empty()
  }

  pub fn field_errors(&self) -> &BTreeMap<String, Vec<String>> {
    &self.field_errors
  }

  pub fn into_field_errors(self) -> BTreeMap<String, Vec<String>> {
    self.field_errors
  }

  /// `field: message` pairs joined with `, `
  pub fn summary(&self) -> String {
    self
      .field_errors
      .iter()
      .flat_map(|(field, messages)| {
        messages
          .iter()
          .map(move |message| format!("{}: {}", field, message))
      })
      .collect::<Vec<_>>()
      .join(", ")
  }

  fn check<T, E: fmt::Display>(&mut self, field: &str, result: Result<T, E>) -> Option<T> {
    match result {
      Ok(value) => Some(value),
      Err(e) => {
        self.add(field, e.to_string());
        None
      }
    }
  }
}

impl fmt::Display for ValidationError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.summary())
  }
}

impl std::error::Error for ValidationError {}

/// Checks `payload` and converts it into domain values.
///
/// # Errors
///
/// Returns a [`ValidationError`] listing every violated rule.
pub fn validate(payload: InvoicePayload) -> Result<ValidatedInvoice, ValidationError> {
  let mut errors = ValidationError::default();

  let invoice_number = errors.check("invoiceNumber", InvoiceNumber::new(payload.invoice_number));
  let client_name = errors.check("customerName", ClientName::new(payload.customer_name));
  let invoice_date = errors.check("invoiceDate", parse_date("invoiceDate", &payload.invoice_date));
  let issue_date = errors.check("issueDate", parse_date("issueDate", &payload.issue_date));
  let due_date = errors.check("dueDate", parse_date("dueDate", &payload.due_date));
  let status = errors.check("status", payload.status.parse::<InvoiceStatus>());
  let items = validate_items(payload.invoice_items, &mut errors);

  match (
    invoice_number,
    client_name,
    invoice_date,
    issue_date,
    due_date,
    status,
    items,
  ) {
    (
      Some(invoice_number),
      Some(client_name),
      Some(invoice_date),
      Some(issue_date),
      Some(due_date),
      Some(status),
      Some(items),
    ) if errors.is_empty() => Ok(ValidatedInvoice {
      invoice_number,
      client_name,
      client_address: payload.client_address.trim().to_string(),
      invoice_date,
      issue_date,
      due_date,
      status,
      items,
    }),
    _ => Err(errors),
  }
}

fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, String> {
  if !DATE_SHAPE.is_match(raw) {
    return Err(format!("{} must be YYYY-MM-DD", field));
  }
  NaiveDate::parse_from_str(raw, "%Y-%m-%d")
    .map_err(|_| format!("{} is not a valid calendar date", field))
}

fn validate_items(
  items: Vec<InvoiceItemPayload>,
  errors: &mut ValidationError,
) -> Option<Vec<ValidatedItem>> {
  if items.is_empty() {
    errors.add(ITEMS_FIELD, "At least one item is required");
    return None;
  }

  let submitted = items.len();
  let mut validated = Vec::with_capacity(submitted);

  for (index, item) in items.into_iter().enumerate() {
    let position = index + 1;
    let mut item_errors = ValidationError::default();

    let description = item_errors.check(ITEMS_FIELD, LineItemDescription::new(item.description));
    let quantity = match item.quantity {
      Some(quantity) => item_errors.check(ITEMS_FIELD, Quantity::new(quantity)),
      None => {
        item_errors.add(ITEMS_FIELD, "Quantity is required");
        None
      }
    };
    let unit_price = match item.price {
      Some(price) => item_errors.check(ITEMS_FIELD, Money::new(price)),
      None => {
        item_errors.add(ITEMS_FIELD, "Price is required");
        None
      }
    };

    for message in item_errors.into_field_errors().into_values().flatten() {
      errors.add(ITEMS_FIELD, format!("Item {}: {}", position, message));
    }

    if let (Some(description), Some(quantity), Some(unit_price)) = (description, quantity, unit_price)
    {
      validated.push(ValidatedItem {
        description,
        quantity,
        unit_price,
      });
    }
  }

  if validated.len() != submitted {
    return None;
  }

  let total: Decimal = validated.iter().map(|item| item.line_total().amount()).sum();
  if total > Money::MAX {
    errors.add(
      ITEMS_FIELD,
      format!("Invoice total cannot exceed {}", Money::MAX),
    );
    return None;
  }

  Some(validated)
}

#[cfg(test)]
mod tests {
  use super::*;
  use rust_decimal_macros::dec;

  fn valid_payload() -> InvoicePayload {
    InvoicePayload {
      invoice_number: "INV/00001".to_string(),
      customer_name: "Acme Corp".to_string(),
      client_address: "1 Main Street".to_string(),
      invoice_date: "2024-03-01".to_string(),
      issue_date: "2024-03-01".to_string(),
      due_date: "2024-03-31".to_string(),
      status: "Draft".to_string(),
      invoice_items: vec![
        InvoiceItemPayload {
          description: "Widget".to_string(),
          quantity: Some(2),
          price: Some(dec!(10.00)),
        },
        InvoiceItemPayload {
          description: "Gadget".to_string(),
          quantity: Some(1),
          price: Some(dec!(5.50)),
        },
      ],
    }
  }

  #[test]
  fn test_valid_payload() {
    let validated = validate(valid_payload()).unwrap();
    assert_eq!(validated.invoice_number.value(), "INV/00001");
    assert_eq!(validated.client_name.value(), "Acme Corp");
    assert_eq!(validated.status, InvoiceStatus::Draft);
    assert_eq!(validated.items.len(), 2);
    assert_eq!(validated.items[0].line_total().to_string(), "20.00");
    assert_eq!(
      validated.due_date,
      NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()
    );
  }

  #[test]
  fn test_client_address_may_be_empty() {
    let mut payload = valid_payload();
    payload.client_address = String::new();
    assert!(validate(payload).is_ok());
  }

  #[test]
  fn test_due_date_before_issue_date_is_accepted() {
    let mut payload = valid_payload();
    payload.due_date = "2024-01-01".to_string();
    assert!(validate(payload).is_ok());
  }

  #[test]
  fn test_empty_items_rejected() {
    let mut payload = valid_payload();
    payload.invoice_items.clear();
    let err = validate(payload).unwrap_err();
    assert_eq!(
      err.field_errors().get("invoiceItems"),
      Some(&vec!["At least one item is required".to_string()])
    );
  }

  #[test]
  fn test_date_shape_and_calendar_checks() {
    let mut payload = valid_payload();
    payload.invoice_date = "01/03/2024".to_string();
    payload.issue_date = "2024-02-30".to_string();
    payload.due_date = "2024-3-31".to_string();
    let err = validate(payload).unwrap_err();
    let fields = err.field_errors();
    assert_eq!(fields["invoiceDate"], vec!["invoiceDate must be YYYY-MM-DD"]);
    assert_eq!(
      fields["issueDate"],
      vec!["issueDate is not a valid calendar date"]
    );
    assert_eq!(fields["dueDate"], vec!["dueDate must be YYYY-MM-DD"]);
  }

  #[test]
  fn test_leap_day_accepted() {
    let mut payload = valid_payload();
    payload.issue_date = "2024-02-29".to_string();
    assert!(validate(payload).is_ok());
  }

  #[test]
  fn test_collects_every_violation() {
    let payload = InvoicePayload {
      status: "Archived".to_string(),
      invoice_items: vec![InvoiceItemPayload {
        description: " ".to_string(),
        quantity: Some(0),
        price: Some(dec!(-1)),
      }],
      ..InvoicePayload::default()
    };

    let err = validate(payload).unwrap_err();
    let fields = err.field_errors();
    assert_eq!(fields["invoiceNumber"], vec!["Invoice number is required"]);
    assert_eq!(fields["customerName"], vec!["Customer name is required"]);
    assert!(fields.contains_key("invoiceDate"));
    assert!(fields.contains_key("issueDate"));
    assert!(fields.contains_key("dueDate"));
    assert!(fields.contains_key("status"));
    assert_eq!(
      fields["invoiceItems"],
      vec![
        "Item 1: Description is required",
        "Item 1: Quantity must be >= 1",
        "Item 1: Price must be >= 0",
      ]
    );
    assert!(!fields.contains_key("clientAddress"));
  }

  #[test]
  fn test_missing_item_values_reported() {
    let mut payload = valid_payload();
    payload.invoice_items.push(InvoiceItemPayload {
      description: "Bolt".to_string(),
      quantity: None,
      price: None,
    });
    let err = validate(payload).unwrap_err();
    assert_eq!(
      err.field_errors()["invoiceItems"],
      vec!["Item 3: Quantity is required", "Item 3: Price is required"]
    );
  }

  #[test]
  fn test_summary_is_field_prefixed_and_comma_joined() {
    let mut payload = valid_payload();
    payload.invoice_number = String::new();
    payload.status = String::new();
    let err = validate(payload).unwrap_err();
    let summary = err.summary();
    assert!(summary.starts_with("invoiceNumber: Invoice number is required, status: "));
    assert_eq!(summary, err.to_string());
  }

  #[test]
  fn test_total_must_fit_storage() {
    let mut payload = valid_payload();
    payload.invoice_items = vec![InvoiceItemPayload {
      description: "Yacht".to_string(),
      quantity: Some(2),
      price: Some(dec!(9000000000)),
    }];
    let err = validate(payload).unwrap_err();
    assert_eq!(
      err.field_errors()["invoiceItems"],
      vec!["Invoice total cannot exceed 9999999999.99"]
    );
  }

  #[test]
  fn test_payload_deserializes_camel_case_with_defaults() {
    let json = r#"{
      "invoiceNumber": "INV/00007",
      "customerName": "Globex",
      "invoiceItems": [{"description": "Support", "quantity": 3, "price": 12.5}]
    }"#;
    let payload: InvoicePayload = serde_json::from_str(json).unwrap();
    assert_eq!(payload.invoice_number, "INV/00007");
    assert_eq!(payload.client_address, "");
    assert_eq!(payload.invoice_items[0].quantity, Some(3));
    assert_eq!(payload.invoice_items[0].price, Some(dec!(12.5)));
  }

  #[test]
  fn test_json_price_keeps_every_digit() {
    let json = r#"{"invoiceItems": [{"description": "Cable", "quantity": 1, "price": 2.0049999999999999}]}"#;
    let mut payload: InvoicePayload = serde_json::from_str(json).unwrap();
    assert_eq!(
      payload.invoice_items[0].price,
      Some(dec!(2.0049999999999999))
    );

    payload.invoice_number = "INV/00001".to_string();
    payload.customer_name = "Acme Corp".to_string();
    payload.invoice_date = "2024-03-01".to_string();
    payload.issue_date = "2024-03-01".to_string();
    payload.due_date = "2024-03-31".to_string();
    payload.status = "Draft".to_string();
    let validated = validate(payload).unwrap();
    assert_eq!(validated.items[0].line_total().to_string(), "2.00");
  }

  #[test]
  fn test_price_accepts_strings_and_missing_values() {
    let json = r#"{"invoiceItems": [{"description": "A", "quantity": 1, "price": "5.50"}, {"description": "B", "quantity": 2}]}"#;
    let payload: InvoicePayload = serde_json::from_str(json).unwrap();
    assert_eq!(payload.invoice_items[0].price, Some(dec!(5.50)));
    assert_eq!(payload.invoice_items[1].price, None);
  }
}
