use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::ValidatedInvoice;
use super::value_objects::{
  ClientName, InvoiceNumber, InvoiceStatus, LineItemDescription, Money, Quantity,
};

// Invoice - aggregate root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
  pub id: Uuid,
  pub invoice_number: InvoiceNumber,
  pub client_name: ClientName,
  pub client_address: String,
  pub invoice_date: NaiveDate,
  pub issue_date: NaiveDate,
  pub due_date: NaiveDate,
  pub total_amount: Money,
  pub status: InvoiceStatus,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

// Invoice Item - owned by exactly one invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceItem {
  pub id: Uuid,
  pub invoice_id: Uuid,
  pub description: LineItemDescription,
  pub quantity: Quantity,
  pub unit_price: Money,
  pub line_total: Money,
  pub line_order: i32,
}

impl InvoiceItem {
  pub fn new(
    invoice_id: Uuid,
    description: LineItemDescription,
    quantity: Quantity,
    unit_price: Money,
    line_order: i32,
  ) -> Self {
    Self {
      id: Uuid::new_v4(),
      invoice_id,
      description,
      quantity,
      unit_price,
      line_total: unit_price.times(quantity),
      line_order,
    }
  }
}

// Invoice Totals - per-line totals are rounded before they are summed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceTotals {
  pub line_totals: Vec<Money>,
  pub total: Money,
}

impl InvoiceTotals {
  pub fn calculate<'a, I>(lines: I) -> Self
  where
    I: IntoIterator<Item = (Quantity, &'a Money)>,
  {
    let line_totals: Vec<Money> = lines
      .into_iter()
      .map(|(quantity, unit_price)| unit_price.times(quantity))
      .collect();
    let total = line_totals
      .iter()
      .fold(Money::zero(), |acc, line| acc.add(line));

    Self { line_totals, total }
  }
}

/// An invoice together with its ordered items; the unit every write goes
/// through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceAggregate {
  pub invoice: Invoice,
  pub items: Vec<InvoiceItem>,
}

impl InvoiceAggregate {
  /// Builds a brand-new invoice from validated input.
  pub fn create(data: ValidatedInvoice) -> Self {
    Self::assemble(Uuid::new_v4(), data, Utc::now())
  }

  /// Builds the replacement state for an existing invoice. Storage keeps the
  /// original `created_at`.
  pub fn revise(id: Uuid, data: ValidatedInvoice) -> Self {
    Self::assemble(id, data, Utc::now())
  }

  fn assemble(id: Uuid, data: ValidatedInvoice, now: DateTime<Utc>) -> Self {
    let totals = InvoiceTotals::calculate(
      data
        .items
        .iter()
        .map(|item| (item.quantity, &item.unit_price)),
    );

    let items = data
      .items
      .into_iter()
      .enumerate()
      .map(|(i, item)| {
        InvoiceItem::new(
          id,
          item.description,
          item.quantity,
          item.unit_price,
          (i + 1) as i32,
        )
      })
      .collect();

    let invoice = Invoice {
      id,
      invoice_number: data.invoice_number,
      client_name: data.client_name,
      client_address: data.client_address,
      invoice_date: data.invoice_date,
      issue_date: data.issue_date,
      due_date: data.due_date,
      total_amount: totals.total,
      status: data.status,
      created_at: now,
      updated_at: now,
    };

    Self { invoice, items }
  }

  pub fn id(&self) -> Uuid {
    self.invoice.id
  }

  /// Recomputes the totals from the current items.
  pub fn totals(&self) -> InvoiceTotals {
    InvoiceTotals::calculate(
      self
        .items
        .iter()
        .map(|item| (item.quantity, &item.unit_price)),
    )
  }

  /// True when the stored total and every line total match the items.
  pub fn is_consistent(&self) -> bool {
    let totals = self.totals();
    totals.total == self.invoice.total_amount
      && self
        .items
        .iter()
        .zip(totals.line_totals.iter())
        .all(|(item, line_total)| item.line_total == *line_total)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::invoice::validation::ValidatedItem;
  use rust_decimal_macros::dec;

  fn validated(items: Vec<(&str, i64, rust_decimal::Decimal)>) -> ValidatedInvoice {
    ValidatedInvoice {
      invoice_number: InvoiceNumber::new("INV/00001".to_string()).unwrap(),
      client_name: ClientName::new("Acme Corp".to_string()).unwrap(),
      client_address: "1 Main Street".to_string(),
      invoice_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
      issue_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
      due_date: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
      status: InvoiceStatus::Draft,
      items: items
        .into_iter()
        .map(|(description, quantity, price)| ValidatedItem {
          description: LineItemDescription::new(description.to_string()).unwrap(),
          quantity: Quantity::new(quantity).unwrap(),
          unit_price: Money::new(price).unwrap(),
        })
        .collect(),
    }
  }

  #[test]
  fn test_create_computes_line_and_invoice_totals() {
    let aggregate =
      InvoiceAggregate::create(validated(vec![("Widget", 2, dec!(10.00)), ("Gadget", 1, dec!(5.50))]));

    assert_eq!(aggregate.items[0].line_total.to_string(), "20.00");
    assert_eq!(aggregate.items[1].line_total.to_string(), "5.50");
    assert_eq!(aggregate.invoice.total_amount.to_string(), "25.50");
    assert!(aggregate.is_consistent());
  }

  #[test]
  fn test_items_reference_invoice_and_keep_order() {
    let aggregate = InvoiceAggregate::create(validated(vec![
      ("First", 1, dec!(1)),
      ("Second", 1, dec!(2)),
      ("Third", 1, dec!(3)),
    ]));

    for (i, item) in aggregate.items.iter().enumerate() {
      assert_eq!(item.invoice_id, aggregate.id());
      assert_eq!(item.line_order, (i + 1) as i32);
    }
    assert_eq!(aggregate.items[2].description.value(), "Third");
  }

  #[test]
  fn test_totals_sum_rounded_lines() {
    // 3 x 0.335 -> price stored as 0.34 -> line 1.02; summing unrounded
    // products would drift by a cent over several lines
    let totals = InvoiceTotals::calculate(vec![
      (Quantity::new(3).unwrap(), &Money::new(dec!(0.335)).unwrap()),
      (Quantity::new(7).unwrap(), &Money::new(dec!(1.15)).unwrap()),
    ]);
    assert_eq!(totals.line_totals[0].amount(), dec!(1.02));
    assert_eq!(totals.line_totals[1].amount(), dec!(8.05));
    assert_eq!(totals.total.to_string(), "9.07");
  }

  #[test]
  fn test_revise_keeps_id() {
    let id = Uuid::new_v4();
    let aggregate = InvoiceAggregate::revise(id, validated(vec![("Widget", 4, dec!(2.25))]));
    assert_eq!(aggregate.id(), id);
    assert_eq!(aggregate.invoice.total_amount.amount(), dec!(9.00));
  }

  #[test]
  fn test_tampered_total_is_inconsistent() {
    let mut aggregate = InvoiceAggregate::create(validated(vec![("Widget", 2, dec!(10.00))]));
    aggregate.invoice.total_amount = Money::new(dec!(19.99)).unwrap();
    assert!(!aggregate.is_consistent());
  }
}
