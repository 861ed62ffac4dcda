use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Fractional digits carried by every monetary value
pub const MONEY_SCALE: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueObjectError {
  #[error("{0}")]
  InvalidInvoiceNumber(String),
  #[error("{0}")]
  InvalidClientName(String),
  #[error("{0}")]
  InvalidDescription(String),
  #[error("{0}")]
  InvalidQuantity(String),
  #[error("{0}")]
  InvalidAmount(String),
  #[error("{0}")]
  InvalidStatus(String),
  #[error("{0}")]
  InvalidListOrder(String),
}

/// Rounds half away from zero to two decimals and pins the scale, so
/// `25.5` renders as `25.50`.
pub fn round2(value: Decimal) -> Decimal {
  let mut rounded = value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
  rounded.rescale(MONEY_SCALE);
  rounded
}

// Invoice Number - editable, globally unique, usually PREFIX/NNNNN
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvoiceNumber(String);

impl InvoiceNumber {
  pub const MAX_LEN: usize = 50;

  pub fn new(value: String) -> Result<Self, ValueObjectError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
      return Err(ValueObjectError::InvalidInvoiceNumber(
        "Invoice number is required".to_string(),
      ));
    }
    if trimmed.chars().count() > Self::MAX_LEN {
      return Err(ValueObjectError::InvalidInvoiceNumber(format!(
        "Invoice number cannot exceed {} characters",
        Self::MAX_LEN
      )));
    }
    Ok(Self(trimmed.to_string()))
  }

  pub fn value(&self) -> &str {
    &self.0
  }

  pub fn into_inner(self) -> String {
    self.0
  }
}

impl fmt::Display for InvoiceNumber {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl InvoiceNumber {
  /// `(prefix, sequence length, sequence)` split at the last `/`; a number
  /// without `/` is both its own prefix and sequence.
  fn sort_key(&self) -> (&str, usize, &str) {
    match self.0.rsplit_once('/') {
      Some((prefix, sequence)) => (prefix, sequence.chars().count(), sequence),
      None => (&self.0, self.0.chars().count(), &self.0),
    }
  }
}

// Prefixes compare bytewise; within a prefix a longer sequence is larger, so
// INV/100000 ranks above INV/99999 and INV/00042 above ACME/00001.
impl Ord for InvoiceNumber {
  fn cmp(&self, other: &Self) -> Ordering {
    self
      .sort_key()
      .cmp(&other.sort_key())
      .then_with(|| self.0.cmp(&other.0))
  }
}

impl PartialOrd for InvoiceNumber {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

// Invoice Status - any status may be set from any other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceStatus {
  Draft,
  Sent,
  Paid,
  Cancelled,
}

impl InvoiceStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      InvoiceStatus::Draft => "Draft",
      InvoiceStatus::Sent => "Sent",
      InvoiceStatus::Paid => "Paid",
      InvoiceStatus::Cancelled => "Cancelled",
    }
  }
}

impl FromStr for InvoiceStatus {
  type Err = ValueObjectError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "Draft" => Ok(InvoiceStatus::Draft),
      "Sent" => Ok(InvoiceStatus::Sent),
      "Paid" => Ok(InvoiceStatus::Paid),
      "Cancelled" => Ok(InvoiceStatus::Cancelled),
      _ => Err(ValueObjectError::InvalidStatus(format!(
        "Status must be one of Draft, Sent, Paid, Cancelled (got '{}')",
        s
      ))),
    }
  }
}

impl fmt::Display for InvoiceStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// Client Name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientName(String);

impl ClientName {
  pub const MAX_LEN: usize = 200;

  pub fn new(value: String) -> Result<Self, ValueObjectError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
      return Err(ValueObjectError::InvalidClientName(
        "Customer name is required".to_string(),
      ));
    }
    if trimmed.chars().count() > Self::MAX_LEN {
      return Err(ValueObjectError::InvalidClientName(format!(
        "Customer name cannot exceed {} characters",
        Self::MAX_LEN
      )));
    }
    Ok(Self(trimmed.to_string()))
  }

  pub fn value(&self) -> &str {
    &self.0
  }
}

// Line Item Description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemDescription(String);

impl LineItemDescription {
  pub const MAX_LEN: usize = 255;

  pub fn new(value: String) -> Result<Self, ValueObjectError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
      return Err(ValueObjectError::InvalidDescription(
        "Description is required".to_string(),
      ));
    }
    if trimmed.chars().count() > Self::MAX_LEN {
      return Err(ValueObjectError::InvalidDescription(format!(
        "Description cannot exceed {} characters",
        Self::MAX_LEN
      )));
    }
    Ok(Self(trimmed.to_string()))
  }

  pub fn value(&self) -> &str {
    &self.0
  }
}

// Quantity - whole units, at least one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quantity(i32);

impl Quantity {
  pub fn new(value: i64) -> Result<Self, ValueObjectError> {
    if value < 1 {
      return Err(ValueObjectError::InvalidQuantity(
        "Quantity must be >= 1".to_string(),
      ));
    }
    let value = i32::try_from(value).map_err(|_| {
      ValueObjectError::InvalidQuantity(format!("Quantity cannot exceed {}", i32::MAX))
    })?;
    Ok(Self(value))
  }

  pub fn value(&self) -> i32 {
    self.0
  }
}

// Money - non-negative fixed-point amount with two decimals
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Money(Decimal);

impl Money {
  /// Largest amount a NUMERIC(12,2) column holds
  pub const MAX: Decimal = dec!(9999999999.99);

  pub fn new(amount: Decimal) -> Result<Self, ValueObjectError> {
    if amount.is_sign_negative() && !amount.is_zero() {
      return Err(ValueObjectError::InvalidAmount(
        "Price must be >= 0".to_string(),
      ));
    }
    let amount = round2(amount);
    if amount > Self::MAX {
      return Err(ValueObjectError::InvalidAmount(format!(
        "Amount cannot exceed {}",
        Self::MAX
      )));
    }
    Ok(Self(amount))
  }

  pub fn zero() -> Self {
    Self(round2(Decimal::ZERO))
  }

  pub fn amount(&self) -> Decimal {
    self.0
  }

  pub fn add(&self, other: &Money) -> Money {
    Money(round2(self.0 + other.0))
  }

  /// Line total: `round2(quantity * unit price)`
  pub fn times(&self, quantity: Quantity) -> Money {
    Money(round2(self.0 * Decimal::from(quantity.value())))
  }
}

impl fmt::Display for Money {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:.2}", self.0)
  }
}

// Listing order for the invoice collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListOrder {
  #[default]
  #[serde(rename = "number")]
  InvoiceNumberDesc,
  #[serde(rename = "created")]
  CreatedAtDesc,
}

impl FromStr for ListOrder {
  type Err = ValueObjectError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "number" => Ok(ListOrder::InvoiceNumberDesc),
      "created" => Ok(ListOrder::CreatedAtDesc),
      other => Err(ValueObjectError::InvalidListOrder(format!(
        "Unknown sort order '{}', expected 'number' or 'created'",
        other
      ))),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_invoice_number() {
    assert!(InvoiceNumber::new("INV/00001".to_string()).is_ok());
    assert!(InvoiceNumber::new("   ".to_string()).is_err());
    assert_eq!(
      InvoiceNumber::new("  INV/00005 ".to_string())
        .unwrap()
        .to_string(),
      "INV/00005"
    );
    assert!(InvoiceNumber::new("X".repeat(51)).is_err());
  }

  #[test]
  fn test_invoice_number_ordering_is_numeric_aware() {
    let small = InvoiceNumber::new("INV/99999".to_string()).unwrap();
    let large = InvoiceNumber::new("INV/100000".to_string()).unwrap();
    assert!(large > small);

    let a = InvoiceNumber::new("INV/00041".to_string()).unwrap();
    let b = InvoiceNumber::new("INV/00042".to_string()).unwrap();
    assert!(b > a);
  }

  #[test]
  fn test_invoice_number_ordering_groups_by_prefix() {
    let number = |s: &str| InvoiceNumber::new(s.to_string()).unwrap();

    assert!(number("INV/00042") > number("ACME/00001"));
    assert!(number("INV/00042") > number("ACME/100000"));
    assert!(number("INV-2024/00001") > number("INV/99999"));
    assert!(number("INV/00001") > number("INV"));
  }

  #[test]
  fn test_invoice_status_parsing() {
    assert_eq!(InvoiceStatus::from_str("Paid").unwrap(), InvoiceStatus::Paid);
    assert_eq!(InvoiceStatus::Cancelled.as_str(), "Cancelled");
    assert!(InvoiceStatus::from_str("paid").is_err());
    assert!(InvoiceStatus::from_str("Overdue").is_err());
  }

  #[test]
  fn test_round2_half_away_from_zero() {
    assert_eq!(round2(dec!(1.005)).to_string(), "1.01");
    assert_eq!(round2(dec!(1.004)).to_string(), "1.00");
    assert_eq!(round2(dec!(-1.005)).to_string(), "-1.01");
    assert_eq!(round2(dec!(25.5)).to_string(), "25.50");
  }

  #[test]
  fn test_money() {
    assert_eq!(Money::new(dec!(10)).unwrap().to_string(), "10.00");
    assert!(Money::new(dec!(-0.01)).is_err());
    assert!(Money::new(dec!(0)).is_ok());
    assert!(Money::new(dec!(10000000000)).is_err());
    assert_eq!(Money::MAX, dec!(9999999999.99));
  }

  #[test]
  fn test_money_times_rounds_each_line() {
    let price = Money::new(dec!(0.335)).unwrap();
    // 0.335 is stored as 0.34 before multiplying
    assert_eq!(price.times(Quantity::new(3).unwrap()).amount(), dec!(1.02));
    let price = Money::new(dec!(5.50)).unwrap();
    assert_eq!(price.times(Quantity::new(1).unwrap()).to_string(), "5.50");
  }

  #[test]
  fn test_quantity() {
    assert!(Quantity::new(1).is_ok());
    assert!(Quantity::new(0).is_err());
    assert!(Quantity::new(-3).is_err());
    assert!(Quantity::new(i64::from(i32::MAX) + 1).is_err());
  }

  #[test]
  fn test_list_order() {
    assert_eq!(ListOrder::from_str("number").unwrap(), ListOrder::InvoiceNumberDesc);
    assert_eq!(ListOrder::from_str("Created").unwrap(), ListOrder::CreatedAtDesc);
    assert!(ListOrder::from_str("amount").is_err());
    assert_eq!(ListOrder::default(), ListOrder::InvoiceNumberDesc);
  }
}
