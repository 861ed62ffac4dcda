//! Sequential invoice numbering.
//!
//! Numbers look like `PREFIX/NNNNN`: a free-text prefix, a single `/`, and a
//! decimal sequence zero-padded to five digits. The sequencer is pure; the
//! caller supplies the greatest number currently in the store.

use thiserror::Error;

/// Number handed out when nothing has been issued yet
pub const FIRST_INVOICE_NUMBER: &str = "INV/00001";

/// Reported by the last-number query when the store is empty. Feeding it back
/// into [`next_invoice_number`] yields [`FIRST_INVOICE_NUMBER`].
pub const EMPTY_LAST_INVOICE_NUMBER: &str = "INV/00000";

const SEPARATOR: char = '/';
const SEQUENCE_WIDTH: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvoiceNumberFormatError {
  #[error("Invoice number '{0}' has no '/' separator")]
  MissingSeparator(String),

  #[error("Invoice number '{0}' has more than one '/' separator")]
  MultipleSeparators(String),

  #[error("Invoice number '{0}' does not end in a decimal sequence")]
  InvalidSequence(String),

  #[error("Invoice number '{0}' cannot be incremented further")]
  Overflow(String),
}

/// Derives the number that follows `last`.
///
/// # Examples
///
/// ```
/// use invoicer::domain::invoice::sequencer::next_invoice_number;
///
/// assert_eq!(next_invoice_number(None).unwrap(), "INV/00001");
/// assert_eq!(next_invoice_number(Some("INV/00042")).unwrap(), "INV/00043");
/// assert_eq!(next_invoice_number(Some("INV/99999")).unwrap(), "INV/100000");
/// ```
///
/// # Errors
///
/// Returns an [`InvoiceNumberFormatError`] when `last` is not of the form
/// `PREFIX/DIGITS`.
pub fn next_invoice_number(last: Option<&str>) -> Result<String, InvoiceNumberFormatError> {
  let last = match last.map(str::trim) {
    None | Some("") => return Ok(FIRST_INVOICE_NUMBER.to_string()),
    Some(value) => value,
  };

  let (prefix, digits) = last
    .split_once(SEPARATOR)
    .ok_or_else(|| InvoiceNumberFormatError::MissingSeparator(last.to_string()))?;

  if digits.contains(SEPARATOR) {
    return Err(InvoiceNumberFormatError::MultipleSeparators(
      last.to_string(),
    ));
  }

  if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
    return Err(InvoiceNumberFormatError::InvalidSequence(last.to_string()));
  }

  let current: u64 = digits
    .parse()
    .map_err(|_| InvoiceNumberFormatError::Overflow(last.to_string()))?;
  let next = current
    .checked_add(1)
    .ok_or_else(|| InvoiceNumberFormatError::Overflow(last.to_string()))?;

  Ok(format!(
    "{}{}{:0width$}",
    prefix,
    SEPARATOR,
    next,
    width = SEQUENCE_WIDTH
  ))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_first_number_when_nothing_issued() {
    assert_eq!(next_invoice_number(None).unwrap(), "INV/00001");
    assert_eq!(next_invoice_number(Some("")).unwrap(), "INV/00001");
    assert_eq!(next_invoice_number(Some("  ")).unwrap(), "INV/00001");
  }

  #[test]
  fn test_increments_and_pads() {
    assert_eq!(next_invoice_number(Some("INV/00042")).unwrap(), "INV/00043");
    assert_eq!(next_invoice_number(Some("INV/00009")).unwrap(), "INV/00010");
    assert_eq!(next_invoice_number(Some("ACME-2024/7")).unwrap(), "ACME-2024/00008");
  }

  #[test]
  fn test_grows_past_five_digits() {
    assert_eq!(next_invoice_number(Some("INV/99999")).unwrap(), "INV/100000");
    assert_eq!(next_invoice_number(Some("INV/100000")).unwrap(), "INV/100001");
  }

  #[test]
  fn test_empty_store_sentinel_maps_to_first_number() {
    assert_eq!(
      next_invoice_number(Some(EMPTY_LAST_INVOICE_NUMBER)).unwrap(),
      FIRST_INVOICE_NUMBER
    );
  }

  #[test]
  fn test_keeps_empty_prefix() {
    assert_eq!(next_invoice_number(Some("/00001")).unwrap(), "/00002");
  }

  #[test]
  fn test_rejects_malformed_numbers() {
    assert_eq!(
      next_invoice_number(Some("INV-00001")),
      Err(InvoiceNumberFormatError::MissingSeparator(
        "INV-00001".to_string()
      ))
    );
    assert!(matches!(
      next_invoice_number(Some("INV/2024/001")),
      Err(InvoiceNumberFormatError::MultipleSeparators(_))
    ));
    assert!(matches!(
      next_invoice_number(Some("INV/")),
      Err(InvoiceNumberFormatError::InvalidSequence(_))
    ));
    assert!(matches!(
      next_invoice_number(Some("INV/12a")),
      Err(InvoiceNumberFormatError::InvalidSequence(_))
    ));
    assert!(matches!(
      next_invoice_number(Some("INV/-1")),
      Err(InvoiceNumberFormatError::InvalidSequence(_))
    ));
  }

  #[test]
  fn test_overflow_is_an_error() {
    assert!(matches!(
      next_invoice_number(Some("INV/18446744073709551615")),
      Err(InvoiceNumberFormatError::Overflow(_))
    ));
    assert!(matches!(
      next_invoice_number(Some("INV/99999999999999999999999")),
      Err(InvoiceNumberFormatError::Overflow(_))
    ));
  }
}
