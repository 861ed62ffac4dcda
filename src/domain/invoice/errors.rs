use thiserror::Error;

use super::sequencer::InvoiceNumberFormatError;
use super::validation::ValidationError;
use super::value_objects::ValueObjectError;

#[derive(Debug, Error)]
pub enum InvoiceError {
  #[error("Validation error: {0}")]
  Validation(#[from] ValidationError),

  #[error("Invoice ID is required")]
  MissingId,

  #[error("Invoice not found: {0}")]
  NotFound(String),

  #[error("Invoice number '{0}' already exists")]
  Conflict(String),

  #[error("Malformed invoice number: {0}")]
  Format(#[from] InvoiceNumberFormatError),

  #[error("Invalid list parameters: {0}")]
  InvalidQuery(String),

  #[error("Stored invoice is invalid: {0}")]
  InvalidRecord(#[from] ValueObjectError),

  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),
}

impl InvoiceError {
  /// Errors the caller can fix by changing the request
  pub fn is_client_error(&self) -> bool {
    matches!(
      self,
      InvoiceError::Validation(_)
        | InvoiceError::MissingId
        | InvoiceError::NotFound(_)
        | InvoiceError::Conflict(_)
        | InvoiceError::InvalidQuery(_)
    )
  }
}
