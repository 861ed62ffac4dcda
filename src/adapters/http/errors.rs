use actix_web::{
  HttpRequest, HttpResponse,
  error::{JsonPayloadError, PathError, QueryPayloadError, ResponseError},
  http::{StatusCode, header::ContentType},
};
use std::collections::BTreeMap;
use std::fmt;

use crate::domain::invoice::InvoiceError;

use super::dtos::ErrorResponse;

const INTERNAL_ERROR_MESSAGE: &str = "An internal server error occurred";

/// API error type that maps domain errors to HTTP responses
#[derive(Debug)]
pub enum ApiError {
  /// Malformed or invalid input (400 Bad Request)
  Validation {
    message: String,
    field_errors: Option<BTreeMap<String, Vec<String>>>,
  },

  /// Required invoice id absent (400 Bad Request)
  MissingId,

  /// Target invoice does not exist (404 Not Found)
  NotFound(String),

  /// Invoice number already taken (409 Conflict)
  Conflict(String),

  /// Stored data cannot be processed as asked (422 Unprocessable Entity)
  Unprocessable(String),

  /// Internal server error (500 Internal Server Error)
  Internal(String),
}

impl ApiError {
  pub fn validation(message: impl Into<String>) -> Self {
    ApiError::Validation {
      message: message.into(),
      field_errors: None,
    }
  }
}

impl fmt::Display for ApiError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ApiError::Validation { message, .. } => write!(f, "Validation error: {}", message),
      ApiError::MissingId => write!(f, "Invoice ID is required"),
      ApiError::NotFound(id) => write!(f, "Invoice not found: {}", id),
      ApiError::Conflict(number) => write!(f, "Invoice number '{}' already exists", number),
      ApiError::Unprocessable(msg) => write!(f, "Unprocessable: {}", msg),
      ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
    }
  }
}

impl ResponseError for ApiError {
  fn status_code(&self) -> StatusCode {
    match self {
      ApiError::Validation { .. } | ApiError::MissingId => StatusCode::BAD_REQUEST,
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::Conflict(_) => StatusCode::CONFLICT,
      ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
      ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    let (error, field_errors) = match self {
      ApiError::Validation {
        message,
        field_errors,
      } => (message.clone(), field_errors.clone()),
      ApiError::NotFound(_) => ("Invoice not found".to_string(), None),
      ApiError::Internal(msg) => {
        // Don't expose internal error details
        tracing::error!("Internal error: {}", msg);
        (INTERNAL_ERROR_MESSAGE.to_string(), None)
      }
      other => (other.to_string(), None),
    };

    HttpResponse::build(status)
      .content_type(ContentType::json())
      .json(ErrorResponse {
        success: false,
        error,
        field_errors,
      })
  }
}

/// Convert InvoiceError to ApiError
impl From<InvoiceError> for ApiError {
  fn from(error: InvoiceError) -> Self {
    if error.is_client_error() {
      tracing::warn!("Rejected invoice request: {}", error);
    }

    match error {
      InvoiceError::Validation(errors) => ApiError::Validation {
        message: errors.summary(),
        field_errors: Some(errors.into_field_errors()),
      },
      InvoiceError::MissingId => ApiError::MissingId,
      InvoiceError::NotFound(id) => ApiError::NotFound(id),
      InvoiceError::Conflict(number) => ApiError::Conflict(number),
      InvoiceError::InvalidQuery(msg) => ApiError::validation(msg),
      InvoiceError::Format(err) => ApiError::Unprocessable(err.to_string()),
      InvoiceError::InvalidRecord(err) => {
        ApiError::Internal(format!("Stored invoice is invalid: {}", err))
      }
      InvoiceError::Database(err) => ApiError::Internal(format!("Database error: {}", err)),
    }
  }
}

/// Convert validation errors from validator crate
impl From<validator::ValidationErrors> for ApiError {
  fn from(errors: validator::ValidationErrors) -> Self {
    let mut field_errors: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (field, errors) in errors.field_errors() {
      for error in errors {
        let message = error
          .message
          .as_ref()
          .map(|m| m.to_string())
          .unwrap_or_else(|| format!("Invalid field: {}", field));
        field_errors
          .entry(field.to_string())
          .or_default()
          .push(message);
      }
    }

    let message = field_errors
      .iter()
      .flat_map(|(field, messages)| messages.iter().map(move |m| format!("{}: {}", field, m)))
      .collect::<Vec<_>>()
      .join(", ");

    ApiError::Validation {
      message,
      field_errors: Some(field_errors),
    }
  }
}

/// Rejected JSON bodies answer in the same shape as every other error.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
  ApiError::validation(format!("Invalid request body: {}", err)).into()
}

pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
  ApiError::validation(format!("Invalid query string: {}", err)).into()
}

pub fn path_error_handler(err: PathError, _req: &HttpRequest) -> actix_web::Error {
  ApiError::validation(format!("Invalid path: {}", err)).into()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::invoice::{InvoiceNumberFormatError, ValidationError, ValueObjectError};
  use actix_web::body::to_bytes;

  #[test]
  fn test_api_error_status_codes() {
    assert_eq!(
      ApiError::validation("test").status_code(),
      StatusCode::BAD_REQUEST
    );
    assert_eq!(ApiError::MissingId.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
      ApiError::NotFound("x".to_string()).status_code(),
      StatusCode::NOT_FOUND
    );
    assert_eq!(
      ApiError::Conflict("INV/00001".to_string()).status_code(),
      StatusCode::CONFLICT
    );
    assert_eq!(
      ApiError::Internal("test".to_string()).status_code(),
      StatusCode::INTERNAL_SERVER_ERROR
    );
  }

  #[test]
  fn test_invoice_error_conversion() {
    let mut errors = ValidationError::default();
    errors.add("customerName", "Customer name is required");
    let api_error: ApiError = InvoiceError::Validation(errors).into();
    assert_eq!(api_error.status_code(), StatusCode::BAD_REQUEST);

    let api_error: ApiError = InvoiceError::Conflict("INV/00001".to_string()).into();
    assert_eq!(api_error.status_code(), StatusCode::CONFLICT);

    let api_error: ApiError =
      InvoiceError::Format(InvoiceNumberFormatError::MissingSeparator("X".to_string())).into();
    assert_eq!(api_error.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

    let api_error: ApiError = InvoiceError::Database(sqlx::Error::PoolTimedOut).into();
    assert_eq!(api_error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

    let api_error: ApiError =
      InvoiceError::InvalidRecord(ValueObjectError::InvalidStatus("Archived".to_string())).into();
    assert_eq!(api_error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

    let api_error: ApiError = InvoiceError::InvalidQuery("page must be >= 1".to_string()).into();
    assert_eq!(api_error.status_code(), StatusCode::BAD_REQUEST);
  }

  #[actix_web::test]
  async fn test_internal_error_hides_details() {
    let response = ApiError::Internal("connection refused on 10.0.0.5".to_string()).error_response();
    let body = to_bytes(response.into_body()).await.unwrap();
    let body: ErrorResponse = serde_json::from_slice(&body).unwrap();

    assert!(!body.success);
    assert_eq!(body.error, "An internal server error occurred");
  }

  #[actix_web::test]
  async fn test_validation_error_body_lists_fields() {
    let mut errors = ValidationError::default();
    errors.add("invoiceNumber", "Invoice number is required");
    errors.add("status", "Status must be one of Draft, Sent, Paid, Cancelled (got '')");

    let response = ApiError::from(InvoiceError::Validation(errors)).error_response();
    let body = to_bytes(response.into_body()).await.unwrap();
    let body: ErrorResponse = serde_json::from_slice(&body).unwrap();

    assert!(body.error.starts_with("invoiceNumber: Invoice number is required, status: "));
    assert_eq!(body.field_errors.unwrap().len(), 2);
  }
}
