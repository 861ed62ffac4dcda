pub mod dtos;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod routes;

// Re-export commonly used types
pub use dtos::{
  DeleteInvoiceQuery, ErrorResponse, ListInvoicesQuery, MutationResponse, UpdateInvoiceRequest,
};
pub use errors::ApiError;
pub use middleware::{RequestId, RequestIdExt, RequestIdMiddleware};
pub use routes::{InvoiceRouteDependencies, configure_health_routes, configure_invoice_routes};
