//! Invoice management service.
//!
//! Invoices and their line items are kept total-consistent across create,
//! update and delete, numbered sequentially (`INV/00001`, `INV/00002`, ...),
//! and served over a small JSON API with search and pagination.

pub mod adapters;
pub mod application;
pub mod domain;
pub mod infrastructure;
