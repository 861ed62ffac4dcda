//! Application layer
//!
//! This layer contains use cases that orchestrate domain logic to implement
//! application-specific workflows. Each use case turns a transport-level
//! command into calls on the invoice service and shapes the response.

pub mod invoice;
