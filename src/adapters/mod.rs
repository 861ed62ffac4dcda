//! Adapters layer
//!
//! Transport-facing code that translates external requests into
//! application use cases.

pub mod http;
