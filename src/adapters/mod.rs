//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `http` - inbound notification endpoint (axum)
//! - `mycard` - processor transport (reqwest) and its test double

pub mod http;
pub mod mycard;

pub use mycard::{MockProcessorTransport, MyCardHttpTransport, MyCardTransportConfig};
