//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `ProcessorTransport` - server-to-server calls to the payment processor

mod processor_transport;

pub use processor_transport::{
    ProcessorOperation, ProcessorRequest, ProcessorResponse, ProcessorTransport, TransportError,
    TransportErrorCode,
};
