//! Processor transport port.
//!
//! Defines the contract for calling the payment processor's server-to-server
//! API. The verification engine never uses it; only the transaction
//! follow-up workflow does.
//!
//! # Design
//!
//! - **Request/response**: one call, one response or one error
//! - **No retries**: timeouts and retries belong to the implementation
//! - **Untyped payload**: responses stay JSON, interpretation is the caller's

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Port for issuing calls to the payment processor.
#[async_trait]
pub trait ProcessorTransport: Send + Sync {
    /// Send a request and return the decoded response body.
    async fn send(&self, request: ProcessorRequest) -> Result<ProcessorResponse, TransportError>;
}

/// Processor API operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessorOperation {
    /// Obtain an `AuthCode` for a new trade.
    Authorize,

    /// Query the status of a trade by `AuthCode`.
    TradeQuery,

    /// Confirm (capture) a paid trade by `AuthCode`.
    PaymentConfirm,
}

impl ProcessorOperation {
    /// Processor API endpoint name.
    pub fn endpoint(&self) -> &'static str {
        match self {
            ProcessorOperation::Authorize => "AuthGlobal",
            ProcessorOperation::TradeQuery => "TradeQuery",
            ProcessorOperation::PaymentConfirm => "PaymentConfirm",
        }
    }
}

impl std::fmt::Display for ProcessorOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.endpoint())
    }
}

/// A call to the processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessorRequest {
    pub operation: ProcessorOperation,

    /// Form parameters sent with the call.
    pub parameters: BTreeMap<String, String>,
}

impl ProcessorRequest {
    pub fn new(operation: ProcessorOperation, parameters: BTreeMap<String, String>) -> Self {
        Self {
            operation,
            parameters,
        }
    }
}

/// Decoded JSON body returned by the processor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessorResponse {
    pub fields: Map<String, Value>,
}

impl ProcessorResponse {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Field as text; numbers are rendered, absent fields are `None`.
    pub fn text(&self, name: &str) -> Option<String> {
        match self.fields.get(name)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

/// Errors from processor transport operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportError {
    /// Error code for categorization.
    pub code: TransportErrorCode,

    /// Human-readable message.
    pub message: String,

    /// HTTP status returned by the processor (if any).
    pub status: Option<u16>,

    /// Whether the call can be retried.
    pub retryable: bool,
}

impl TransportError {
    pub fn new(code: TransportErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            status: None,
            retryable: code.is_retryable(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(TransportErrorCode::NetworkError, message)
    }

    /// Create a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(TransportErrorCode::Timeout, message)
    }

    /// Create a provider error.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(TransportErrorCode::ProviderError, message)
    }

    /// Create an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(TransportErrorCode::InvalidResponse, message)
    }
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for TransportError {}

/// Transport error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportErrorCode {
    /// Network connectivity issue.
    NetworkError,

    /// Call exceeded the client timeout.
    Timeout,

    /// Processor answered with a non-success status.
    ProviderError,

    /// Response body could not be decoded.
    InvalidResponse,
}

impl TransportErrorCode {
    /// Check if this error type is typically retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TransportErrorCode::NetworkError | TransportErrorCode::Timeout
        )
    }
}

impl std::fmt::Display for TransportErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TransportErrorCode::NetworkError => "network_error",
            TransportErrorCode::Timeout => "timeout",
            TransportErrorCode::ProviderError => "provider_error",
            TransportErrorCode::InvalidResponse => "invalid_response",
        };
        write!(f, "{}", s)
    }
}
