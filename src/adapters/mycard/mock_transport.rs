//! Mock processor transport for testing.
//!
//! Provides a configurable implementation of `ProcessorTransport` for unit
//! and integration tests. Supports:
//! - Pre-configured responses per operation
//! - Error injection
//! - Call tracking

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::ports::{
    ProcessorOperation, ProcessorRequest, ProcessorResponse, ProcessorTransport, TransportError,
};

/// Mock processor transport for testing.
///
/// # Example
///
/// ```ignore
/// let mock = MockProcessorTransport::new();
/// mock.set_response(ProcessorOperation::TradeQuery, json!({"ReturnCode": "1"}));
/// mock.set_error(TransportError::timeout("slow"));
/// assert_eq!(mock.call_count(), 0);
/// ```
#[derive(Default, Clone)]
pub struct MockProcessorTransport {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    /// Response returned for each operation.
    responses: HashMap<ProcessorOperation, ProcessorResponse>,

    /// Error to return on next call.
    next_error: Option<TransportError>,

    /// Every request received, in order.
    call_log: Vec<ProcessorRequest>,
}

impl MockProcessorTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the JSON body returned for `operation`. Non-object bodies become `{}`.
    pub fn set_response(&self, operation: ProcessorOperation, body: Value) {
        let fields = match body {
            Value::Object(map) => map,
            _ => Default::default(),
        };
        self.inner
            .lock()
            .unwrap()
            .responses
            .insert(operation, ProcessorResponse::new(fields));
    }

    /// Fail the next call with `error`.
    pub fn set_error(&self, error: TransportError) {
        self.inner.lock().unwrap().next_error = Some(error);
    }

    /// All requests received so far.
    pub fn calls(&self) -> Vec<ProcessorRequest> {
        self.inner.lock().unwrap().call_log.clone()
    }

    pub fn call_count(&self) -> usize {
        self.inner.lock().unwrap().call_log.len()
    }

    /// Clear the call log.
    pub fn reset_calls(&self) {
        self.inner.lock().unwrap().call_log.clear();
    }
}

#[async_trait]
impl ProcessorTransport for MockProcessorTransport {
    async fn send(&self, request: ProcessorRequest) -> Result<ProcessorResponse, TransportError> {
        let mut state = self.inner.lock().unwrap();
        let operation = request.operation;
        state.call_log.push(request);

        if let Some(error) = state.next_error.take() {
            return Err(error);
        }

        state.responses.get(&operation).cloned().ok_or_else(|| {
            TransportError::provider(format!("no response configured for {}", operation))
        })
    }
}
