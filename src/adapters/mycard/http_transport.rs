//! MyCard HTTP transport adapter.
//!
//! Implements the `ProcessorTransport` port against the MyCard billing API.
//! Parameters are posted form-encoded; responses are JSON objects.
//!
//! # Configuration
//!
//! ```ignore
//! let config = MyCardTransportConfig::sandbox().with_timeout(Duration::from_secs(10));
//! let transport = MyCardHttpTransport::new(config)?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::ports::{
    ProcessorOperation, ProcessorRequest, ProcessorResponse, ProcessorTransport, TransportError,
};

/// Production API host.
pub const PRODUCTION_BASE_URL: &str = "https://b2b.mycard520.com.tw";

/// Sandbox API host.
pub const SANDBOX_BASE_URL: &str = "https://test.b2b.mycard520.com.tw";

const API_PATH: &str = "MyBillingPay/v1.1";

/// HTTP transport configuration.
#[derive(Debug, Clone)]
pub struct MyCardTransportConfig {
    base_url: String,
    timeout: Duration,
}

impl MyCardTransportConfig {
    pub fn production() -> Self {
        Self {
            base_url: PRODUCTION_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn sandbox() -> Self {
        Self {
            base_url: SANDBOX_BASE_URL.to_string(),
            ..Self::production()
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// `ProcessorTransport` over HTTPS.
pub struct MyCardHttpTransport {
    config: MyCardTransportConfig,
    http_client: reqwest::Client,
}

impl MyCardHttpTransport {
    pub fn new(config: MyCardTransportConfig) -> Result<Self, TransportError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TransportError::network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Full URL for an operation.
    pub fn endpoint_url(&self, operation: ProcessorOperation) -> String {
        format!(
            "{}/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            API_PATH,
            operation.endpoint()
        )
    }
}

#[async_trait]
impl ProcessorTransport for MyCardHttpTransport {
    async fn send(&self, request: ProcessorRequest) -> Result<ProcessorResponse, TransportError> {
        let url = self.endpoint_url(request.operation);

        let response = self
            .http_client
            .post(&url)
            .form(&request.parameters)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::timeout(e.to_string())
                } else {
                    TransportError::network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(
                operation = %request.operation,
                status = status.as_u16(),
                error = %error_text,
                "MyCard API call failed"
            );
            return Err(TransportError::provider(format!("MyCard API error: {}", error_text))
                .with_status(status.as_u16()));
        }

        let body: Value = response.json().await.map_err(|e| {
            TransportError::invalid_response(format!("Failed to parse MyCard response: {}", e))
        })?;

        match body {
            Value::Object(fields) => Ok(ProcessorResponse::new(fields)),
            other => Err(TransportError::invalid_response(format!(
                "expected JSON object, got {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::TransportErrorCode;
    use axum::{http::StatusCode, routing::post, Form, Json, Router};
    use serde_json::json;
    use std::collections::{BTreeMap, HashMap};

    async fn spawn_server(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn transport(base_url: &str) -> MyCardHttpTransport {
        MyCardHttpTransport::new(MyCardTransportConfig::production().with_base_url(base_url))
            .unwrap()
    }

    fn query_request() -> ProcessorRequest {
        let mut params = BTreeMap::new();
        params.insert("AuthCode".to_string(), "AUTH1".to_string());
        ProcessorRequest::new(ProcessorOperation::TradeQuery, params)
    }

    // ══════════════════════════════════════════════════════════════
    // Configuration Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn sandbox_uses_test_host() {
        assert_eq!(MyCardTransportConfig::sandbox().base_url(), SANDBOX_BASE_URL);
        assert_eq!(MyCardTransportConfig::production().base_url(), PRODUCTION_BASE_URL);
    }

    #[test]
    fn endpoint_url_joins_path() {
        let transport = transport("https://example.test/");
        assert_eq!(
            transport.endpoint_url(ProcessorOperation::PaymentConfirm),
            "https://example.test/MyBillingPay/v1.1/PaymentConfirm"
        );
        assert_eq!(
            transport.endpoint_url(ProcessorOperation::Authorize),
            "https://example.test/MyBillingPay/v1.1/AuthGlobal"
        );
    }

    // ══════════════════════════════════════════════════════════════
    // Round Trip Tests (local server)
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn posts_form_and_decodes_json() {
        let app = Router::new().route(
            "/MyBillingPay/v1.1/TradeQuery",
            post(|Form(params): Form<HashMap<String, String>>| async move {
                Json(json!({
                    "ReturnCode": "1",
                    "ReturnMsg": "OK",
                    "EchoAuthCode": params.get("AuthCode").cloned().unwrap_or_default(),
                }))
            }),
        );
        let base = spawn_server(app).await;

        let response = transport(&base).send(query_request()).await.unwrap();

        assert_eq!(response.text("ReturnCode").as_deref(), Some("1"));
        assert_eq!(response.text("EchoAuthCode").as_deref(), Some("AUTH1"));
    }

    #[tokio::test]
    async fn non_success_status_is_provider_error() {
        let app = Router::new().route(
            "/MyBillingPay/v1.1/TradeQuery",
            post(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
        );
        let base = spawn_server(app).await;

        let err = transport(&base).send(query_request()).await.unwrap_err();

        assert_eq!(err.code, TransportErrorCode::ProviderError);
        assert_eq!(err.status, Some(502));
        assert!(!err.retryable);
    }

    #[tokio::test]
    async fn non_object_body_is_invalid_response() {
        let app = Router::new().route(
            "/MyBillingPay/v1.1/TradeQuery",
            post(|| async { Json(json!(["not", "an", "object"])) }),
        );
        let base = spawn_server(app).await;

        let err = transport(&base).send(query_request()).await.unwrap_err();

        assert_eq!(err.code, TransportErrorCode::InvalidResponse);
    }

    #[tokio::test]
    async fn unreachable_host_is_retryable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = transport(&format!("http://{}", addr))
            .send(query_request())
            .await
            .unwrap_err();

        assert!(err.retryable);
    }
}
