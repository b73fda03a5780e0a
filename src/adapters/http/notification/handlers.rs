//! HTTP handlers for inbound payment notifications.
//!
//! Turns a request into an `InboundPayload`:
//! - query and form fields are merged (form wins)
//! - the client address is the socket peer, or the last `X-Forwarded-For`
//!   entry (the one appended by the trusted proxy) when enabled

use std::collections::HashMap;
use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Form, Json,
};

use crate::application::handlers::{VerifyNotificationCommand, VerifyNotificationHandler};
use crate::domain::notification::{CanonicalResult, InboundPayload, NotificationError};

use super::dto::ErrorResponse;

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for the notification endpoint.
#[derive(Clone)]
pub struct NotificationAppState {
    pub verify_handler: VerifyNotificationHandler,

    /// Take the client address from the last `X-Forwarded-For` entry.
    pub trust_forwarded_for: bool,
}

impl NotificationAppState {
    pub fn new(verify_handler: VerifyNotificationHandler) -> Self {
        Self {
            verify_handler,
            trust_forwarded_for: false,
        }
    }

    pub fn with_trust_forwarded_for(mut self, trust: bool) -> Self {
        self.trust_forwarded_for = trust;
        self
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// GET|POST /notify - Verify a Return or Notify message
pub async fn receive_notification(
    State(state): State<NotificationAppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    form: Option<Form<HashMap<String, String>>>,
) -> Result<Json<CanonicalResult>, NotificationApiError> {
    let client_ip = resolve_client_ip(&headers, peer, state.trust_forwarded_for);
    let form = form.map(|Form(fields)| fields).unwrap_or_default();

    let cmd = VerifyNotificationCommand {
        payload: InboundPayload::new(query, form, client_ip),
    };

    let result = state.verify_handler.handle(cmd)?;
    Ok(Json(result))
}

fn resolve_client_ip(headers: &HeaderMap, peer: SocketAddr, trust_forwarded_for: bool) -> String {
    if trust_forwarded_for {
        let forwarded = headers
            .get("X-Forwarded-For")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.rsplit(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(ip) = forwarded {
            return ip.to_string();
        }
    }
    peer.ip().to_canonical().to_string()
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts rejections to HTTP responses.
#[derive(Debug)]
pub struct NotificationApiError(NotificationError);

impl From<NotificationError> for NotificationApiError {
    fn from(err: NotificationError) -> Self {
        Self(err)
    }
}

impl IntoResponse for NotificationApiError {
    fn into_response(self) -> axum::response::Response {
        let status: StatusCode = self.0.status_code();
        let body = ErrorResponse::new(self.0.error_code(), self.0.reason());
        (status, Json(body)).into_response()
    }
}
