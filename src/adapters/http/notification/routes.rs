//! Axum router configuration for the notification endpoint.

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use super::handlers::{receive_notification, NotificationAppState};

/// Create the notification router.
///
/// # Routes
/// - `GET /notify` - Browser Return redirect
/// - `POST /notify` - Browser Return form post or processor Notify push
pub fn notification_routes() -> Router<NotificationAppState> {
    Router::new().route("/notify", get(receive_notification).post(receive_notification))
}

/// Create the complete notification router with state and request tracing.
pub fn notification_router(state: NotificationAppState) -> Router {
    notification_routes()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
