//! HTTP adapter for inbound payment notifications.
//!
//! Both notification channels are delivered to the same URL; the domain
//! parser decides which one a request belongs to.

mod dto;
mod handlers;
mod routes;

pub use dto::ErrorResponse;
pub use handlers::{receive_notification, NotificationApiError, NotificationAppState};
pub use routes::{notification_router, notification_routes};
