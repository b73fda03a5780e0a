//! HTTP adapters (axum).

pub mod notification;
