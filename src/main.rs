//! MyCard Notify server.
//!
//! Serves the notification endpoint that receives browser Return redirects
//! and processor Notify pushes.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mycard_notify::adapters::http::notification::{notification_router, NotificationAppState};
use mycard_notify::application::VerifyNotificationHandler;
use mycard_notify::config::{AppConfig, ServerConfig};
use mycard_notify::domain::notification::NotificationParser;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    let parser = Arc::new(NotificationParser::new(config.processor.trust_context()));
    let state = NotificationAppState::new(VerifyNotificationHandler::new(parser))
        .with_trust_forwarded_for(config.server.trust_forwarded_for);
    let app = notification_router(state);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        environment = ?config.server.environment,
        sandbox = config.processor.sandbox,
        trusted_ips = ?config.processor.trusted_ips_list(),
        "Notification endpoint listening"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_new(&server.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    if server.is_production() {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
    }
}
