//! license-bridge HTTP Server
//!
//! Axum-based server that builds provider orders, acquires licenses from
//! the backend and repacks them for the payment provider's webhook.

mod handlers;
mod routes;
mod state;

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bridge_gateway::{BackendGateway, BridgeConfig, HttpTransport};

use crate::routes::create_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = BridgeConfig::from_env().inspect_err(|e| {
        tracing::error!("{e}");
        tracing::error!("  Set BRIDGE_SUBMIT_URL and BRIDGE_FINALIZE_URL in .env");
    })?;

    tracing::info!("Submit endpoint:   {}", config.submit_url);
    tracing::info!("Finalize endpoint: {}", config.finalize_url);
    tracing::info!("Currency:          {}", config.currency);

    let addr = config.bind_addr.clone();
    let gateway = BackendGateway::new(Arc::new(HttpTransport::new()));
    let app = create_router(AppState::new(gateway, config));

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("license-bridge server running on http://{}", addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET    /health                      - Health check");
    tracing::info!("  POST   /api/orders                  - Build order");
    tracing::info!("  POST   /api/orders/repack           - Submit and repack (webhook mode)");
    tracing::info!("  POST   /api/sessions                - Start license session");
    tracing::info!("  DELETE /api/sessions/{{id}}           - End license session");
    tracing::info!("  POST   /api/sessions/{{id}}/licenses  - Acquire licenses (direct mode)");
    tracing::info!("  POST   /api/sessions/{{id}}/finalize  - Finalize order");

    axum::serve(listener, app).await?;

    Ok(())
}
