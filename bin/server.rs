// Alex Core - Web Server
// REST API with Axum over the validators and speech helpers

use alex_core::api::{create_router, AppState};
use alex_core::logging::init_logger;
use alex_core::{InMemoryKeepAlive, ServerConfig};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::from_env()?;
    init_logger(config.verbose);

    info!("🌐 Alex Core - Web Server v{}", alex_core::VERSION);

    // Keep-alive state lives only as long as this process
    let state = AppState::new(Arc::new(InMemoryKeepAlive::new()));
    let app = create_router(state);

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("🚀 Server running on http://{}", addr);
    info!("   POST /api/validate/card");
    info!("   POST /api/validate/bank");
    info!("   POST /api/bundle/price");
    info!("   POST /api/speech/{{state,digits,sanitize}}");
    info!("   POST|DELETE /api/sessions/:id/keep-alive");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl+C: {}", e);
    }
}
