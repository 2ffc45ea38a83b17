pub mod middleware;
pub mod proxy;
pub mod router;
pub mod stream;

use crate::config::{AppConfig, SecretSource};
use crate::modality::chat::anthropic::AnthropicBackend;
use proxy::ProxyState;
use std::sync::Arc;

pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let backend = AnthropicBackend::new(reqwest::Client::new(), &config);
    let app = router::create_router(ProxyState {
        backend: Arc::new(backend),
        secrets: SecretSource::Process,
    });

    let listener =
        tokio::net::TcpListener::bind((config.server_host.as_str(), config.server_port)).await?;
    log::info!("Axum server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Received Ctrl+C, shutting down");
}
