use super::middleware;
use super::stream::{ByteStreamAdapter, StreamOutcome};
use crate::config::SecretSource;
use crate::error::AppError;
use crate::modality::chat::normalize::build_conversation;
use crate::modality::chat::{ChatBackend, ChunkStream};
use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::Response;
use std::sync::Arc;
use tokio_stream::StreamExt;

#[derive(Clone)]
pub struct ProxyState {
    pub backend: Arc<dyn ChatBackend>,
    pub secrets: SecretSource,
}

/// `POST /api/chat-direct`: gate, normalize, open the backend stream and
/// relay its text as a plain byte stream.
pub async fn chat_direct(
    State(state): State<ProxyState>,
    body: Bytes,
) -> Result<Response, AppError> {
    let request_id = uuid::Uuid::new_v4();
    let secrets = state.secrets.snapshot();
    let admitted = middleware::admit(&secrets, &body)?;

    let messages = build_conversation(
        admitted.request.messages.as_deref(),
        admitted.request.prompt.as_deref(),
    );
    log::info!(
        "[{}] Opening stream: model={} messages={}",
        request_id,
        admitted.model,
        messages.len()
    );

    let mut source = state
        .backend
        .open_stream(&admitted.api_key, &admitted.model, &messages)
        .await?;

    // Nothing is committed until the first chunk arrives.
    let first = match source.next().await {
        Some(Err(e)) => {
            log::error!("[{}] Stream failed before first chunk: {}", request_id, e);
            return Err(e.into());
        }
        first => first,
    };
    let source: ChunkStream = Box::pin(tokio_stream::iter(first).chain(source));

    let (adapter, monitor) = ByteStreamAdapter::new(source);
    tokio::spawn(async move {
        match monitor.outcome().await {
            StreamOutcome::Completed => log::info!("[{}] Stream completed", request_id),
            StreamOutcome::Failed(reason) => {
                log::warn!("[{}] Stream failed: {}", request_id, reason)
            }
        }
    });

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(Body::from_stream(adapter.into_stream()))
        .map_err(|e| AppError::Internal(e.to_string()))
}
