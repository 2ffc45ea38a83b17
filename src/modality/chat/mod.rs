pub mod anthropic;
pub mod extract;
pub mod helpers;
pub mod ir;
pub mod normalize;

use crate::error::{AppError, StreamError};
use async_trait::async_trait;
use futures_core::Stream;
use ir::{ConversationMessage, OutputChunk};
use std::pin::Pin;

/// Lazy, single-pass sequence of backend chunks. An `Err` item ends it.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<OutputChunk, StreamError>> + Send>>;

/// A generation backend that can stream a reply to a conversation.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Open one streaming generation call. Errors here happen before any
    /// chunk is produced and can still be reported with a status code.
    async fn open_stream(
        &self,
        api_key: &str,
        model: &str,
        messages: &[ConversationMessage],
    ) -> Result<ChunkStream, AppError>;
}
