use super::helpers::{error_fields, to_json};
use super::ir::{ChatRole, ConversationMessage, MessageContent, OutputChunk, RawContentPart};
use super::{ChatBackend, ChunkStream};
use crate::config::AppConfig;
use crate::error::{AppError, StreamError};
use async_trait::async_trait;
use bytes::Bytes;
use eventsource_stream::{EventStreamError, Eventsource};
use futures_core::Stream;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Display;
use tokio_stream::StreamExt;

pub const ANTHROPIC_VERSION: &str = "2023-06-01";

// --- Anthropic Wire Types (Request) ---

#[derive(Debug, Serialize, PartialEq)]
pub struct AnthropicRequest {
    pub model: String,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub messages: Vec<AnthropicMessage>,
    pub stream: bool,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct AnthropicMessage {
    pub role: String,
    pub content: String,
}

impl AnthropicRequest {
    /// System turns are lifted into the top-level `system` field (joined by a
    /// blank line); human turns become `user` messages in order.
    pub fn streaming(model: &str, max_tokens: u32, messages: &[ConversationMessage]) -> Self {
        let system: Vec<&str> = messages
            .iter()
            .filter(|m| m.role == ChatRole::System)
            .map(|m| m.text.as_str())
            .collect();

        let messages = messages
            .iter()
            .filter(|m| m.role == ChatRole::Human)
            .map(|m| AnthropicMessage {
                role: "user".to_string(),
                content: m.text.clone(),
            })
            .collect();

        Self {
            model: model.to_string(),
            max_tokens,
            system: if system.is_empty() {
                None
            } else {
                Some(system.join("\n\n"))
            },
            messages,
            stream: true,
        }
    }
}

// --- Streaming event types ---
// Anthropic SSE uses `event:` + `data:` lines.
// The `data:` payload always has a `type` field matching the event name.

#[derive(Debug, Deserialize)]
struct StreamContentBlockDelta {
    delta: StreamDelta,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum StreamDelta {
    #[serde(rename = "text_delta")]
    TextDelta { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct StreamContentBlockStart {
    content_block: Value,
}

#[derive(Debug, PartialEq)]
enum Decoded {
    Chunk(OutputChunk),
    Done,
    Failed(StreamError),
    Skip,
}

fn decode_event(name: &str, data: &str) -> Decoded {
    if data.trim().is_empty() {
        return Decoded::Skip;
    }

    let v: Value = match serde_json::from_str(data) {
        Ok(v) => v,
        Err(e) => {
            log::warn!("Skipping undecodable stream event: {}", e);
            return Decoded::Skip;
        }
    };

    let event_type = v
        .get("type")
        .and_then(|t| t.as_str())
        .unwrap_or(name)
        .to_string();

    match event_type.as_str() {
        "content_block_delta" => match serde_json::from_value::<StreamContentBlockDelta>(v.clone()) {
            Ok(StreamContentBlockDelta {
                delta: StreamDelta::TextDelta { text },
            }) => Decoded::Chunk(OutputChunk::text(text)),
            Ok(_) => Decoded::Chunk(OutputChunk::Metadata(v)),
            Err(e) => {
                log::warn!("Skipping malformed content_block_delta: {}", e);
                Decoded::Skip
            }
        },
        "content_block_start" => match serde_json::from_value::<StreamContentBlockStart>(v.clone()) {
            Ok(evt) => {
                let part = RawContentPart::from(evt.content_block);
                if part.is_text() && part.text.as_deref().is_some_and(|t| !t.is_empty()) {
                    Decoded::Chunk(OutputChunk::Message {
                        content: MessageContent::Parts(vec![part]),
                    })
                } else {
                    Decoded::Chunk(OutputChunk::Metadata(v))
                }
            }
            Err(_) => Decoded::Chunk(OutputChunk::Metadata(v)),
        },
        "message_stop" => Decoded::Done,
        "error" => {
            let (kind, message) = error_fields(&v)
                .unwrap_or_else(|| ("error".to_string(), "unknown error".to_string()));
            Decoded::Failed(StreamError::Backend { kind, message })
        }
        _ => Decoded::Chunk(OutputChunk::Metadata(v)),
    }
}

/// Turn a raw SSE byte stream into backend chunks. Events are pulled one at a
/// time as the consumer asks for the next chunk.
pub fn decode_sse_stream<S, E>(bytes: S) -> ChunkStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    Box::pin(async_stream::stream! {
        let mut events = Box::pin(bytes.eventsource());

        while let Some(item) = events.next().await {
            let event = match item {
                Ok(event) => event,
                Err(EventStreamError::Transport(e)) => {
                    log::error!("Upstream stream error: {}", e);
                    yield Err(StreamError::Transport(e.to_string()));
                    break;
                }
                Err(e) => {
                    log::error!("Undecodable SSE stream: {}", e);
                    yield Err(StreamError::Transport(e.to_string()));
                    break;
                }
            };
            log::trace!("Anthropic SSE: {:?}", event);

            match decode_event(&event.event, &event.data) {
                Decoded::Chunk(chunk) => yield Ok(chunk),
                Decoded::Skip => {}
                Decoded::Done => break,
                Decoded::Failed(e) => {
                    log::error!("Backend reported a stream error: {}", e);
                    yield Err(e);
                    break;
                }
            }
        }
    })
}

/// Streams completions from the Anthropic Messages API.
#[derive(Debug, Clone)]
pub struct AnthropicBackend {
    client: reqwest::Client,
    base_url: String,
    max_tokens: u32,
}

impl AnthropicBackend {
    pub fn new(client: reqwest::Client, config: &AppConfig) -> Self {
        Self {
            client,
            base_url: config.backend_base_url.trim_end_matches('/').to_string(),
            max_tokens: config.max_tokens,
        }
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }
}

#[async_trait]
impl ChatBackend for AnthropicBackend {
    async fn open_stream(
        &self,
        api_key: &str,
        model: &str,
        messages: &[ConversationMessage],
    ) -> Result<ChunkStream, AppError> {
        let body = to_json(&AnthropicRequest::streaming(model, self.max_tokens, messages))?;

        let resp = self
            .client
            .post(self.messages_url())
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                log::error!("Failed to reach backend: {}", e);
                AppError::BackendOpen {
                    status: e.status().map(|s| s.as_u16()),
                    message: e.to_string(),
                    details: None,
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let parsed = serde_json::from_str::<Value>(&text).ok();
            let message = parsed
                .as_ref()
                .and_then(error_fields)
                .map(|(_, m)| m)
                .unwrap_or_else(|| status.to_string());
            let details = parsed.or_else(|| (!text.is_empty()).then(|| Value::String(text)));
            log::error!("Backend rejected stream request: {} {}", status, message);
            return Err(AppError::BackendOpen {
                status: Some(status.as_u16()),
                message,
                details,
            });
        }

        Ok(decode_sse_stream(resp.bytes_stream()))
    }
}
