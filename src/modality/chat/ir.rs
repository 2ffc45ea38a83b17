use serde::Deserialize;
use serde_json::Value;

/// Canonical role of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    System,
    Human,
}

/// A normalized `{role, text}` pair handed to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationMessage {
    pub role: ChatRole,
    pub text: String,
}

impl ConversationMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            text: text.into(),
        }
    }

    pub fn human(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Human,
            text: text.into(),
        }
    }
}

/// One element of a content list. Built from any JSON value; fields that are
/// missing or not strings come out as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Value")]
pub struct RawContentPart {
    pub kind: Option<String>,
    pub text: Option<String>,
}

impl RawContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: Some("text".to_string()),
            text: Some(text.into()),
        }
    }

    pub fn typed(kind: impl Into<String>) -> Self {
        Self {
            kind: Some(kind.into()),
            text: None,
        }
    }

    pub fn is_text(&self) -> bool {
        self.kind.as_deref() == Some("text")
    }

    /// The text of a text-typed part (empty if it has none), `None` for any
    /// other part.
    fn text_fragment(&self) -> Option<&str> {
        self.is_text().then(|| self.text.as_deref().unwrap_or(""))
    }
}

impl From<Value> for RawContentPart {
    fn from(value: Value) -> Self {
        let field = |name: &str| value.get(name).and_then(Value::as_str).map(String::from);
        Self {
            kind: field("type"),
            text: field("text"),
        }
    }
}

/// Message content as it appears on the wire: a plain string or a list of
/// typed parts. Anything else is kept as `Unrecognized` and reads as no text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub enum MessageContent {
    Text(String),
    Parts(Vec<RawContentPart>),
    Unrecognized(Value),
}

impl Default for MessageContent {
    fn default() -> Self {
        MessageContent::Unrecognized(Value::Null)
    }
}

impl From<Value> for MessageContent {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => MessageContent::Text(s),
            Value::Array(items) => {
                MessageContent::Parts(items.into_iter().map(RawContentPart::from).collect())
            }
            other => MessageContent::Unrecognized(other),
        }
    }
}

impl From<&str> for MessageContent {
    fn from(s: &str) -> Self {
        MessageContent::Text(s.to_string())
    }
}

impl MessageContent {
    /// Text fragments in order: the string itself for `Text`, every
    /// text-typed part for `Parts`, nothing otherwise. Both history
    /// normalization and chunk extraction read content through this.
    pub fn text_parts(&self) -> impl Iterator<Item = &str> + '_ {
        let (whole, parts): (Option<&str>, &[RawContentPart]) = match self {
            MessageContent::Text(s) => (Some(s.as_str()), &[]),
            MessageContent::Parts(parts) => (None, parts.as_slice()),
            MessageContent::Unrecognized(_) => (None, &[]),
        };
        whole
            .into_iter()
            .chain(parts.iter().filter_map(RawContentPart::text_fragment))
    }

    pub fn first_text(&self) -> &str {
        self.text_parts().next().unwrap_or("")
    }

    pub fn joined_text(&self) -> String {
        self.text_parts().collect()
    }
}

/// One prior turn as sent by the client. The role is untrusted text.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub struct IncomingHistoryEntry {
    pub role: Option<String>,
    pub content: MessageContent,
}

impl From<Value> for IncomingHistoryEntry {
    fn from(mut value: Value) -> Self {
        let role = value.get("role").and_then(Value::as_str).map(String::from);
        let content = value
            .get_mut("content")
            .map(Value::take)
            .map(MessageContent::from)
            .unwrap_or_default();
        Self { role, content }
    }
}

/// Body of `POST /api/chat-direct`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub messages: Option<Vec<IncomingHistoryEntry>>,
    #[serde(default, rename = "modelName")]
    pub model_name: Option<String>,
}

/// One unit yielded by a backend stream.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputChunk {
    /// A model answer fragment.
    Message { content: MessageContent },
    /// Anything else the backend emits (start/stop markers, usage, pings).
    Metadata(Value),
}

impl OutputChunk {
    pub fn text(text: impl Into<String>) -> Self {
        OutputChunk::Message {
            content: MessageContent::Text(text.into()),
        }
    }
}
