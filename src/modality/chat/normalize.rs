use super::ir::{ChatRole, ConversationMessage, IncomingHistoryEntry};

impl ChatRole {
    /// `"system"` maps to `System`; every other value, including a missing
    /// role, maps to `Human`. Assistant turns are folded into `Human` as well.
    pub fn from_wire(role: Option<&str>) -> Self {
        match role {
            Some("system") => ChatRole::System,
            _ => ChatRole::Human,
        }
    }
}

/// Convert the client's history into canonical messages. Output has the same
/// length and order as the input; a turn without text keeps an empty string.
pub fn normalize_history(entries: &[IncomingHistoryEntry]) -> Vec<ConversationMessage> {
    entries.iter().map(normalize_entry).collect()
}

pub fn normalize_entry(entry: &IncomingHistoryEntry) -> ConversationMessage {
    ConversationMessage {
        role: ChatRole::from_wire(entry.role.as_deref()),
        text: entry.content.first_text().to_string(),
    }
}

/// Messages for the backend: the normalized history, or the bare prompt as a
/// single human turn when there is no history.
pub fn build_conversation(
    history: Option<&[IncomingHistoryEntry]>,
    prompt: Option<&str>,
) -> Vec<ConversationMessage> {
    let messages = normalize_history(history.unwrap_or_default());
    match prompt {
        Some(p) if messages.is_empty() && !p.is_empty() => vec![ConversationMessage::human(p)],
        _ => messages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modality::chat::ir::{MessageContent, RawContentPart};
    use serde_json::json;

    fn entries(value: serde_json::Value) -> Vec<IncomingHistoryEntry> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn empty_history_yields_empty_conversation() {
        assert!(normalize_history(&[]).is_empty());
        assert!(build_conversation(None, None).is_empty());
    }

    #[test]
    fn preserves_length_order_and_roles() {
        let history = entries(json!([
            {"role": "system", "content": "be brief"},
            {"role": "user", "content": "hi"},
            {"role": "assistant", "content": "hello"},
            {"role": "SYSTEM", "content": "shouting"},
            {"content": "no role"},
            42
        ]));
        let messages = normalize_history(&history);

        assert_eq!(
            messages,
            vec![
                ConversationMessage::system("be brief"),
                ConversationMessage::human("hi"),
                ConversationMessage::human("hello"),
                ConversationMessage::human("shouting"),
                ConversationMessage::human("no role"),
                ConversationMessage::human(""),
            ]
        );
    }

    #[test]
    fn uses_first_text_part() {
        let history = entries(json!([
            {"role": "user", "content": [{"type": "image"}, {"type": "text", "text": "hi"}, {"type": "text", "text": "again"}]}
        ]));
        assert_eq!(normalize_history(&history)[0].text, "hi");
    }

    #[test]
    fn turn_without_text_part_is_kept_empty() {
        let history = vec![IncomingHistoryEntry {
            role: Some("user".into()),
            content: MessageContent::Parts(vec![RawContentPart::typed("image")]),
        }];
        let messages = normalize_history(&history);
        assert_eq!(messages, vec![ConversationMessage::human("")]);
    }

    #[test]
    fn text_part_without_text_is_empty() {
        let history = entries(json!([{"role": "user", "content": [{"type": "text"}]}]));
        assert_eq!(normalize_history(&history)[0].text, "");
    }

    #[test]
    fn plain_string_content_is_verbatim() {
        let history = entries(json!([{"role": "user", "content": "hello"}]));
        assert_eq!(normalize_history(&history)[0].text, "hello");
    }

    #[test]
    fn null_content_is_empty() {
        let history = entries(json!([{"role": "user", "content": null}]));
        assert_eq!(normalize_history(&history)[0].text, "");
    }

    #[test]
    fn prompt_fills_empty_history_only() {
        assert_eq!(
            build_conversation(None, Some("hi")),
            vec![ConversationMessage::human("hi")]
        );
        assert!(build_conversation(Some(&[]), Some("")).is_empty());

        let history = entries(json!([{"role": "user", "content": "from history"}]));
        assert_eq!(
            build_conversation(Some(&history), Some("ignored")),
            vec![ConversationMessage::human("from history")]
        );
    }
}
