//! WhatsApp webhook payload model.
//!
//! The Graph API delivers a deeply nested tree (entry → changes → value
//! → messages/contacts/metadata). Everything here is transient: decoded,
//! flattened into `InboundMessage`s, and dropped with the request.

use serde::Deserialize;
use tracing::debug;

// ── Payload tree ────────────────────────────────────────────────────

/// Top-level webhook delivery.
#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub entry: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub changes: Vec<Change>,
}

#[derive(Debug, Deserialize)]
pub struct Change {
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub value: ChangeValue,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChangeValue {
    pub metadata: Option<Metadata>,
    #[serde(default)]
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub messages: Vec<RawMessage>,
}

#[derive(Debug, Deserialize)]
pub struct Metadata {
    pub phone_number_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Contact {
    pub wa_id: Option<String>,
}

/// One message as it appears on the wire.
///
/// Loosely shaped on purpose — real deliveries mix kinds freely — and
/// classified into a [`MessageKind`] exactly once, at flatten time.
#[derive(Debug, Deserialize)]
pub struct RawMessage {
    pub from: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: String,
    pub text: Option<TextBody>,
    pub button: Option<ButtonPayload>,
    pub interactive: Option<InteractivePayload>,
}

#[derive(Debug, Deserialize)]
pub struct TextBody {
    pub body: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ButtonPayload {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct InteractivePayload {
    #[serde(default, rename = "type")]
    pub kind: String,
    pub button_reply: Option<ReplyTitle>,
    pub list_reply: Option<ReplyTitle>,
}

#[derive(Debug, Deserialize)]
pub struct ReplyTitle {
    pub title: Option<String>,
}

impl RawMessage {
    /// Classify the wire shape into a [`MessageKind`].
    ///
    /// Precedence: text body, then the legacy `button` field, then the
    /// interactive reply payloads. A recognized type whose expected
    /// field is missing falls through to the next candidate.
    fn classify(&self) -> MessageKind {
        if self.kind == "text"
            && let Some(body) = self.text.as_ref().and_then(|t| t.body.clone())
        {
            return MessageKind::Text { body };
        }
        if let Some(title) = self.button.as_ref().and_then(|b| b.text.clone()) {
            return MessageKind::ButtonReply { title };
        }
        if let Some(interactive) = &self.interactive {
            match interactive.kind.as_str() {
                "button" => {
                    if let Some(title) =
                        interactive.button_reply.as_ref().and_then(|r| r.title.clone())
                    {
                        return MessageKind::InteractiveButton { title };
                    }
                }
                "list_reply" => {
                    if let Some(title) =
                        interactive.list_reply.as_ref().and_then(|r| r.title.clone())
                    {
                        return MessageKind::InteractiveList { title };
                    }
                }
                _ => {}
            }
        }
        MessageKind::Unrecognized
    }
}

// ── Classified message ──────────────────────────────────────────────

/// Message kind, tagged at parse time so downstream code never probes
/// raw fields again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageKind {
    /// Free-form text message.
    Text { body: String },
    /// Legacy quick-reply button press.
    ButtonReply { title: String },
    /// Interactive message, `button_reply` sub-type.
    InteractiveButton { title: String },
    /// Interactive message, `list_reply` sub-type.
    InteractiveList { title: String },
    /// Anything else (media, reactions, unknown types). No payload.
    Unrecognized,
}

impl MessageKind {
    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::ButtonReply { .. } => "button_reply",
            Self::InteractiveButton { .. } => "interactive_button",
            Self::InteractiveList { .. } => "interactive_list",
            Self::Unrecognized => "unrecognized",
        }
    }

    /// User-supplied text usable as a generation prompt.
    ///
    /// Trimmed; whitespace-only payloads yield `None`. Absence of a
    /// prompt is `None`, never an empty string.
    pub fn prompt(&self) -> Option<String> {
        let raw = match self {
            Self::Text { body } => body,
            Self::ButtonReply { title }
            | Self::InteractiveButton { title }
            | Self::InteractiveList { title } => title,
            Self::Unrecognized => return None,
        };
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }
}

/// One inbound message with a resolved reply address.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// Sender identifier — where replies go.
    pub from: String,
    pub kind: MessageKind,
}

impl WebhookPayload {
    /// Flatten the event tree into inbound messages.
    ///
    /// Only changes with `field == "messages"` and a non-empty message
    /// list are relevant; everything else is skipped. The reply address
    /// falls back from the message's own `from` to the first contact's
    /// `wa_id` to the metadata phone number id; a message with none of
    /// the three has nowhere to reply and is dropped.
    pub fn into_messages(self) -> Vec<InboundMessage> {
        let mut flattened = Vec::new();
        for entry in self.entry {
            for change in entry.changes {
                if change.field != "messages" || change.value.messages.is_empty() {
                    debug!(field = %change.field, "skipping change without messages");
                    continue;
                }
                let value = change.value;
                let contact_id = value.contacts.first().and_then(|c| c.wa_id.clone());
                let metadata_id = value
                    .metadata
                    .as_ref()
                    .and_then(|m| m.phone_number_id.clone());
                for message in value.messages {
                    let Some(from) = message
                        .from
                        .clone()
                        .or_else(|| contact_id.clone())
                        .or_else(|| metadata_id.clone())
                    else {
                        debug!(kind = %message.kind, "dropping message with no reply address");
                        continue;
                    };
                    flattened.push(InboundMessage {
                        from,
                        kind: message.classify(),
                    });
                }
            }
        }
        flattened
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(value: serde_json::Value) -> WebhookPayload {
        serde_json::from_value(value).unwrap()
    }

    // ── Classification ──────────────────────────────────────────────

    #[test]
    fn classify_text_message() {
        let msg: RawMessage = serde_json::from_value(serde_json::json!({
            "from": "15551234567",
            "type": "text",
            "text": {"body": "a cat"}
        }))
        .unwrap();
        assert_eq!(msg.classify(), MessageKind::Text { body: "a cat".into() });
    }

    #[test]
    fn classify_text_without_body_falls_through() {
        let msg: RawMessage = serde_json::from_value(serde_json::json!({
            "type": "text",
            "text": {}
        }))
        .unwrap();
        assert_eq!(msg.classify(), MessageKind::Unrecognized);
    }

    #[test]
    fn classify_legacy_button() {
        let msg: RawMessage = serde_json::from_value(serde_json::json!({
            "type": "button",
            "button": {"text": "Retry"}
        }))
        .unwrap();
        assert_eq!(
            msg.classify(),
            MessageKind::ButtonReply { title: "Retry".into() }
        );
    }

    #[test]
    fn classify_interactive_button_reply() {
        let msg: RawMessage = serde_json::from_value(serde_json::json!({
            "type": "interactive",
            "interactive": {"type": "button", "button_reply": {"title": "Go"}}
        }))
        .unwrap();
        assert_eq!(
            msg.classify(),
            MessageKind::InteractiveButton { title: "Go".into() }
        );
    }

    #[test]
    fn classify_interactive_list_reply() {
        let msg: RawMessage = serde_json::from_value(serde_json::json!({
            "type": "interactive",
            "interactive": {"type": "list_reply", "list_reply": {"title": "Sunset"}}
        }))
        .unwrap();
        assert_eq!(
            msg.classify(),
            MessageKind::InteractiveList { title: "Sunset".into() }
        );
    }

    #[test]
    fn classify_prefers_legacy_button_over_interactive() {
        // Both candidate fields present on one record — the simple
        // button field wins.
        let msg: RawMessage = serde_json::from_value(serde_json::json!({
            "type": "interactive",
            "button": {"text": "Plain"},
            "interactive": {"type": "button", "button_reply": {"title": "Nested"}}
        }))
        .unwrap();
        assert_eq!(
            msg.classify(),
            MessageKind::ButtonReply { title: "Plain".into() }
        );
    }

    #[test]
    fn classify_unknown_type() {
        let msg: RawMessage = serde_json::from_value(serde_json::json!({
            "type": "audio",
            "audio": {"id": "123"}
        }))
        .unwrap();
        assert_eq!(msg.classify(), MessageKind::Unrecognized);
    }

    #[test]
    fn classify_interactive_unknown_subtype() {
        let msg: RawMessage = serde_json::from_value(serde_json::json!({
            "type": "interactive",
            "interactive": {"type": "nfm_reply"}
        }))
        .unwrap();
        assert_eq!(msg.classify(), MessageKind::Unrecognized);
    }

    // ── Prompt extraction ───────────────────────────────────────────

    #[test]
    fn prompt_trims_text_body() {
        let kind = MessageKind::Text { body: "  a cat  ".into() };
        assert_eq!(kind.prompt(), Some("a cat".into()));
    }

    #[test]
    fn prompt_whitespace_only_is_none() {
        let kind = MessageKind::Text { body: "   ".into() };
        assert_eq!(kind.prompt(), None);
    }

    #[test]
    fn prompt_from_button_title() {
        let kind = MessageKind::ButtonReply { title: " Go ".into() };
        assert_eq!(kind.prompt(), Some("Go".into()));
    }

    #[test]
    fn prompt_from_interactive_titles() {
        assert_eq!(
            MessageKind::InteractiveButton { title: "Go".into() }.prompt(),
            Some("Go".into())
        );
        assert_eq!(
            MessageKind::InteractiveList { title: "Sunset".into() }.prompt(),
            Some("Sunset".into())
        );
    }

    #[test]
    fn prompt_unrecognized_is_none() {
        assert_eq!(MessageKind::Unrecognized.prompt(), None);
    }

    // ── Flattening ──────────────────────────────────────────────────

    #[test]
    fn flatten_full_payload() {
        let payload = parse(serde_json::json!({
            "object": "whatsapp_business_account",
            "entry": [{
                "id": "1",
                "changes": [{
                    "field": "messages",
                    "value": {
                        "messaging_product": "whatsapp",
                        "metadata": {"phone_number_id": "999"},
                        "contacts": [{"wa_id": "15551234567"}],
                        "messages": [
                            {"from": "15551234567", "type": "text", "text": {"body": "a cat"}}
                        ]
                    }
                }]
            }]
        }));

        let messages = payload.into_messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].from, "15551234567");
        assert_eq!(messages[0].kind, MessageKind::Text { body: "a cat".into() });
    }

    #[test]
    fn flatten_skips_non_message_changes() {
        let payload = parse(serde_json::json!({
            "entry": [{
                "changes": [
                    {"field": "statuses", "value": {"messages": [
                        {"from": "1", "type": "text", "text": {"body": "ignored"}}
                    ]}},
                    {"field": "messages", "value": {"messages": [
                        {"from": "2", "type": "text", "text": {"body": "kept"}}
                    ]}}
                ]
            }]
        }));

        let messages = payload.into_messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].from, "2");
    }

    #[test]
    fn flatten_skips_empty_message_lists() {
        let payload = parse(serde_json::json!({
            "entry": [{"changes": [{"field": "messages", "value": {"messages": []}}]}]
        }));
        assert!(payload.into_messages().is_empty());
    }

    #[test]
    fn flatten_sender_falls_back_to_contact() {
        let payload = parse(serde_json::json!({
            "entry": [{"changes": [{"field": "messages", "value": {
                "contacts": [{"wa_id": "contact-1"}],
                "messages": [{"type": "text", "text": {"body": "hi"}}]
            }}]}]
        }));

        let messages = payload.into_messages();
        assert_eq!(messages[0].from, "contact-1");
    }

    #[test]
    fn flatten_sender_falls_back_to_metadata() {
        let payload = parse(serde_json::json!({
            "entry": [{"changes": [{"field": "messages", "value": {
                "metadata": {"phone_number_id": "999"},
                "messages": [{"type": "text", "text": {"body": "hi"}}]
            }}]}]
        }));

        let messages = payload.into_messages();
        assert_eq!(messages[0].from, "999");
    }

    #[test]
    fn flatten_drops_message_with_no_reply_address() {
        let payload = parse(serde_json::json!({
            "entry": [{"changes": [{"field": "messages", "value": {
                "messages": [
                    {"type": "text", "text": {"body": "orphan"}},
                    {"from": "5", "type": "text", "text": {"body": "kept"}}
                ]
            }}]}]
        }));

        let messages = payload.into_messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].from, "5");
    }

    #[test]
    fn flatten_empty_payload() {
        assert!(parse(serde_json::json!({})).into_messages().is_empty());
        assert!(parse(serde_json::json!({"entry": []})).into_messages().is_empty());
        assert!(
            parse(serde_json::json!({"entry": [{"changes": []}]}))
                .into_messages()
                .is_empty()
        );
    }

    #[test]
    fn kind_labels() {
        assert_eq!(MessageKind::Text { body: "x".into() }.label(), "text");
        assert_eq!(MessageKind::Unrecognized.label(), "unrecognized");
    }
}
