use chrono::Local;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Enums
// =============================================================================

/// Author of a conversation turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    /// Typed or dictated by the person at the keyboard.
    User,
    /// Produced by the remote responder, or an advisory standing in for it.
    Bot,
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sender::User => write!(f, "user"),
            Sender::Bot => write!(f, "bot"),
        }
    }
}

// =============================================================================
// Structured content
// =============================================================================

/// One labeled entry of a [`ContentBlock::Section`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub scheme: String,
    #[serde(default)]
    pub description: String,
}

/// A single block of a bot reply.
///
/// Deserializes from `{"type": "header" | "section" | "paragraph", ...}`.
/// A block with an unknown tag or missing fields fails to deserialize on
/// its own, which lets callers drop it without losing its neighbours.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Header { content: String },
    Section { title: String, items: Vec<Item> },
    Paragraph { content: String },
}

/// Ordered block sequence making up one bot reply.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StructuredContent(pub Vec<ContentBlock>);

impl StructuredContent {
    pub fn new(blocks: Vec<ContentBlock>) -> Self {
        Self(blocks)
    }

    /// Single-paragraph content wrapping `text` verbatim.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self(vec![ContentBlock::Paragraph {
            content: text.into(),
        }])
    }

    pub fn blocks(&self) -> &[ContentBlock] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Flatten to one line per header, section title, item and paragraph.
    ///
    /// This is what gets handed to speech playback.
    pub fn plain_text(&self) -> String {
        let mut lines = Vec::new();
        for block in &self.0 {
            match block {
                ContentBlock::Header { content } | ContentBlock::Paragraph { content } => {
                    lines.push(content.clone());
                }
                ContentBlock::Section { title, items } => {
                    lines.push(title.clone());
                    for item in items {
                        if item.description.is_empty() {
                            lines.push(item.scheme.clone());
                        } else {
                            lines.push(format!("{}: {}", item.scheme, item.description));
                        }
                    }
                }
            }
        }
        lines.join("\n")
    }
}

// =============================================================================
// Raw reply payload
// =============================================================================

/// The `reply` field of a backend response, resolved once from its
/// duck-typed JSON shape.
#[derive(Clone, Debug, PartialEq)]
pub enum RawReplyPayload {
    /// A string: plain text, or a serialized block array.
    Scalar(String),
    /// Unvalidated block objects.
    Blocks(Vec<serde_json::Value>),
    /// `null`, or no reply at all.
    Missing,
}

impl RawReplyPayload {
    pub fn from_value(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => RawReplyPayload::Missing,
            Value::String(s) => RawReplyPayload::Scalar(s),
            Value::Array(blocks) => RawReplyPayload::Blocks(blocks),
            obj @ Value::Object(_) => RawReplyPayload::Blocks(vec![obj]),
            other => RawReplyPayload::Scalar(other.to_string()),
        }
    }

    pub fn scalar(text: impl Into<String>) -> Self {
        RawReplyPayload::Scalar(text.into())
    }
}

// =============================================================================
// Messages
// =============================================================================

/// Sender-specific payload of a turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "sender", rename_all = "snake_case")]
pub enum MessageBody {
    User { text: String },
    Bot { content: StructuredContent },
}

/// One turn of the conversation. Immutable once appended to the log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    /// Time of day the turn was created, e.g. `"03:42 PM"`.
    pub timestamp: String,
    #[serde(flatten)]
    pub body: MessageBody,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: clock_time(),
            body: MessageBody::User { text: text.into() },
        }
    }

    pub fn bot(content: StructuredContent) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: clock_time(),
            body: MessageBody::Bot { content },
        }
    }

    pub fn sender(&self) -> Sender {
        match self.body {
            MessageBody::User { .. } => Sender::User,
            MessageBody::Bot { .. } => Sender::Bot,
        }
    }

    /// Text of a user turn; `None` for bot turns.
    pub fn text(&self) -> Option<&str> {
        match &self.body {
            MessageBody::User { text } => Some(text),
            MessageBody::Bot { .. } => None,
        }
    }

    /// Content of a bot turn; `None` for user turns.
    pub fn content(&self) -> Option<&StructuredContent> {
        match &self.body {
            MessageBody::Bot { content } => Some(content),
            MessageBody::User { .. } => None,
        }
    }
}

/// Current local time as hour and minute, 12-hour clock.
pub fn clock_time() -> String {
    Local::now().format("%I:%M %p").to_string()
}
