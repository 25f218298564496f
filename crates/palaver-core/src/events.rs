use serde::{Deserialize, Serialize};

use crate::types::Sender;

/// State-change notifications published by a conversation session.
///
/// Consumers (the renderer, a speech driver, tests) subscribe and re-read
/// the session snapshot on each event; the events themselves carry only
/// enough to decide whether a re-render is needed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A turn was appended at position `index` of the log.
    MessageAppended { index: usize, sender: Sender },

    /// The typing indicator switched on (send issued) or off (reply logged).
    AwaitingReplyChanged { awaiting: bool },
}

impl SessionEvent {
    /// Returns the event name as a static string.
    pub fn event_name(&self) -> &'static str {
        match self {
            SessionEvent::MessageAppended { .. } => "message_appended",
            SessionEvent::AwaitingReplyChanged { .. } => "awaiting_reply_changed",
        }
    }
}
