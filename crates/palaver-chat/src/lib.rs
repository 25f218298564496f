//! Palaver chat crate - the conversation session.
//!
//! Owns the message log and drives each exchange through the transport,
//! the [`ContentParser`] and, when wired, speech playback. Renderers follow
//! along through [`SessionEvent`](palaver_core::SessionEvent)s and
//! [`SessionSnapshot`]s.

pub mod conversation;
pub mod parser;
pub mod render;

pub use conversation::{Conversation, SessionSnapshot, SubmitOutcome};
pub use parser::ContentParser;
pub use render::{render_message, render_transcript, TYPING_INDICATOR};
