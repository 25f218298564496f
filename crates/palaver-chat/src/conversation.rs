//! Conversation state machine: the owner of the message log.
//!
//! States are `Idle` and `Sending`, tracked by the `awaiting_reply` flag.
//! A submit appends the user turn, runs one backend exchange, and appends
//! exactly one bot turn whatever the outcome, so the log never ends on an
//! unanswered message.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::broadcast;

use palaver_core::{advisory, Message, SessionEvent, StructuredContent};
use palaver_transport::{ChatBackend, Reply};
use palaver_voice::SpeechSynthesizer;

use crate::parser::ContentParser;

/// Capacity of the session event channel.
const EVENT_CAPACITY: usize = 256;

/// Language used until [`Conversation::set_language`] is called.
const DEFAULT_LANGUAGE: &str = "en-US";

/// Immutable view of the session handed to renderers.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub messages: Vec<Message>,
    pub awaiting_reply: bool,
}

/// What a call to [`Conversation::submit`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// One user turn and one bot turn were appended.
    Completed,
    /// The text was empty or whitespace only; nothing changed.
    IgnoredEmpty,
    /// Another exchange was still in flight; nothing changed.
    IgnoredBusy,
}

#[derive(Debug, Default)]
struct SessionState {
    messages: Vec<Message>,
    awaiting_reply: bool,
}

/// One chat session with a remote backend.
pub struct Conversation {
    backend: Arc<dyn ChatBackend>,
    parser: ContentParser,
    synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
    state: Mutex<SessionState>,
    language: Mutex<String>,
    events: broadcast::Sender<SessionEvent>,
}

impl Conversation {
    /// Start a session whose log holds only the bot's `greeting`.
    pub fn new(backend: Arc<dyn ChatBackend>, greeting: impl Into<String>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let state = SessionState {
            messages: vec![Message::bot(StructuredContent::paragraph(greeting))],
            awaiting_reply: false,
        };
        Self {
            backend,
            parser: ContentParser::new(),
            synthesizer: None,
            state: Mutex::new(state),
            language: Mutex::new(DEFAULT_LANGUAGE.to_string()),
            events,
        }
    }

    /// Speak every bot reply through `synthesizer`.
    pub fn with_synthesizer(mut self, synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    pub fn with_language(self, language: impl Into<String>) -> Self {
        self.set_language(language);
        self
    }

    /// Change the language used for speech playback.
    pub fn set_language(&self, language: impl Into<String>) {
        let mut current = self.language.lock().unwrap_or_else(|e| e.into_inner());
        *current = language.into();
    }

    pub fn language(&self) -> String {
        self.language
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Receive a [`SessionEvent`] for every change to the log or the
    /// typing indicator.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.lock_state();
        SessionSnapshot {
            messages: state.messages.clone(),
            awaiting_reply: state.awaiting_reply,
        }
    }

    pub fn messages(&self) -> Vec<Message> {
        self.lock_state().messages.clone()
    }

    pub fn len(&self) -> usize {
        self.lock_state().messages.len()
    }

    /// Always false: the greeting is seeded at construction.
    pub fn is_empty(&self) -> bool {
        self.lock_state().messages.is_empty()
    }

    /// True while an exchange is in flight (the `Sending` state).
    pub fn is_awaiting_reply(&self) -> bool {
        self.lock_state().awaiting_reply
    }

    /// Send `text` to the backend and log the exchange.
    ///
    /// A no-op for blank text and while another exchange is in flight.
    /// Otherwise completes only after the bot turn is appended; failures
    /// become advisory paragraphs in the log and are never returned.
    ///
    /// Dropping the future mid-exchange still closes the turn: the bot
    /// turn becomes the [`advisory::CANCELLED`] paragraph and the session
    /// returns to idle.
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        if text.trim().is_empty() {
            tracing::debug!("Ignoring blank submit");
            return SubmitOutcome::IgnoredEmpty;
        }

        {
            let mut state = self.lock_state();
            if state.awaiting_reply {
                tracing::debug!("Reply pending, ignoring submit");
                return SubmitOutcome::IgnoredBusy;
            }
            let message = Message::user(text);
            let sender = message.sender();
            state.messages.push(message);
            state.awaiting_reply = true;
            let index = state.messages.len() - 1;
            self.publish(SessionEvent::MessageAppended { index, sender });
            self.publish(SessionEvent::AwaitingReplyChanged { awaiting: true });
        }
        let mut pending = PendingReply::new(self);

        tracing::info!(chars = text.chars().count(), "Sending message");
        let content = match self.backend.send(text).await {
            Reply::Delivered(raw) => self.parser.parse(raw),
            Reply::Failed(kind) => {
                tracing::warn!(kind = %kind, "Exchange failed");
                StructuredContent::paragraph(kind.advisory())
            }
        };
        let spoken = content.plain_text();

        pending.complete(content);
        self.speak(&spoken);
        SubmitOutcome::Completed
    }

    // -- Private helpers --

    /// Append the bot turn answering the pending user turn and leave `Sending`.
    fn append_reply(&self, content: StructuredContent) {
        let mut state = self.lock_state();
        let message = Message::bot(content);
        let sender = message.sender();
        state.messages.push(message);
        state.awaiting_reply = false;
        let index = state.messages.len() - 1;
        self.publish(SessionEvent::MessageAppended { index, sender });
        self.publish(SessionEvent::AwaitingReplyChanged { awaiting: false });
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn publish(&self, event: SessionEvent) {
        tracing::trace!(event = event.event_name(), "Session event");
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn speak(&self, text: &str) {
        let Some(synthesizer) = &self.synthesizer else {
            return;
        };
        let language = self.language();
        if let Err(e) = synthesizer.speak(text, &language) {
            tracing::debug!(error = %e, "Speech playback failed");
        }
    }
}

/// Open exchange of one `submit` call.
///
/// Closes the turn with the cancellation advisory if dropped before
/// [`complete`](Self::complete), so an abandoned future cannot leave the
/// session stuck in `Sending`.
struct PendingReply<'a> {
    conversation: &'a Conversation,
    open: bool,
}

impl<'a> PendingReply<'a> {
    fn new(conversation: &'a Conversation) -> Self {
        Self {
            conversation,
            open: true,
        }
    }

    fn complete(&mut self, content: StructuredContent) {
        self.open = false;
        self.conversation.append_reply(content);
    }
}

impl Drop for PendingReply<'_> {
    fn drop(&mut self) {
        if self.open {
            tracing::warn!("Exchange abandoned before the reply arrived");
            self.conversation
                .append_reply(StructuredContent::paragraph(advisory::CANCELLED));
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
