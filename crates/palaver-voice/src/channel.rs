//! Input channel unifying typed text and speech transcripts.
//!
//! There is exactly one draft buffer. Typing overwrites it, and so does each
//! transcript segment while capture runs; whichever wrote last before a send
//! wins. Capture itself follows [`CaptureState`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::engine::{CaptureEvent, CaptureEventSender, SpeechCapture};
use crate::error::VoiceError;
use crate::state::{CaptureState, CaptureStateMachine};

/// Bookkeeping for one start-to-stop capture.
#[derive(Debug, Clone)]
pub struct CaptureSession {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub language: String,
    /// Segments recognized so far, joined by single spaces.
    pub transcript: String,
}

impl CaptureSession {
    fn new(language: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            language: language.to_string(),
            transcript: String::new(),
        }
    }

    pub fn elapsed_secs(&self) -> f32 {
        let elapsed = Utc::now() - self.started_at;
        elapsed.num_milliseconds() as f32 / 1000.0
    }

    fn push_segment(&mut self, segment: &str) {
        let segment = segment.trim();
        if segment.is_empty() {
            return;
        }
        if !self.transcript.is_empty() {
            self.transcript.push(' ');
        }
        self.transcript.push_str(segment);
    }
}

/// Owner of the outgoing draft and of speech capture.
pub struct InputChannel {
    engine: Arc<dyn SpeechCapture>,
    voice_enabled: bool,
    capture_enabled: bool,
    state: CaptureStateMachine,
    session: Option<CaptureSession>,
    language: String,
    draft: String,
    events: CaptureEventSender,
    pending: mpsc::UnboundedReceiver<CaptureEvent>,
}

impl std::fmt::Debug for InputChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputChannel")
            .field("voice_enabled", &self.voice_enabled)
            .field("capture_enabled", &self.capture_enabled)
            .field("state", &self.state)
            .field("session", &self.session)
            .field("language", &self.language)
            .field("draft", &self.draft)
            .finish()
    }
}

impl InputChannel {
    /// Create an idle channel backed by `engine`.
    ///
    /// Engine availability is checked once here: without an engine the
    /// channel is text-only and every capture request fails with
    /// [`VoiceError::UnsupportedCaptureEngine`].
    pub fn new(engine: Arc<dyn SpeechCapture>, language: impl Into<String>) -> Self {
        Self::with_capture(engine, language, true)
    }

    /// Like [`new`](Self::new), but `capture_enabled = false` forces
    /// text-only input even when the engine is available.
    pub fn with_capture(
        engine: Arc<dyn SpeechCapture>,
        language: impl Into<String>,
        capture_enabled: bool,
    ) -> Self {
        let available = engine.is_available();
        if !capture_enabled {
            tracing::info!("Speech capture disabled, input is text-only");
        } else if !available {
            tracing::warn!("Speech capture unavailable, input is text-only");
        }
        let (events, pending) = mpsc::unbounded_channel();
        Self {
            engine,
            voice_enabled: capture_enabled && available,
            capture_enabled,
            state: CaptureStateMachine::new(),
            session: None,
            language: language.into(),
            draft: String::new(),
            events,
            pending,
        }
    }

    pub fn current_draft(&self) -> &str {
        &self.draft
    }

    pub fn capture_state(&self) -> CaptureState {
        self.state.current()
    }

    pub fn is_voice_enabled(&self) -> bool {
        self.voice_enabled
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Change the capture language. Takes effect on the next capture.
    pub fn set_language(&mut self, language: impl Into<String>) {
        self.language = language.into();
    }

    /// Returns the running capture, if any.
    pub fn current_session(&self) -> Option<&CaptureSession> {
        self.session.as_ref()
    }

    /// Overwrite the draft with typed text. Valid in any capture state.
    pub fn set_draft_from_typing(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Hand the draft over for sending, leaving it empty.
    pub fn take_draft(&mut self) -> String {
        std::mem::take(&mut self.draft)
    }

    /// Begin continuous listening in the channel's language.
    pub fn start_capture(&mut self) -> Result<(), VoiceError> {
        if !self.capture_enabled {
            return Err(VoiceError::CaptureDisabled);
        }
        if !self.voice_enabled {
            return Err(VoiceError::UnsupportedCaptureEngine);
        }
        if self.state.current() == CaptureState::Capturing {
            return Err(VoiceError::AlreadyCapturing);
        }

        // Leftovers from an earlier capture must not leak into this one.
        let mut stale = 0usize;
        while self.pending.try_recv().is_ok() {
            stale += 1;
        }
        if stale > 0 {
            tracing::debug!(stale, "Discarded capture events from a previous session");
        }

        self.engine.start(&self.language, self.events.clone())?;
        self.state.transition(CaptureState::Capturing)?;

        let session = CaptureSession::new(&self.language);
        tracing::info!(
            session_id = %session.id,
            language = %session.language,
            "Speech capture started"
        );
        self.session = Some(session);
        Ok(())
    }

    /// Stop listening and return the transcript gathered since start.
    ///
    /// A no-op returning `None` while idle. Returns `None` as well when
    /// nothing was recognized. The transcript buffer is cleared either way.
    pub fn stop_capture(&mut self) -> Option<String> {
        if self.state.current() != CaptureState::Capturing {
            tracing::debug!("Stop requested while idle, ignoring");
            return None;
        }
        if let Err(e) = self.engine.stop() {
            tracing::warn!(error = %e, "Capture engine failed to stop cleanly");
        }
        self.finish_capture()
    }

    /// Record a recognized segment. Ignored unless capturing.
    pub fn on_transcript(&mut self, segment: &str) {
        let Some(session) = self.session.as_mut() else {
            tracing::debug!("Transcript segment arrived after capture ended, dropping");
            return;
        };
        session.push_segment(segment);
        self.draft = session.transcript.clone();
    }

    /// The engine ended capture by itself; behaves like [`stop_capture`](Self::stop_capture).
    pub fn on_capture_ended(&mut self) -> Option<String> {
        if self.state.current() != CaptureState::Capturing {
            return None;
        }
        tracing::debug!("Capture ended by engine");
        self.finish_capture()
    }

    /// Wait for the next engine notification.
    ///
    /// Cancel safe, so it can sit in a `select!` arm. Feed the result to
    /// [`handle_event`](Self::handle_event).
    pub async fn next_event(&mut self) -> Option<CaptureEvent> {
        self.pending.recv().await
    }

    /// Handle every notification already queued, without waiting.
    ///
    /// Returns a finished transcript if one of them ended capture.
    pub fn drain_events(&mut self) -> Option<String> {
        let mut finished = None;
        while let Ok(event) = self.pending.try_recv() {
            if let Some(transcript) = self.handle_event(event) {
                finished = Some(transcript);
            }
        }
        finished
    }

    /// Dispatch one engine notification.
    ///
    /// Returns a finished transcript when the notification ended capture.
    pub fn handle_event(&mut self, event: CaptureEvent) -> Option<String> {
        match event {
            CaptureEvent::Transcript(segment) => {
                self.on_transcript(&segment);
                None
            }
            CaptureEvent::Ended => self.on_capture_ended(),
        }
    }

    fn finish_capture(&mut self) -> Option<String> {
        // Segments the engine sent before stopping belong to this capture.
        // They only reach the draft if typing has not replaced it since.
        if let Some(session) = self.session.as_mut() {
            let mirrored = self.draft == session.transcript;
            while let Ok(event) = self.pending.try_recv() {
                if let CaptureEvent::Transcript(segment) = event {
                    session.push_segment(&segment);
                }
            }
            if mirrored {
                self.draft = session.transcript.clone();
            }
        }

        if let Err(e) = self.state.transition(CaptureState::Idle) {
            tracing::warn!(error = %e, "Capture state out of sync");
        }
        let session = self.session.take()?;
        tracing::info!(
            session_id = %session.id,
            elapsed_secs = session.elapsed_secs(),
            transcript_len = session.transcript.len(),
            "Speech capture stopped"
        );

        if session.transcript.is_empty() {
            return None;
        }
        // The draft still mirrors the speech: clear it so the transcript is
        // not sent a second time. Typing after the last segment wins.
        if self.draft == session.transcript {
            self.draft.clear();
        }
        Some(session.transcript)
    }
}

// =============================================================================
// Tests
// =============================================================================
