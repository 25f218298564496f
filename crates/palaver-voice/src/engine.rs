//! Speech-to-text capability.
//!
//! A platform engine is started with a language tag and a sender for its
//! notifications. It keeps listening across pauses until told to stop, or
//! until it decides on its own that capture is over (silence, device loss),
//! in which case it sends [`CaptureEvent::Ended`].

use std::sync::Mutex;

use tokio::sync::mpsc;

use crate::error::VoiceError;

/// Notification from a running capture engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    /// A recognized speech segment, in order of recognition.
    Transcript(String),
    /// The engine stopped capturing without being asked to.
    Ended,
}

pub type CaptureEventSender = mpsc::UnboundedSender<CaptureEvent>;

/// Platform speech-to-text engine.
pub trait SpeechCapture: Send + Sync {
    /// Whether the running platform can capture speech at all.
    fn is_available(&self) -> bool;

    /// Begin continuous listening in `language` (a BCP-47 tag).
    fn start(&self, language: &str, events: CaptureEventSender) -> Result<(), VoiceError>;

    /// Stop listening. Segments recognized so far have already been sent.
    fn stop(&self) -> Result<(), VoiceError>;
}

// =============================================================================
// Unsupported platform
// =============================================================================

/// Stand-in for platforms without a speech engine.
///
/// Reports itself unavailable so the input channel runs text-only.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedCapture;

impl SpeechCapture for UnsupportedCapture {
    fn is_available(&self) -> bool {
        false
    }

    fn start(&self, _language: &str, _events: CaptureEventSender) -> Result<(), VoiceError> {
        Err(VoiceError::UnsupportedCaptureEngine)
    }

    fn stop(&self) -> Result<(), VoiceError> {
        Err(VoiceError::UnsupportedCaptureEngine)
    }
}

// =============================================================================
// Mock implementation
// =============================================================================

/// Scripted capture engine for tests and development.
///
/// On `start` it emits the configured segments in order, then `Ended` if
/// `auto_end` is set. More segments can be pushed with [`emit`](Self::emit)
/// while capture is running.
#[derive(Debug, Default)]
pub struct MockSpeechCapture {
    segments: Vec<String>,
    auto_end: bool,
    sender: Mutex<Option<CaptureEventSender>>,
    languages: Mutex<Vec<String>>,
}

impl MockSpeechCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine that recognizes `segments` as soon as capture starts.
    pub fn with_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Have the engine end capture by itself after the scripted segments.
    pub fn auto_end(mut self) -> Self {
        self.auto_end = true;
        self
    }

    /// Push one more recognized segment into the running capture.
    ///
    /// Returns `false` when no capture is running.
    pub fn emit(&self, segment: &str) -> bool {
        self.send(CaptureEvent::Transcript(segment.to_string()))
    }

    /// Simulate the engine ending capture on its own.
    pub fn end(&self) -> bool {
        let sent = self.send(CaptureEvent::Ended);
        if let Ok(mut guard) = self.sender.lock() {
            *guard = None;
        }
        sent
    }

    /// Language tags passed to each `start`, oldest first.
    pub fn started_languages(&self) -> Vec<String> {
        self.languages
            .lock()
            .map(|l| l.clone())
            .unwrap_or_default()
    }

    fn send(&self, event: CaptureEvent) -> bool {
        match self.sender.lock() {
            Ok(guard) => guard
                .as_ref()
                .map(|tx| tx.send(event).is_ok())
                .unwrap_or(false),
            Err(_) => false,
        }
    }
}

impl SpeechCapture for MockSpeechCapture {
    fn is_available(&self) -> bool {
        true
    }

    fn start(&self, language: &str, events: CaptureEventSender) -> Result<(), VoiceError> {
        let mut sender = self
            .sender
            .lock()
            .map_err(|e| VoiceError::Engine(format!("mock sender poisoned: {}", e)))?;
        if let Ok(mut languages) = self.languages.lock() {
            languages.push(language.to_string());
        }

        for segment in &self.segments {
            let _ = events.send(CaptureEvent::Transcript(segment.clone()));
        }
        if self.auto_end {
            let _ = events.send(CaptureEvent::Ended);
            *sender = None;
        } else {
            *sender = Some(events);
        }
        Ok(())
    }

    fn stop(&self) -> Result<(), VoiceError> {
        let mut sender = self
            .sender
            .lock()
            .map_err(|e| VoiceError::Engine(format!("mock sender poisoned: {}", e)))?;
        *sender = None;
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
