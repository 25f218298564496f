//! Palaver voice crate - input capture and speech output.
//!
//! The [`InputChannel`] merges typed text and speech transcripts into a
//! single outgoing draft, tracking capture through a two-state machine:
//! Idle -> Capturing -> Idle. Platform speech engines plug in behind the
//! [`SpeechCapture`] and [`SpeechSynthesizer`] traits.

pub mod channel;
pub mod engine;
pub mod error;
pub mod state;
pub mod synth;

pub use channel::{CaptureSession, InputChannel};
pub use engine::{
    CaptureEvent, CaptureEventSender, MockSpeechCapture, SpeechCapture, UnsupportedCapture,
};
pub use error::VoiceError;
pub use state::CaptureState;
pub use synth::{CommandSynthesizer, NullSynthesizer, SpeechSynthesizer};
