//! Error types for speech input and output.

use crate::state::CaptureState;

/// Errors from the input channel and the speech capability adapters.
#[derive(Debug, thiserror::Error)]
pub enum VoiceError {
    #[error("speech capture is not supported on this platform")]
    UnsupportedCaptureEngine,
    #[error("speech capture is disabled in configuration")]
    CaptureDisabled,
    #[error("speech capture is already active")]
    AlreadyCapturing,
    #[error("invalid capture transition: {from} -> {to}")]
    InvalidTransition {
        from: CaptureState,
        to: CaptureState,
    },
    #[error("capture engine error: {0}")]
    Engine(String),
    #[error("speech synthesis error: {0}")]
    Synthesis(String),
}
