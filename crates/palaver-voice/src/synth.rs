//! Text-to-speech output.
//!
//! Speaking is best-effort: a failure never blocks the conversation, so
//! callers log the error and move on.

use std::process::{Child, Command, Stdio};
use std::sync::Mutex;

use crate::error::VoiceError;

/// Platform text-to-speech capability.
pub trait SpeechSynthesizer: Send + Sync {
    /// Speak `text` in `language` (a BCP-47 tag). Does not wait for playback.
    fn speak(&self, text: &str, language: &str) -> Result<(), VoiceError>;
}

/// Synthesizer that stays silent.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSynthesizer;

impl SpeechSynthesizer for NullSynthesizer {
    fn speak(&self, _text: &str, _language: &str) -> Result<(), VoiceError> {
        Ok(())
    }
}

/// Synthesizer that shells out to an espeak-compatible program.
///
/// Runs `<program> -v <language> <text>`. Starting a new utterance cuts off
/// the one still playing.
#[derive(Debug)]
pub struct CommandSynthesizer {
    program: String,
    current: Mutex<Option<Child>>,
}

impl CommandSynthesizer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            current: Mutex::new(None),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Stop the utterance in progress, if any.
    pub fn cancel(&self) {
        let mut current = match self.current.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(mut child) = current.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

impl SpeechSynthesizer for CommandSynthesizer {
    fn speak(&self, text: &str, language: &str) -> Result<(), VoiceError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }
        self.cancel();

        let child = Command::new(&self.program)
            .arg("-v")
            .arg(language)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| VoiceError::Synthesis(format!("{}: {}", self.program, e)))?;

        tracing::debug!(program = %self.program, language, pid = child.id(), "Speaking reply");
        let mut current = match self.current.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *current = Some(child);
        Ok(())
    }
}

impl Drop for CommandSynthesizer {
    fn drop(&mut self) {
        self.cancel();
    }
}
