use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::advisory;
use crate::error::{PalaverError, Result};

/// Top-level configuration for the Palaver client.
///
/// Loaded from `~/.palaver/config.toml` by default. Every section falls back
/// to its defaults when absent, so an empty file is a valid configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PalaverConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub voice: VoiceConfig,
}

impl PalaverConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: PalaverConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| PalaverError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Remote responder settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Full URL of the chat endpoint (`POST`, JSON body `{"message": ...}`).
    pub endpoint: String,
    /// Upper bound on one exchange, in seconds.
    pub timeout_secs: u64,
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:5000/chat".to_string(),
            timeout_secs: 40,
        }
    }
}

/// Conversation session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Bot turn seeded into every new session.
    pub greeting: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            greeting: advisory::GREETING.to_string(),
        }
    }
}

/// Speech input and output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// BCP-47 language tag for capture and playback (e.g. "en-US", "te-IN").
    pub language: String,
    /// Read bot replies aloud after they are logged.
    pub speak_replies: bool,
    /// Program invoked for speech playback as `<program> -v <language> <text>`.
    pub tts_program: String,
    /// Allow speech capture when the platform provides an engine.
    pub capture_enabled: bool,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            speak_replies: false,
            tts_program: "espeak-ng".to_string(),
            capture_enabled: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = PalaverConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.backend.endpoint, "http://127.0.0.1:5000/chat");
        assert_eq!(config.backend.timeout_secs, 40);
        assert_eq!(config.backend.timeout(), Duration::from_secs(40));
        assert_eq!(config.session.greeting, "Hello! How can I help you today?");
        assert_eq!(config.voice.language, "en-US");
        assert!(!config.voice.speak_replies);
        assert_eq!(config.voice.tts_program, "espeak-ng");
        assert!(config.voice.capture_enabled);
    }

    #[test]
    fn test_load_valid_config() {
        let content = r#"
[general]
log_level = "debug"

[backend]
endpoint = "http://10.0.0.5:8080/chat"
timeout_secs = 5

[session]
greeting = "Namaskaram!"

[voice]
language = "te-IN"
speak_replies = true
tts_program = "say"
capture_enabled = false
"#;
        let file = create_temp_config(content);
        let config = PalaverConfig::load(file.path()).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.backend.endpoint, "http://10.0.0.5:8080/chat");
        assert_eq!(config.backend.timeout_secs, 5);
        assert_eq!(config.session.greeting, "Namaskaram!");
        assert_eq!(config.voice.language, "te-IN");
        assert!(config.voice.speak_replies);
        assert_eq!(config.voice.tts_program, "say");
        assert!(!config.voice.capture_enabled);
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let content = r#"
[voice]
language = "en-IN"
"#;
        let file = create_temp_config(content);
        let config = PalaverConfig::load(file.path()).unwrap();
        assert_eq!(config.voice.language, "en-IN");
        // Remaining fields use defaults
        assert!(!config.voice.speak_replies);
        assert_eq!(config.backend.timeout_secs, 40);
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn test_config_empty_toml_uses_all_defaults() {
        let file = create_temp_config("");
        let config = PalaverConfig::load(file.path()).unwrap();
        assert_eq!(config.backend.endpoint, "http://127.0.0.1:5000/chat");
        assert_eq!(config.voice.language, "en-US");
    }

    #[test]
    fn test_load_invalid_toml() {
        let file = create_temp_config("this is {{ not valid TOML");
        let result = PalaverConfig::load(file.path());
        assert!(matches!(result, Err(PalaverError::Config(_))));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = PalaverConfig::load_or_default(Path::new("/nonexistent/config.toml"));
        assert_eq!(config.backend.timeout_secs, 40);
        assert_eq!(config.session.greeting, advisory::GREETING);
    }

    #[test]
    fn test_save_creates_parent_dirs_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("dir").join("config.toml");

        let mut config = PalaverConfig::default();
        config.voice.language = "te-IN".to_string();
        config.backend.timeout_secs = 12;
        config.save(&path).unwrap();

        assert!(path.exists());
        let reloaded = PalaverConfig::load(&path).unwrap();
        assert_eq!(reloaded.voice.language, "te-IN");
        assert_eq!(reloaded.backend.timeout_secs, 12);
        assert_eq!(reloaded.backend.endpoint, config.backend.endpoint);
    }
}
