//! CLI argument definitions for the Palaver application.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

/// Palaver - a terminal chat client for a remote assistant, with optional voice.
#[derive(Parser, Debug)]
#[command(name = "palaver", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Chat endpoint URL (e.g. http://127.0.0.1:5000/chat).
    #[arg(short = 'e', long = "endpoint")]
    pub endpoint: Option<String>,

    /// BCP-47 language tag for speech capture and playback.
    #[arg(short = 'L', long = "language")]
    pub language: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Read bot replies aloud.
    #[arg(long = "speak")]
    pub speak: bool,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > PALAVER_CONFIG env var > platform default
    /// (~/.palaver/config.toml).
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("PALAVER_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the chat endpoint.
    ///
    /// Priority: --endpoint flag > PALAVER_ENDPOINT env var > config file value.
    pub fn resolve_endpoint(&self, config_endpoint: &str) -> String {
        pick(
            self.endpoint.as_deref(),
            std::env::var("PALAVER_ENDPOINT").ok(),
            config_endpoint,
        )
    }

    /// Resolve the session language.
    ///
    /// Priority: --language flag > config file value.
    pub fn resolve_language(&self, config_language: &str) -> String {
        pick(self.language.as_deref(), None, config_language)
    }

    /// Resolve the log filter directive.
    ///
    /// Priority: --log-level flag > config file value > "info". RUST_LOG,
    /// when set, overrides all of these at subscriber setup.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        let level = pick(self.log_level.as_deref(), None, config_level);
        if level.trim().is_empty() {
            "info".to_string()
        } else {
            level
        }
    }

    /// Whether replies should be spoken: --speak flag or config.
    pub fn resolve_speak(&self, config_speak: bool) -> bool {
        self.speak || config_speak
    }
}

/// First non-blank value of flag, env, config.
fn pick(flag: Option<&str>, env: Option<String>, config: &str) -> String {
    if let Some(v) = flag.filter(|v| !v.trim().is_empty()) {
        return v.to_string();
    }
    if let Some(v) = env.filter(|v| !v.trim().is_empty()) {
        return v;
    }
    config.to_string()
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".palaver").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".palaver").join("config.toml");
    }
    PathBuf::from("config.toml")
}
