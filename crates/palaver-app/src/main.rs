//! Palaver application binary - composition root.
//!
//! Ties the Palaver crates into a single terminal client:
//! 1. Parse CLI flags and load configuration from TOML
//! 2. Set up tracing (stderr, so it never mixes with the transcript)
//! 3. Build the HTTP transport and check the backend is reachable
//! 4. Wire the conversation, speech input and speech output
//! 5. Run the REPL until the user quits

mod cli;
mod repl;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use palaver_chat::Conversation;
use palaver_core::config::PalaverConfig;
use palaver_transport::TransportClient;
use palaver_voice::{
    CommandSynthesizer, InputChannel, NullSynthesizer, SpeechCapture, SpeechSynthesizer,
    UnsupportedCapture,
};

use cli::CliArgs;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let config = PalaverConfig::load_or_default(&config_file);

    // Tracing. RUST_LOG beats every other source.
    let level = args.resolve_log_level(&config.general.log_level);
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level)),
        )
        .init();

    tracing::info!("Starting Palaver v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    // Transport.
    let mut backend_config = config.backend.clone();
    backend_config.endpoint = args.resolve_endpoint(&backend_config.endpoint);
    let client = TransportClient::new(&backend_config)?;
    tracing::info!(
        endpoint = client.endpoint(),
        timeout_secs = client.timeout().as_secs(),
        "Transport ready"
    );
    if client.health().await {
        tracing::info!("Backend is reachable");
    } else {
        tracing::warn!("Backend did not answer the health check, messages may fail");
    }

    // Speech output.
    let language = args.resolve_language(&config.voice.language);
    let synthesizer: Arc<dyn SpeechSynthesizer> = if args.resolve_speak(config.voice.speak_replies)
    {
        tracing::info!(program = %config.voice.tts_program, "Speaking replies");
        Arc::new(CommandSynthesizer::new(config.voice.tts_program.clone()))
    } else {
        Arc::new(NullSynthesizer)
    };

    // Conversation.
    let conversation = Arc::new(
        Conversation::new(Arc::new(client), config.session.greeting.clone())
            .with_synthesizer(synthesizer)
            .with_language(language.clone()),
    );

    // Speech input. No platform recognizer is linked into this binary, so
    // the channel runs text-only either way.
    let engine: Arc<dyn SpeechCapture> = Arc::new(UnsupportedCapture);
    let input = InputChannel::with_capture(engine, language, config.voice.capture_enabled);

    repl::run(conversation, input).await?;

    tracing::info!("Palaver shut down");
    Ok(())
}
