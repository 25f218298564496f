//! Line-oriented terminal front end.
//!
//! Reads commands from stdin, feeds speech notifications into the input
//! channel, and re-renders whenever the conversation publishes an event.
//! Everything runs on one task; submits are spawned so typing continues
//! while a reply is pending.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

use palaver_chat::{render_message, render_transcript, Conversation, TYPING_INDICATOR};
use palaver_core::SessionEvent;
use palaver_voice::{CaptureState, InputChannel};

/// One parsed line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Plain text: becomes the draft and is sent.
    Say(String),
    /// Empty line: send whatever the draft holds.
    SendDraft,
    /// `/voice`: start or stop speech capture.
    ToggleVoice,
    /// `/lang <tag>`
    Language(String),
    /// `/history`
    History,
    /// `/quit` or `/exit`
    Quit,
    /// `/help`
    Help,
    Unknown(String),
}

pub fn parse_command(line: &str) -> Command {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Command::SendDraft;
    }
    if !trimmed.starts_with('/') {
        return Command::Say(line.trim_end_matches(['\r', '\n']).to_string());
    }

    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or_default();
    let arg = parts.next().map(str::trim).unwrap_or_default();
    match name {
        "/voice" => Command::ToggleVoice,
        "/lang" if !arg.is_empty() => Command::Language(arg.to_string()),
        "/history" => Command::History,
        "/quit" | "/exit" => Command::Quit,
        "/help" => Command::Help,
        _ => Command::Unknown(trimmed.to_string()),
    }
}

const HELP: &str = "\
Type a message and press Enter to send it.
  (empty line)   send the current draft
  /voice         start or stop speech capture
  /lang <tag>    set the language, e.g. /lang te-IN
  /history       show the whole conversation
  /quit          leave";

/// Drive the session until stdin closes or the user quits.
pub async fn run(
    conversation: Arc<Conversation>,
    mut input: InputChannel,
) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut session_events = conversation.subscribe();

    println!("{}", render_transcript(&conversation.snapshot()));
    if !input.is_voice_enabled() {
        println!("(voice input unavailable, typing only)");
    }

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    tracing::debug!("stdin closed");
                    break;
                };
                match parse_command(&line) {
                    Command::Say(text) => {
                        input.set_draft_from_typing(text);
                        send_draft(&conversation, &mut input);
                    }
                    Command::SendDraft => send_draft(&conversation, &mut input),
                    Command::ToggleVoice => toggle_voice(&conversation, &mut input),
                    Command::Language(tag) => {
                        input.set_language(tag.as_str());
                        conversation.set_language(tag.as_str());
                        tracing::info!(language = %tag, "Language changed");
                        println!("(language set to {})", tag);
                    }
                    Command::History => println!("{}", render_transcript(&conversation.snapshot())),
                    Command::Help => println!("{}", HELP),
                    Command::Quit => break,
                    Command::Unknown(cmd) => println!("(unknown command {}, try /help)", cmd),
                }
            }
            Some(event) = input.next_event() => {
                match input.handle_event(event) {
                    Some(transcript) => send_transcript(&conversation, &mut input, transcript),
                    None if input.capture_state() == CaptureState::Capturing => {
                        println!("(heard) {}", input.current_draft());
                    }
                    None => {}
                }
            }
            event = session_events.recv() => match event {
                Ok(SessionEvent::MessageAppended { index, .. }) => {
                    if let Some(message) = conversation.snapshot().messages.get(index) {
                        println!("{}", render_message(message));
                    }
                }
                Ok(SessionEvent::AwaitingReplyChanged { awaiting: true }) => {
                    println!("{}", TYPING_INDICATOR);
                }
                Ok(SessionEvent::AwaitingReplyChanged { awaiting: false }) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Renderer fell behind, redrawing");
                    println!("{}", render_transcript(&conversation.snapshot()));
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    if input.capture_state() == CaptureState::Capturing {
        input.stop_capture();
    }
    Ok(())
}

/// Send the draft unless a reply is still pending, in which case the draft
/// stays queued for the next send.
fn send_draft(conversation: &Arc<Conversation>, input: &mut InputChannel) {
    if input.current_draft().trim().is_empty() {
        return;
    }
    if conversation.is_awaiting_reply() {
        println!("(waiting for the reply, press Enter to send your draft afterwards)");
        return;
    }
    let text = input.take_draft();
    let conversation = Arc::clone(conversation);
    tokio::spawn(async move {
        conversation.submit(&text).await;
    });
}

fn send_transcript(conversation: &Arc<Conversation>, input: &mut InputChannel, transcript: String) {
    input.set_draft_from_typing(transcript);
    send_draft(conversation, input);
}

fn toggle_voice(conversation: &Arc<Conversation>, input: &mut InputChannel) {
    match input.capture_state() {
        CaptureState::Idle => match input.start_capture() {
            Ok(()) => println!("(listening in {}, /voice again to stop)", input.language()),
            Err(e) => println!("(cannot start voice input: {})", e),
        },
        CaptureState::Capturing => match input.stop_capture() {
            Some(transcript) => send_transcript(conversation, input, transcript),
            None => println!("(nothing heard)"),
        },
    }
}
