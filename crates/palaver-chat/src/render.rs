//! Terminal rendering of the conversation log.

use palaver_core::{ContentBlock, Message, MessageBody, StructuredContent};

use crate::conversation::SessionSnapshot;

/// Shown after the last turn while a reply is pending.
pub const TYPING_INDICATOR: &str = "bot is typing...";

/// Lines for one piece of structured content.
pub fn render_content(content: &StructuredContent) -> Vec<String> {
    let mut lines = Vec::new();
    for block in content.blocks() {
        match block {
            ContentBlock::Header { content } => lines.push(format!("# {}", content)),
            ContentBlock::Section { title, items } => {
                lines.push(format!("## {}", title));
                for item in items {
                    if item.description.is_empty() {
                        lines.push(format!("  • {}", item.scheme));
                    } else {
                        lines.push(format!("  • {}: {}", item.scheme, item.description));
                    }
                }
            }
            ContentBlock::Paragraph { content } => lines.push(content.clone()),
        }
    }
    lines
}

/// One turn, prefixed with its author and timestamp.
///
/// Single-line turns stay on the prefix line; longer bot replies continue
/// below it, indented.
pub fn render_message(message: &Message) -> String {
    match &message.body {
        MessageBody::User { text } => format!("[{}] you: {}", message.timestamp, text),
        MessageBody::Bot { content } => {
            let lines = render_content(content);
            match lines.as_slice() {
                [] => format!("[{}] bot:", message.timestamp),
                [only] => format!("[{}] bot: {}", message.timestamp, only),
                _ => {
                    let mut out = format!("[{}] bot:", message.timestamp);
                    for line in &lines {
                        out.push_str("\n    ");
                        out.push_str(line);
                    }
                    out
                }
            }
        }
    }
}

/// The whole log, one turn per entry, ending with the typing indicator
/// while a reply is pending.
pub fn render_transcript(snapshot: &SessionSnapshot) -> String {
    let mut parts: Vec<String> = snapshot.messages.iter().map(render_message).collect();
    if snapshot.awaiting_reply {
        parts.push(TYPING_INDICATOR.to_string());
    }
    parts.join("\n")
}
