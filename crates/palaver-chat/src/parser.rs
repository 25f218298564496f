//! Reply content parser.
//!
//! Turns a [`RawReplyPayload`] into [`StructuredContent`]. Parsing is total:
//! blocks that do not match a known shape are dropped one by one, and a
//! reply that cannot be read as blocks at all degrades to a single
//! paragraph.

use serde_json::Value;

use palaver_core::advisory;
use palaver_core::{ContentBlock, RawReplyPayload, StructuredContent};

/// Parser from raw backend replies to structured content.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentParser;

impl ContentParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a raw reply. Never fails.
    pub fn parse(&self, raw: RawReplyPayload) -> StructuredContent {
        match raw {
            RawReplyPayload::Blocks(values) => {
                let content = parse_blocks(values);
                if content.is_empty() {
                    tracing::debug!("Reply held no recognizable blocks");
                    StructuredContent::paragraph(advisory::NO_REPLY)
                } else {
                    content
                }
            }
            RawReplyPayload::Scalar(text) => parse_scalar(text),
            RawReplyPayload::Missing => StructuredContent::paragraph(advisory::NO_REPLY),
        }
    }
}

/// Shorthand for [`ContentParser::parse`].
pub fn parse(raw: RawReplyPayload) -> StructuredContent {
    ContentParser.parse(raw)
}

// =============================================================================
// Helpers
// =============================================================================

/// Deserialize each block on its own, skipping the ones that do not fit.
fn parse_blocks(values: Vec<Value>) -> StructuredContent {
    let total = values.len();
    let blocks: Vec<ContentBlock> = values
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<ContentBlock>(value) {
            Ok(block) => Some(block),
            Err(e) => {
                tracing::debug!(error = %e, "Dropping unrecognized content block");
                None
            }
        })
        .collect();

    if blocks.len() < total {
        tracing::debug!(kept = blocks.len(), total, "Some reply blocks were dropped");
    }
    StructuredContent::new(blocks)
}

/// A string reply is either a serialized block sequence or plain text.
///
/// Only text that looks like JSON structure gets one decode attempt; any
/// failure keeps the text verbatim as a paragraph.
fn parse_scalar(text: String) -> StructuredContent {
    let trimmed = text.trim_start();
    if !(trimmed.starts_with('[') || trimmed.starts_with('{')) {
        return StructuredContent::paragraph(text);
    }

    let decoded = match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Array(values)) => parse_blocks(values),
        Ok(obj @ Value::Object(_)) => parse_blocks(vec![obj]),
        Ok(_) => StructuredContent::default(),
        Err(e) => {
            tracing::debug!(error = %e, "String reply is not serialized content");
            StructuredContent::default()
        }
    };

    if decoded.is_empty() {
        StructuredContent::paragraph(text)
    } else {
        decoded
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use palaver_core::Item;
    use serde_json::json;

    fn blocks(value: Value) -> RawReplyPayload {
        RawReplyPayload::from_value(value)
    }

    fn three_block_reply() -> Value {
        json!([
            {"type": "header", "content": "Farmer Schemes"},
            {"type": "section", "title": "Central", "items": [
                {"scheme": "PM-KISAN", "description": "Income support of 6000 per year"}
            ]},
            {"type": "paragraph", "content": "Ask me about eligibility."}
        ])
    }

    fn expected_three_blocks() -> StructuredContent {
        StructuredContent::new(vec![
            ContentBlock::Header {
                content: "Farmer Schemes".to_string(),
            },
            ContentBlock::Section {
                title: "Central".to_string(),
                items: vec![Item {
                    scheme: "PM-KISAN".to_string(),
                    description: "Income support of 6000 per year".to_string(),
                }],
            },
            ContentBlock::Paragraph {
                content: "Ask me about eligibility.".to_string(),
            },
        ])
    }

    // ---- Block arrays ----

    #[test]
    fn test_three_blocks_preserve_fields_and_order() {
        let content = parse(blocks(three_block_reply()));
        assert_eq!(content, expected_three_blocks());
    }

    #[test]
    fn test_unknown_tag_is_dropped() {
        let content = parse(blocks(json!([
            {"type": "header", "content": "Top"},
            {"type": "foo", "content": "mystery"},
            {"type": "paragraph", "content": "Bottom"}
        ])));
        assert_eq!(content.len(), 2);
        assert_eq!(
            content.blocks()[0],
            ContentBlock::Header {
                content: "Top".to_string()
            }
        );
        assert_eq!(
            content.blocks()[1],
            ContentBlock::Paragraph {
                content: "Bottom".to_string()
            }
        );
    }

    #[test]
    fn test_block_missing_required_field_is_dropped() {
        let content = parse(blocks(json!([
            {"type": "section", "items": []},
            {"type": "paragraph"},
            {"type": "header", "content": "kept"}
        ])));
        assert_eq!(content.len(), 1);
        assert_eq!(content.plain_text(), "kept");
    }

    #[test]
    fn test_item_without_description_is_kept() {
        let content = parse(blocks(json!([
            {"type": "section", "title": "Schemes", "items": [{"scheme": "PMAY"}]}
        ])));
        match &content.blocks()[0] {
            ContentBlock::Section { items, .. } => {
                assert_eq!(items[0].scheme, "PMAY");
                assert_eq!(items[0].description, "");
            }
            other => panic!("Expected section, got {:?}", other),
        }
    }

    #[test]
    fn test_non_object_entries_are_dropped() {
        let content = parse(blocks(json!([
            42,
            "loose text",
            null,
            {"type": "paragraph", "content": "real"}
        ])));
        assert_eq!(content.len(), 1);
    }

    #[test]
    fn test_single_block_object_is_parsed() {
        let content = parse(blocks(json!({"type": "paragraph", "content": "alone"})));
        assert_eq!(content, StructuredContent::paragraph("alone"));
    }

    #[test]
    fn test_no_recognizable_blocks_yields_advisory() {
        assert_eq!(
            parse(blocks(json!([]))),
            StructuredContent::paragraph(advisory::NO_REPLY)
        );
        assert_eq!(
            parse(blocks(json!([{"type": "foo"}]))),
            StructuredContent::paragraph(advisory::NO_REPLY)
        );
    }

    // ---- Strings ----

    #[test]
    fn test_plain_string_falls_back_to_paragraph() {
        let content = parse(RawReplyPayload::scalar("just a string"));
        assert_eq!(content, StructuredContent::paragraph("just a string"));
    }

    #[test]
    fn test_serialized_block_array_is_decoded() {
        let serialized = three_block_reply().to_string();
        let content = parse(RawReplyPayload::Scalar(serialized));
        assert_eq!(content, expected_three_blocks());
    }

    #[test]
    fn test_serialized_array_with_leading_whitespace() {
        let serialized = format!("\n  {}", json!([{"type": "paragraph", "content": "hi"}]));
        assert_eq!(
            parse(RawReplyPayload::Scalar(serialized)),
            StructuredContent::paragraph("hi")
        );
    }

    #[test]
    fn test_invalid_json_string_kept_verbatim() {
        let text = "[not json at all";
        assert_eq!(
            parse(RawReplyPayload::scalar(text)),
            StructuredContent::paragraph(text)
        );
    }

    #[test]
    fn test_json_without_blocks_kept_verbatim() {
        let text = r#"{"answer": 42}"#;
        assert_eq!(
            parse(RawReplyPayload::scalar(text)),
            StructuredContent::paragraph(text)
        );
    }

    #[test]
    fn test_empty_string_is_paragraph() {
        assert_eq!(
            parse(RawReplyPayload::scalar("")),
            StructuredContent::paragraph("")
        );
    }

    #[test]
    fn test_number_reply_is_paragraph() {
        let content = parse(RawReplyPayload::from_value(json!(7)));
        assert_eq!(content, StructuredContent::paragraph("7"));
    }

    // ---- Missing ----

    #[test]
    fn test_missing_reply_yields_advisory() {
        assert_eq!(
            parse(RawReplyPayload::Missing),
            StructuredContent::paragraph(advisory::NO_REPLY)
        );
        assert_eq!(
            parse(RawReplyPayload::from_value(Value::Null)),
            StructuredContent::paragraph(advisory::NO_REPLY)
        );
    }

    #[test]
    fn test_parser_struct_matches_free_fn() {
        let parser = ContentParser::new();
        assert_eq!(
            parser.parse(RawReplyPayload::scalar("same")),
            parse(RawReplyPayload::scalar("same"))
        );
    }
}
