//! Canned bot-authored texts substituted for a real reply.
//!
//! Every failure in the exchange pipeline ends up as one of these, wrapped
//! in a single `Paragraph` block, so the log never lacks a bot turn.

/// Seeded greeting for a fresh session.
pub const GREETING: &str = "Hello! How can I help you today?";

/// Reply to an empty or whitespace-only message. Produced locally.
pub const EMPTY_INPUT: &str = "Please type a valid message.";

/// Backend answered with a non-success status, or the call never completed.
pub const SERVER_ERROR: &str = "Server error. Please try again.";

/// Backend did not answer within the request timeout.
pub const TIMEOUT: &str = "Server took too long to respond.";

/// Backend answered but the body carried no usable `reply`.
pub const NO_REPLY: &str = "No reply received from backend.";

/// The exchange was abandoned before the backend answered.
pub const CANCELLED: &str = "Request was cancelled. Please try again.";
