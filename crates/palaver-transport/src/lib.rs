//! Palaver transport crate - one HTTP exchange per outgoing message.
//!
//! Every call to [`ChatBackend::send`] resolves to a [`Reply`]; timeouts,
//! HTTP failures and transport faults are classified into a
//! [`TransportErrorKind`] instead of being raised.

pub mod client;
pub mod reply;

use async_trait::async_trait;

pub use client::TransportClient;
pub use reply::{Reply, TransportErrorKind};

/// A remote responder the conversation can send messages to.
///
/// Implementations must never fail: every outcome, including local input
/// rejection, is expressed as a [`Reply`].
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send one message and wait for the backend's answer.
    async fn send(&self, message: &str) -> Reply;
}
