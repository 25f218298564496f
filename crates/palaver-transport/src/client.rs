//! HTTP implementation of [`ChatBackend`].
//!
//! Wire protocol: `POST <endpoint>` with body `{"message": "..."}`; the
//! backend answers `{"reply": <blocks | string>}`.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;
use serde_json::Value;

use palaver_core::advisory;
use palaver_core::config::BackendConfig;
use palaver_core::error::{PalaverError, Result};
use palaver_core::RawReplyPayload;

use crate::reply::{Reply, TransportErrorKind};
use crate::ChatBackend;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

/// Sends chat messages to a remote endpoint over HTTP.
///
/// The request timeout covers the whole exchange, body included. No
/// retries: a failed attempt is reported once and the caller decides.
#[derive(Debug, Clone)]
pub struct TransportClient {
    client: Client,
    endpoint: Url,
    timeout: Duration,
}

impl TransportClient {
    /// Build a client from the `[backend]` config section.
    pub fn new(config: &BackendConfig) -> Result<Self> {
        Self::with_endpoint(&config.endpoint, config.timeout())
    }

    pub fn with_endpoint(endpoint: &str, timeout: Duration) -> Result<Self> {
        let endpoint = Url::parse(endpoint).map_err(|e| {
            PalaverError::Config(format!("invalid backend endpoint {}: {}", endpoint, e))
        })?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PalaverError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint,
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Check the backend's root (`GET /` on the endpoint's origin).
    ///
    /// Returns `true` on any 2xx answer within the timeout.
    pub async fn health(&self) -> bool {
        let mut root = self.endpoint.clone();
        root.set_path("/");
        root.set_query(None);

        match self.client.get(root.clone()).send().await {
            Ok(response) => {
                let healthy = response.status().is_success();
                tracing::debug!(url = %root, status = %response.status(), "Backend health check");
                healthy
            }
            Err(e) => {
                tracing::debug!(url = %root, error = %e, "Backend health check failed");
                false
            }
        }
    }

    async fn exchange(&self, message: &str) -> Reply {
        let started = Instant::now();

        let response = match self
            .client
            .post(self.endpoint.clone())
            .json(&ChatRequest { message })
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                let kind = classify_request_error(&e);
                tracing::warn!(kind = %kind, error = %e, "Chat request failed");
                return Reply::Failed(kind);
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = %status, "Backend returned error status");
            return Reply::Failed(TransportErrorKind::HttpError);
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                let kind = classify_request_error(&e);
                tracing::warn!(kind = %kind, error = %e, "Failed to read chat response");
                return Reply::Failed(kind);
            }
        };

        let reply = reply_from_body(&body);
        tracing::debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            ok = reply.is_ok(),
            "Chat exchange complete"
        );
        reply
    }
}

#[async_trait]
impl ChatBackend for TransportClient {
    async fn send(&self, message: &str) -> Reply {
        if message.trim().is_empty() {
            tracing::debug!("Empty message rejected locally");
            return Reply::text(advisory::EMPTY_INPUT);
        }
        self.exchange(message).await
    }
}

fn classify_request_error(e: &reqwest::Error) -> TransportErrorKind {
    if e.is_timeout() {
        TransportErrorKind::Timeout
    } else {
        TransportErrorKind::NetworkError
    }
}

/// Interpret a 2xx response body.
///
/// Non-JSON is a transport fault. JSON without a usable `reply` (absent,
/// null, blank string, or not an object at all) becomes the no-reply
/// advisory.
fn reply_from_body(body: &str) -> Reply {
    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "Chat response is not valid JSON");
            return Reply::Failed(TransportErrorKind::NetworkError);
        }
    };

    let reply = match value {
        Value::Object(mut map) => map.remove("reply").unwrap_or(Value::Null),
        _ => Value::Null,
    };

    match RawReplyPayload::from_value(reply) {
        RawReplyPayload::Missing => {
            tracing::warn!("Chat response carried no reply");
            Reply::text(advisory::NO_REPLY)
        }
        RawReplyPayload::Scalar(text) if text.trim().is_empty() => {
            tracing::warn!("Chat response carried a blank reply");
            Reply::text(advisory::NO_REPLY)
        }
        payload => Reply::Delivered(payload),
    }
}
