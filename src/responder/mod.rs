// ABOUTME: Remote responder abstraction: one message in, one text reply out (or a failure).
// ABOUTME: Shared wire types for the `{message}` / `{response}` chat endpoint contract.

pub mod http;
pub mod mock;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use http::HttpResponder;
pub use mock::ScriptedResponder;

/// Request body of the chat endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Response body of the chat endpoint. A missing or null `response` field
/// deserializes to `None`, which callers treat as an empty reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub response: Option<String>,
}

/// Every way a single remote exchange can fail.
#[derive(Debug, thiserror::Error)]
pub enum ResponderError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response body: {0}")]
    Malformed(String),

    #[error("no reply within {0:?}")]
    TimedOut(Duration),

    #[error("{0}")]
    Backend(String),

    #[error("responder panicked: {0}")]
    Panicked(String),
}

/// The external text-generation service, consumed as a black box.
#[async_trait]
pub trait RemoteResponder: Send + Sync {
    /// Exchange one message for one reply. Called exactly once per accepted
    /// submission; implementations must not retry.
    async fn respond(&self, message: &str) -> Result<String, ResponderError>;

    /// Short human-readable label for status displays.
    fn describe(&self) -> String;
}
