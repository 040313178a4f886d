// ABOUTME: HTTP responder: POSTs `{message}` as JSON to the chat endpoint and reads `{response}`.
// ABOUTME: Non-2xx statuses and undecodable bodies are reported as failures.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::responder::{ChatReply, ChatRequest, RemoteResponder, ResponderError};

/// Longest slice of an error body kept in a `Status` error.
const MAX_ERROR_BODY: usize = 512;

/// Talks to a TexBot-compatible chat endpoint over HTTP.
pub struct HttpResponder {
    client: reqwest::Client,
    url: String,
}

impl HttpResponder {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RemoteResponder for HttpResponder {
    async fn respond(&self, message: &str) -> Result<String, ResponderError> {
        debug!(url = %self.url, chars = message.chars().count(), "posting chat message");

        let resp = self
            .client
            .post(&self.url)
            .json(&ChatRequest {
                message: message.to_string(),
            })
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(ResponderError::Status {
                status: status.as_u16(),
                body: truncate(&body, MAX_ERROR_BODY),
            });
        }

        parse_reply(&body)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Decode a successful response body into the reply text.
///
/// A JSON object without a usable `response` field degrades to an empty
/// reply instead of a failure.
pub fn parse_reply(body: &str) -> Result<String, ResponderError> {
    let reply: ChatReply =
        serde_json::from_str(body).map_err(|e| ResponderError::Malformed(e.to_string()))?;
    match reply.response {
        Some(text) => Ok(text),
        None => {
            warn!("chat endpoint reply has no `response` field; using empty text");
            Ok(String::new())
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let cut: String = s.chars().take(max_chars).collect();
    format!("{}...", cut)
}
