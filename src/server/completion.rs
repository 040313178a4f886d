// ABOUTME: OpenAI-compatible chat-completions client used behind the relay server.
// ABOUTME: Sends the instructions as a system message plus the user's message; returns the first choice.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ServerConfig;
use crate::responder::{RemoteResponder, ResponderError};

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Single-turn client for `POST {base_url}/chat/completions`.
pub struct CompletionClient {
    client: reqwest::Client,
    chat_url: String,
    model: String,
    api_key: String,
    instructions: String,
}

impl CompletionClient {
    pub fn new(
        base_url: &str,
        model: impl Into<String>,
        api_key: impl Into<String>,
        instructions: impl Into<String>,
    ) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            client: reqwest::Client::new(),
            chat_url: format!("{base}/chat/completions"),
            model: model.into(),
            api_key: api_key.into(),
            instructions: instructions.into(),
        }
    }

    /// Build a client from server config, reading the key from the
    /// configured environment variable. A missing key is a startup error.
    pub fn from_config(config: &ServerConfig, instructions: impl Into<String>) -> anyhow::Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                anyhow::anyhow!("{} environment variable not set", config.api_key_env)
            })?;
        Ok(Self::new(&config.base_url, &config.model, api_key, instructions))
    }

    pub fn chat_url(&self) -> &str {
        &self.chat_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request_body<'a>(&'a self, message: &'a str) -> CompletionRequest<'a> {
        let mut messages = Vec::with_capacity(2);
        if !self.instructions.is_empty() {
            messages.push(WireMessage {
                role: "system",
                content: &self.instructions,
            });
        }
        messages.push(WireMessage {
            role: "user",
            content: message,
        });
        CompletionRequest {
            model: &self.model,
            messages,
        }
    }
}

#[async_trait]
impl RemoteResponder for CompletionClient {
    async fn respond(&self, message: &str) -> Result<String, ResponderError> {
        debug!(model = %self.model, "requesting completion");

        let resp = self
            .client
            .post(&self.chat_url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(message))
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(ResponderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        extract_reply(&body)
    }

    fn describe(&self) -> String {
        format!("{} ({})", self.model, self.chat_url)
    }
}

/// Pull the first choice's text out of a completions response body.
fn extract_reply(body: &str) -> Result<String, ResponderError> {
    let parsed: CompletionResponse =
        serde_json::from_str(body).map_err(|e| ResponderError::Malformed(e.to_string()))?;
    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ResponderError::Malformed("completion has no choices".to_string()))?;
    Ok(choice.message.content.unwrap_or_default())
}
