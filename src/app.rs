// ABOUTME: App orchestrator: wires config, responder, session, and front ends together.
// ABOUTME: Entry points for the interactive chat, the one-shot ask, and the relay server.

use std::io;
use std::sync::Arc;

use anyhow::Context;
use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste};
use crossterm::execute;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::Config;
use crate::prompt::InstructionsBuilder;
use crate::responder::{HttpResponder, RemoteResponder};
use crate::server::{self, CompletionClient, ServerState};
use crate::session::{Role, SendOrchestrator};
use crate::tui::ChatController;

/// Top-level application that owns the resolved configuration.
pub struct App {
    config: Config,
}

impl App {
    /// Create a new app with the given configuration.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build a session orchestrator talking to the configured endpoint.
    pub fn orchestrator(&self) -> SendOrchestrator {
        let responder: Arc<dyn RemoteResponder> =
            Arc::new(HttpResponder::new(&self.config.endpoint.url));
        SendOrchestrator::with_options(responder, self.config.endpoint.orchestrator_options())
    }

    /// Run the interactive terminal chat until the user quits.
    pub async fn run_chat(self) -> anyhow::Result<()> {
        let controller = ChatController::new(self.orchestrator());
        info!(endpoint = %self.config.endpoint.url, "starting chat session");

        let mut terminal = ratatui::init();
        let result = match execute!(io::stdout(), EnableBracketedPaste) {
            Ok(()) => {
                let result = controller.run(&mut terminal).await;
                let _ = execute!(io::stdout(), DisableBracketedPaste);
                result
            }
            Err(e) => Err(e.into()),
        };
        ratatui::restore();

        if result.is_ok() {
            println!();
            println!("  \x1b[1mThanks for chatting with TexBot!\x1b[0m");
            println!();
        }
        result
    }

    /// Submit a single message and print the resulting reply (or the error
    /// text if the exchange failed). Returns whether the exchange succeeded.
    pub async fn ask(self, message: &str) -> anyhow::Result<bool> {
        let mut orchestrator = self.orchestrator();
        let reply_id = orchestrator
            .send(message)
            .await
            .context("message not sent")?;

        let reply = orchestrator
            .transcript()
            .get(reply_id)
            .filter(|e| e.role() == Role::Assistant)
            .map(|e| e.text().to_string())
            .unwrap_or_default();
        println!("{}", reply);

        Ok(orchestrator.last_exchange_succeeded().unwrap_or(false))
    }

    /// Run the relay server until ctrl-c.
    pub async fn serve(self) -> anyhow::Result<()> {
        let server_config = &self.config.server;

        let mut builder = InstructionsBuilder::new();
        builder.load_overrides().load_local();
        let backend = CompletionClient::from_config(server_config, builder.build())?;
        info!(backend = %backend.describe(), "completion backend ready");

        let state = ServerState::new(Arc::new(backend), server_config.greeting.clone());
        let router = server::router(state, &server_config.allowed_origins);

        let listener = TcpListener::bind(&server_config.bind)
            .await
            .with_context(|| format!("binding {}", server_config.bind))?;
        server::serve(listener, router).await
    }
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::routing::post;

    use super::*;
    use crate::config::EndpointConfig;

    /// Serve a `/chats` route answering with `body` on an ephemeral port.
    async fn spawn_chat_endpoint(body: serde_json::Value) -> String {
        let router = Router::new().route(
            "/chats",
            post(move || {
                let body = body.clone();
                async move { axum::Json(body) }
            }),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/chats", addr)
    }

    fn config_for(url: String, error_text: &str) -> Config {
        Config {
            endpoint: EndpointConfig {
                url,
                error_text: error_text.to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn orchestrator_uses_configured_endpoint() {
        let config = Config {
            endpoint: EndpointConfig {
                url: "http://10.0.0.1:9999/chats".to_string(),
                error_text: "down".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let app = App::new(config);
        let orch = app.orchestrator();
        assert_eq!(orch.responder_label(), "http://10.0.0.1:9999/chats");
        assert_eq!(orch.error_text(), "down");
    }

    #[tokio::test]
    async fn ask_succeeds_when_reply_matches_error_text() {
        let url = spawn_chat_endpoint(serde_json::json!({ "response": "offline" })).await;
        let app = App::new(config_for(url, "offline"));
        assert!(app.ask("status?").await.unwrap());
    }

    #[tokio::test]
    async fn ask_succeeds_on_empty_reply_with_empty_error_text() {
        let url = spawn_chat_endpoint(serde_json::json!({ "answer": "wrong key" })).await;
        let app = App::new(config_for(url, ""));
        assert!(app.ask("What is rayon?").await.unwrap());
    }

    #[tokio::test]
    async fn ask_reports_failure_for_unreachable_endpoint() {
        let app = App::new(config_for("http://127.0.0.1:9/chats".to_string(), "down"));
        assert!(!app.ask("hello").await.unwrap());
    }

    #[tokio::test]
    async fn ask_rejects_blank_message() {
        let app = App::new(Config::default());
        let err = app.ask("   ").await.unwrap_err();
        assert!(err.to_string().contains("message not sent"));
    }
}
