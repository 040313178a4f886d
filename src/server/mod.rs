// ABOUTME: Relay server: the HTTP backend the chat front ends talk to (`GET /`, `POST /chats`).
// ABOUTME: Forwards each message to a responder (normally the completion client) and wraps the reply.

pub mod completion;

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{info, warn};

use crate::responder::{ChatReply, ChatRequest, RemoteResponder, ResponderError};

pub use completion::CompletionClient;

/// State shared by every request handler.
#[derive(Clone)]
pub struct ServerState {
    backend: Arc<dyn RemoteResponder>,
    greeting: Arc<str>,
}

impl ServerState {
    pub fn new(backend: Arc<dyn RemoteResponder>, greeting: impl Into<String>) -> Self {
        Self {
            backend,
            greeting: Arc::from(greeting.into()),
        }
    }
}

/// A backend failure surfaced to the HTTP client.
#[derive(Debug, thiserror::Error)]
#[error("backend failed: {0}")]
pub struct ServerError(#[from] ResponderError);

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "detail": self.to_string() });
        (StatusCode::BAD_GATEWAY, Json(body)).into_response()
    }
}

/// Build the router with CORS for `allowed_origins` (`"*"` allows any).
pub fn router(state: ServerState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/chats", post(chats))
        .layer(cors_layer(allowed_origins))
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origin = if allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!(origin = %o, "ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };
    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn root(State(state): State<ServerState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": &*state.greeting }))
}

async fn chats(
    State(state): State<ServerState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatReply>, ServerError> {
    let reply = state.backend.respond(&request.message).await.map_err(|e| {
        warn!(error = %e, "chat backend failed");
        ServerError(e)
    })?;
    Ok(Json(ChatReply {
        response: Some(reply),
    }))
}

/// Serve `router` on an already-bound listener until ctrl-c.
pub async fn serve(listener: TcpListener, router: Router) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    info!(%addr, "relay server listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    info!("relay server stopped");
    Ok(())
}
