use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    serve, Json, Router,
};
use minijinja::{path_loader, Environment};
use minijinja_autoreload::AutoReloader;
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::constants::{PAGE_TITLE, PROMPT_SHORTCUTS};
use crate::error::GatewayError;
use crate::gateway::AiGateway;

const TEMPLATE_DIR: &str = "templates";
const STATIC_DIR: &str = "static";

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    // Missing and empty are both rejected by the gateway.
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorReply {
    pub error: String,
}

// Shared application state
#[derive(Clone)]
struct AppState {
    templates: Arc<AutoReloader>,
    gateway: AiGateway,
}

// Minijinja Environment setup
fn create_minijinja_env() -> AutoReloader {
    AutoReloader::new(|notifier| {
        let mut env = Environment::new();
        env.set_loader(path_loader(TEMPLATE_DIR));
        notifier.watch_path(TEMPLATE_DIR, true);
        Ok(env)
    })
}

async fn index_handler(State(state): State<AppState>) -> Result<Html<String>, (StatusCode, Html<String>)> {
    state
        .templates
        .acquire_env()
        .and_then(|env| {
            env.get_template("index.html").and_then(|tmpl| {
                tmpl.render(minijinja::context! {
                    title => PAGE_TITLE,
                    prompts => PROMPT_SHORTCUTS,
                })
            })
        })
        .map(Html)
        .map_err(|e| {
            error!("Failed to get or render template: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(format!("Internal Server Error: {}", e)),
            )
        })
}

async fn chat_handler(State(state): State<AppState>, body: Bytes) -> Result<Json<ChatReply>, ApiError> {
    // An absent body counts as an absent query.
    let query = if body.iter().all(u8::is_ascii_whitespace) {
        String::new()
    } else {
        let Json(request) = Json::<ChatRequest>::from_bytes(&body)?;
        request.query.unwrap_or_default()
    };
    let response = state.gateway.get_ai_response(&query).await?;
    Ok(Json(ChatReply { response }))
}

/// HTTP face of a failed chat request. The body only ever carries the caller-visible message.
pub enum ApiError {
    Gateway(GatewayError),
    BadBody(JsonRejection),
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        Self::Gateway(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadBody(rejection)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Gateway(err) => {
                let status = match &err {
                    GatewayError::InvalidInput => StatusCode::BAD_REQUEST,
                    GatewayError::Generation { .. } | GatewayError::ServiceRequest { .. } => {
                        StatusCode::BAD_GATEWAY
                    }
                    GatewayError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
                    GatewayError::Unknown { .. } | GatewayError::Config(_) => {
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                if status.is_server_error() {
                    warn!(%status, error = ?err, "Chat request failed");
                }
                (status, err.to_string())
            }
            ApiError::BadBody(rejection) => {
                warn!(detail = %rejection.body_text(), "Rejected chat request body");
                match rejection {
                    JsonRejection::JsonDataError(_) => (
                        StatusCode::UNPROCESSABLE_ENTITY,
                        "Request body must be {\"query\": string}".to_string(),
                    ),
                    _ => (
                        StatusCode::BAD_REQUEST,
                        "Request body is not valid JSON".to_string(),
                    ),
                }
            }
        };
        (status, Json(ErrorReply { error: message })).into_response()
    }
}

/// Routes of the chat UI, backed by the given gateway.
pub fn build_router(gateway: AiGateway) -> Router {
    let state = AppState {
        templates: Arc::new(create_minijinja_env()),
        gateway,
    };

    Router::new()
        .route("/", get(index_handler))
        .route("/api/chat", post(chat_handler))
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .with_state(state)
        .layer(TraceLayer::new_for_http()) // Add request logging
}

pub async fn start_web_server(addr: SocketAddr, gateway: AiGateway) -> Result<()> {
    let app = build_router(gateway);
    info!("Web server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context(format!("Failed to bind to address {}", addr))?;

    serve(listener, app.into_make_service())
        .await
        .context("Web server failed")?;

    Ok(())
}
