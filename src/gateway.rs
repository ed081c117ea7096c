//! Single-shot AI query gateway.
//!
//! Each call validates the query, opens a history-less chat session with the fixed generation
//! parameters, waits for exactly one reply (bounded by the configured timeout) and formats it.
//! Failures are logged where they are detected and surfaced as one `GatewayError` kind; nothing is
//! retried and no partial result is ever returned.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tracing::{debug, error, info, instrument, warn};

use crate::config::GatewayConfig;
use crate::constants::{EMPTY_RESPONSE_SENTINEL, GENERATION_CONFIG};
use crate::error::{BackendError, ConfigError, GatewayError};
use crate::formatter::format_response;
use crate::gemini::{ChatSession, GeminiClient, GenerationConfig, GenerativeBackend};

static GLOBAL_GATEWAY: OnceLock<AiGateway> = OnceLock::new();

#[derive(Clone)]
pub struct AiGateway {
    backend: Arc<dyn GenerativeBackend>,
    generation_config: GenerationConfig,
    request_timeout: Duration,
}

impl AiGateway {
    pub fn new(backend: Arc<dyn GenerativeBackend>, request_timeout: Duration) -> Self {
        Self {
            backend,
            generation_config: GENERATION_CONFIG.clone(),
            request_timeout,
        }
    }

    /// Gateway talking to Gemini with the given configuration.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, ConfigError> {
        let client = GeminiClient::new(config)?;
        Ok(Self::new(Arc::new(client), config.request_timeout))
    }

    #[instrument(skip(self, query), fields(query_len = query.len()))]
    pub async fn get_ai_response(&self, query: &str) -> Result<String, GatewayError> {
        if query.trim().is_empty() {
            warn!("Rejected AI request: input message is required");
            return Err(GatewayError::InvalidInput);
        }

        let session = ChatSession::new(self.generation_config.clone());
        debug!(timeout = ?self.request_timeout, "Sending query to AI service");

        let reply =
            match tokio::time::timeout(self.request_timeout, self.backend.send_message(&session, query))
                .await
            {
                Ok(Ok(reply)) => reply,
                Ok(Err(err)) => return Err(map_backend_error(err)),
                Err(_) => {
                    error!(after = ?self.request_timeout, "AI service did not respond in time");
                    return Err(GatewayError::Timeout {
                        after: self.request_timeout,
                    });
                }
            };

        let raw = match reply {
            Some(text) if !text.trim().is_empty() => text,
            _ => {
                info!("AI service returned an empty payload");
                EMPTY_RESPONSE_SENTINEL.to_string()
            }
        };

        Ok(format_response(&raw))
    }
}

fn map_backend_error(err: BackendError) -> GatewayError {
    match err {
        BackendError::Transport(detail) => {
            error!(%detail, "Error with AI service request");
            GatewayError::ServiceRequest {
                status: None,
                detail,
            }
        }
        BackendError::Status { status, message } => {
            error!(status, %message, "Error with AI service request");
            GatewayError::ServiceRequest {
                status: Some(status),
                detail: message,
            }
        }
        BackendError::Generation(detail) => {
            error!(%detail, "Error while generating AI response");
            GatewayError::Generation { detail }
        }
        BackendError::Other(err) => {
            error!(error = ?err, "Unexpected error from AI service");
            GatewayError::Unknown {
                detail: format!("{:#}", err),
            }
        }
    }
}

/// Build the process-wide gateway. Calling it again returns the gateway created first.
pub fn init(config: &GatewayConfig) -> Result<&'static AiGateway, ConfigError> {
    if let Some(gateway) = GLOBAL_GATEWAY.get() {
        return Ok(gateway);
    }
    let gateway = AiGateway::from_config(config)?;
    info!(model = %config.model, "AI gateway initialized");
    Ok(GLOBAL_GATEWAY.get_or_init(|| gateway))
}

/// Install an already-built gateway as the process-wide one.
pub fn install(gateway: AiGateway) -> &'static AiGateway {
    GLOBAL_GATEWAY.get_or_init(|| gateway)
}

pub fn global() -> Result<&'static AiGateway, ConfigError> {
    GLOBAL_GATEWAY.get().ok_or(ConfigError::Uninitialized)
}

/// Ask the process-wide gateway. Fails with a configuration error if `init` was never called.
pub async fn get_ai_response(query: &str) -> Result<String, GatewayError> {
    global()?.get_ai_response(query).await
}
