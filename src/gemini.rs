use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::header::HeaderValue;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use crate::config::GatewayConfig;
use crate::constants::API_KEY_VAR;
use crate::error::{BackendError, ConfigError};

// Structures matching Gemini's models/{model}:generateContent endpoint

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: u32,
    pub max_output_tokens: u32,
    pub response_mime_type: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(text: &str) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: Some(text.to_string()),
            }],
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content>,
    generation_config: &'a GenerationConfig,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

// Error envelope returned with non-2xx statuses
#[derive(Deserialize, Debug)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize, Debug)]
struct ErrorBody {
    message: String,
    status: Option<String>,
}

/// The request context of one exchange. History is always empty: every call is a fresh chat.
#[derive(Debug, Clone)]
pub struct ChatSession {
    generation_config: GenerationConfig,
    history: Vec<Content>,
}

impl ChatSession {
    pub fn new(generation_config: GenerationConfig) -> Self {
        Self {
            generation_config,
            history: Vec::new(),
        }
    }

    pub fn generation_config(&self) -> &GenerationConfig {
        &self.generation_config
    }

    pub fn history(&self) -> &[Content] {
        &self.history
    }
}

/// One request/response exchange with a text generation service.
///
/// `Ok(None)` means the service answered successfully but produced no text.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    async fn send_message(
        &self,
        session: &ChatSession,
        message: &str,
    ) -> Result<Option<String>, BackendError>;
}

/// Gemini REST client. Holds no per-call state; one instance serves the whole process.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    endpoint: String,
    api_key: HeaderValue,
}

impl GeminiClient {
    pub fn new(config: &GatewayConfig) -> Result<Self, ConfigError> {
        let mut api_key =
            HeaderValue::from_str(&config.api_key).map_err(|_| ConfigError::InvalidValue {
                key: API_KEY_VAR,
                reason: "contains characters not allowed in an HTTP header".to_string(),
            })?;
        api_key.set_sensitive(true);

        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: format!(
                "{}/v1beta/models/{}:generateContent",
                config.base_url.trim_end_matches('/'),
                config.model
            ),
            api_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl GenerativeBackend for GeminiClient {
    #[instrument(skip(self, session, message), fields(endpoint = %self.endpoint))]
    async fn send_message(
        &self,
        session: &ChatSession,
        message: &str,
    ) -> Result<Option<String>, BackendError> {
        let url = reqwest::Url::parse(&self.endpoint)
            .map_err(|e| anyhow!("invalid Gemini endpoint {}: {}", self.endpoint, e))?;

        let mut contents = session.history().to_vec();
        contents.push(Content::user(message));
        let request_payload = GenerateContentRequest {
            contents,
            generation_config: session.generation_config(),
        };

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", self.api_key.clone())
            .json(&request_payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            let message = match serde_json::from_str::<ErrorEnvelope>(&error_body) {
                Ok(envelope) => match envelope.error.status {
                    Some(kind) => format!("{}: {}", kind, envelope.error.message),
                    None => envelope.error.message,
                },
                Err(_) => error_body,
            };
            error!(%status, %message, "Gemini API request failed");
            return Err(BackendError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let parsed: GenerateContentResponse = serde_json::from_str(&body).map_err(|e| {
            BackendError::Generation(format!("failed to parse Gemini response: {}", e))
        })?;

        extract_text(parsed)
    }
}

fn extract_text(response: GenerateContentResponse) -> Result<Option<String>, BackendError> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(BackendError::Generation(format!("prompt blocked: {}", reason)));
        }
        debug!("Gemini returned no candidates");
        return Ok(None);
    };

    let text: String = candidate
        .content
        .map(|content| content.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|part| part.text)
        .collect();

    debug!(finish_reason = ?candidate.finish_reason, chars = text.len(), "Received Gemini response");

    if text.is_empty() {
        Ok(None)
    } else {
        Ok(Some(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> GenerateContentResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_endpoint_from_config() {
        let mut config = GatewayConfig::new("k");
        config.base_url = "http://localhost:8080/".to_string();
        config.model = "gemini-test".to_string();
        let client = GeminiClient::new(&config).unwrap();
        assert_eq!(
            client.endpoint(),
            "http://localhost:8080/v1beta/models/gemini-test:generateContent"
        );
    }

    #[test]
    fn test_api_key_must_be_a_valid_header() {
        let err = GeminiClient::new(&GatewayConfig::new("abc\ndef")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "GEMINI_API_KEY", .. }));
        assert!(GeminiClient::new(&GatewayConfig::new("AIza-valid_key")).is_ok());
    }

    #[test]
    fn test_request_serializes_camel_case() {
        let config = crate::constants::GENERATION_CONFIG.clone();
        let request = GenerateContentRequest {
            contents: vec![Content::user("hi")],
            generation_config: &config,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "contents": [{"role": "user", "parts": [{"text": "hi"}]}],
                "generationConfig": {
                    "temperature": 1.0,
                    "topP": 0.95,
                    "topK": 64,
                    "maxOutputTokens": 8192,
                    "responseMimeType": "text/plain"
                }
            })
        );
    }

    #[test]
    fn test_extract_joins_parts() {
        let response = parse(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Hello "}, {"text": "there."}]},
                "finishReason": "STOP"
            }]
        }));
        assert_eq!(extract_text(response).unwrap().as_deref(), Some("Hello there."));
    }

    #[test]
    fn test_extract_empty_payloads() {
        assert_eq!(extract_text(parse(json!({}))).unwrap(), None);
        assert_eq!(extract_text(parse(json!({"candidates": []}))).unwrap(), None);
        let no_text = parse(json!({
            "candidates": [{"content": {"role": "model", "parts": [{}]}, "finishReason": "MAX_TOKENS"}]
        }));
        assert_eq!(extract_text(no_text).unwrap(), None);
        let no_content = parse(json!({"candidates": [{"finishReason": "SAFETY"}]}));
        assert_eq!(extract_text(no_content).unwrap(), None);
    }

    #[test]
    fn test_extract_blocked_prompt() {
        let response = parse(json!({"promptFeedback": {"blockReason": "SAFETY"}}));
        let err = extract_text(response).unwrap_err();
        assert!(matches!(err, BackendError::Generation(ref msg) if msg.contains("SAFETY")));
    }

    #[test]
    fn test_new_session_has_no_history() {
        let session = ChatSession::new(crate::constants::GENERATION_CONFIG.clone());
        assert!(session.history().is_empty());
        assert_eq!(session.generation_config().top_k, 64);
    }
}
