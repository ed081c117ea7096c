pub mod chat;
pub mod config;
pub mod constants;
pub mod error;
pub mod formatter;
pub mod gateway;
pub mod gemini;
pub mod web_server;

pub use config::GatewayConfig;
pub use error::{BackendError, ConfigError, GatewayError};
pub use formatter::format_response;
pub use gateway::{get_ai_response, AiGateway};
pub use gemini::{ChatSession, GeminiClient, GenerationConfig, GenerativeBackend};
