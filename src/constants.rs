// Fixed values shared by the gateway, the Gemini client and the web UI.

use crate::gemini::GenerationConfig;

pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
pub const MODEL_VAR: &str = "GEMINI_MODEL";
pub const BASE_URL_VAR: &str = "GEMINI_BASE_URL";
pub const TIMEOUT_VAR: &str = "GEMINI_TIMEOUT_SECS";

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Substituted when the service replies without any text.
pub const EMPTY_RESPONSE_SENTINEL: &str = "No response received.";

/// What the UI shows for any failed request, whatever its kind.
pub const GENERIC_FAILURE_MESSAGE: &str = "An error occurred. Please try again.";

pub const PAGE_TITLE: &str = "AI Career Guidance Assistant";

pub const PROMPT_SHORTCUTS: [&str; 6] = [
    "I need a roadmap for becoming a software developer.",
    "I want platforms to learn web development.",
    "How do I improve my problem-solving skills?",
    "Can you suggest some career paths in technology?",
    "What are the top skills for a data scientist?",
    "How to create a standout resume for tech jobs?",
];

lazy_static::lazy_static! {
    /// Sampling parameters sent with every request. Not tunable per call.
    pub static ref GENERATION_CONFIG: GenerationConfig = GenerationConfig {
        temperature: 1.0,
        top_p: 0.95,
        top_k: 64,
        max_output_tokens: 8192,
        response_mime_type: "text/plain".to_string(),
    };
}
