//! Judge provider clients.
//!
//! Every provider offers one capability: take a system prompt and a user
//! prompt, return the raw model text plus optional token usage. The set of
//! providers is closed ([`ProviderClient`]); the orchestrator picks one per
//! call and never re-resolves it mid-pipeline.
//!
//! ## Security
//!
//! Remote providers hold their key as an [`ApiCredential`]. See the
//! [`secrets`] module.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use codejudge_core::{JudgeConfig, ProviderKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod anthropic;
mod offline;
mod openai;
pub mod secrets;

pub use anthropic::{
    AnthropicProvider, ANTHROPIC_API_KEY_ENV, ANTHROPIC_BASE_URL_ENV, ANTHROPIC_DEFAULT_BASE_URL,
};
pub use offline::{OfflineProvider, OFFLINE_TOKENS_USED};
pub use openai::{OpenAiProvider, OPENAI_API_KEY_ENV, OPENAI_BASE_URL_ENV, OPENAI_DEFAULT_BASE_URL};
pub use secrets::{ApiCredential, CredentialSource};

/// Errors from judge providers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("Authentication rejected: {status} - {body}")]
    Auth { status: u16, body: String },

    #[error("HTTP error: {status} - {body}")]
    Http { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

impl ProviderError {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => ProviderError::Auth { status, body },
            _ => ProviderError::Http { status, body },
        }
    }
}

/// Sampling settings for a single judgment.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionConfig {
    pub model: String,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    pub temperature: f32,
}

impl CompletionConfig {
    /// Resolve sampling settings from a challenge config, filling defaults.
    pub fn from_judge_config(config: &JudgeConfig) -> Self {
        Self {
            model: config.model_or_default().to_string(),
            max_tokens: config.max_tokens_or_default(),
            temperature: config.temperature_or_default(),
        }
    }
}

/// A chat message in provider wire format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    /// "system" or "user"
    pub role: String,

    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Raw output of a provider call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderResponse {
    /// Model text; empty when a reachable provider omitted its content field.
    pub content: String,

    pub tokens_used: Option<u32>,
}

/// The judge capability shared by all providers.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send one judgment request. Remote providers make exactly one network call.
    async fn evaluate(
        &self,
        prompt: &str,
        system_prompt: &str,
    ) -> Result<ProviderResponse, ProviderError>;

    fn kind(&self) -> ProviderKind;

    fn model(&self) -> &str;

    /// Estimate tokens for a prompt.
    fn estimate_tokens(&self, text: &str) -> u32 {
        // ~4 chars per token
        (text.len() / 4) as u32
    }
}

/// The closed set of providers a judgment can run on.
#[derive(Debug)]
pub enum ProviderClient {
    OpenAi(OpenAiProvider),
    Anthropic(AnthropicProvider),
    Offline(OfflineProvider),
}

impl ProviderClient {
    fn inner(&self) -> &dyn LlmProvider {
        match self {
            ProviderClient::OpenAi(p) => p,
            ProviderClient::Anthropic(p) => p,
            ProviderClient::Offline(p) => p,
        }
    }
}

#[async_trait]
impl LlmProvider for ProviderClient {
    async fn evaluate(
        &self,
        prompt: &str,
        system_prompt: &str,
    ) -> Result<ProviderResponse, ProviderError> {
        self.inner().evaluate(prompt, system_prompt).await
    }

    fn kind(&self) -> ProviderKind {
        self.inner().kind()
    }

    fn model(&self) -> &str {
        self.inner().model()
    }
}

impl fmt::Display for ProviderClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.model())
    }
}

/// Shared credential handle; providers are built per call from settings.
pub type SharedCredential = Arc<ApiCredential>;

/// Read a token counter from a response field; anything but a u32 is `None`.
fn token_count(value: &serde_json::Value) -> Option<u32> {
    value.as_u64().and_then(|n| u32::try_from(n).ok())
}

/// Process-wide HTTP client (connection pool shared across judgments).
#[cfg(any(feature = "openai", feature = "anthropic"))]
fn http_client() -> &'static reqwest::Client {
    static CLIENT: std::sync::OnceLock<reqwest::Client> = std::sync::OnceLock::new();
    CLIENT.get_or_init(reqwest::Client::new)
}

/// Read a response body, turning non-success statuses into provider errors.
#[cfg(any(feature = "openai", feature = "anthropic"))]
async fn read_body(
    response: reqwest::Response,
    provider: ProviderKind,
) -> Result<String, ProviderError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ProviderError::Network(e.to_string()))?;

    if status.is_success() {
        return Ok(body);
    }

    tracing::warn!(
        provider = %provider,
        status = status.as_u16(),
        "Provider returned non-success status"
    );
    Err(ProviderError::from_status(status.as_u16(), body))
}
