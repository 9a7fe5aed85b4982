//! OpenAI-style chat completions provider (primary).

use super::{
    token_count, ChatMessage, CompletionConfig, LlmProvider, ProviderError, ProviderResponse,
    SharedCredential,
};
use async_trait::async_trait;
use codejudge_core::ProviderKind;
use serde::Serialize;
use serde_json::Value as JsonValue;

/// Environment variable name for the OpenAI API key.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Environment variable overriding the OpenAI endpoint.
pub const OPENAI_BASE_URL_ENV: &str = "OPENAI_BASE_URL";

pub const OPENAI_DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI chat completions provider. Requests JSON-object output.
pub struct OpenAiProvider {
    credential: SharedCredential,
    base_url: String,
    completion: CompletionConfig,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("credential", &self.credential)
            .field("base_url", &self.base_url)
            .field("model", &self.completion.model)
            .finish()
    }
}

impl OpenAiProvider {
    pub fn new(credential: SharedCredential, completion: CompletionConfig) -> Self {
        Self {
            credential,
            base_url: OPENAI_DEFAULT_BASE_URL.to_string(),
            completion,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    fn request(&self, prompt: &str, system_prompt: &str) -> ChatRequest<'_> {
        ChatRequest {
            model: &self.completion.model,
            messages: vec![
                ChatMessage::system(system_prompt),
                ChatMessage::user(prompt),
            ],
            max_tokens: self.completion.max_tokens,
            temperature: self.completion.temperature,
            response_format: ResponseFormat {
                type_: "json_object",
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    type_: &'static str,
}

/// Pull `choices[0].message.content` and `usage.total_tokens`.
///
/// Content and usage are read independently: a missing content field yields
/// "", and malformed usage yields `None` without touching the content.
fn parse_chat_response(body: &str) -> ProviderResponse {
    let parsed: JsonValue = serde_json::from_str(body).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "Unparseable chat completion body");
        JsonValue::Null
    });

    let content = parsed["choices"][0]["message"]["content"]
        .as_str()
        .unwrap_or_default()
        .to_string();

    ProviderResponse {
        content,
        tokens_used: token_count(&parsed["usage"]["total_tokens"]),
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    #[cfg(feature = "openai")]
    async fn evaluate(
        &self,
        prompt: &str,
        system_prompt: &str,
    ) -> Result<ProviderResponse, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);
        tracing::debug!(
            url = %url,
            model = %self.completion.model,
            "Sending chat completion request"
        );

        let response = super::http_client()
            .post(&url)
            .bearer_auth(self.credential.expose())
            .json(&self.request(prompt, system_prompt))
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let body = super::read_body(response, ProviderKind::OpenAi).await?;
        Ok(parse_chat_response(&body))
    }

    #[cfg(not(feature = "openai"))]
    async fn evaluate(
        &self,
        _prompt: &str,
        _system_prompt: &str,
    ) -> Result<ProviderResponse, ProviderError> {
        Err(ProviderError::NotConfigured(
            "OpenAI provider requires 'openai' feature".to_string(),
        ))
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    fn model(&self) -> &str {
        &self.completion.model
    }
}
