//! Anthropic-style messages provider (secondary).
//!
//! ## Security
//!
//! The key is held as a shared [`ApiCredential`](super::secrets::ApiCredential)
//! and exposed only while building the `x-api-key` header.

use super::{
    token_count, CompletionConfig, LlmProvider, ProviderError, ProviderResponse, SharedCredential,
};
use async_trait::async_trait;
use codejudge_core::ProviderKind;
use serde::Serialize;
use serde_json::Value as JsonValue;

/// Environment variable name for the Anthropic API key.
pub const ANTHROPIC_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Environment variable overriding the Anthropic endpoint.
pub const ANTHROPIC_BASE_URL_ENV: &str = "ANTHROPIC_BASE_URL";

pub const ANTHROPIC_DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic messages provider.
pub struct AnthropicProvider {
    credential: SharedCredential,
    base_url: String,
    completion: CompletionConfig,
}

impl std::fmt::Debug for AnthropicProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicProvider")
            .field("credential", &self.credential)
            .field("base_url", &self.base_url)
            .field("model", &self.completion.model)
            .finish()
    }
}

impl AnthropicProvider {
    pub fn new(credential: SharedCredential, completion: CompletionConfig) -> Self {
        Self {
            credential,
            base_url: ANTHROPIC_DEFAULT_BASE_URL.to_string(),
            completion,
        }
    }

    /// Set custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    fn request<'a>(&'a self, prompt: &'a str, system_prompt: &'a str) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &self.completion.model,
            max_tokens: self.completion.max_tokens,
            temperature: self.completion.temperature,
            system: system_prompt,
            messages: vec![MessagesMessage {
                role: "user",
                content: prompt,
            }],
        }
    }
}

/// Messages API request format.
#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<MessagesMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct MessagesMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Join text blocks and sum token usage.
///
/// Content and usage are read independently: a body without content yields
/// "", and malformed usage yields `None` without touching the content.
fn parse_messages_response(body: &str) -> ProviderResponse {
    let parsed: JsonValue = serde_json::from_str(body).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "Unparseable messages response body");
        JsonValue::Null
    });

    let content = parsed["content"]
        .as_array()
        .map(|blocks| {
            blocks
                .iter()
                .filter(|block| block["type"] == "text")
                .filter_map(|block| block["text"].as_str())
                .collect::<String>()
        })
        .unwrap_or_default();

    let usage = &parsed["usage"];
    let tokens_used = token_count(&usage["input_tokens"])
        .zip(token_count(&usage["output_tokens"]))
        .map(|(input, output)| input.saturating_add(output));

    ProviderResponse {
        content,
        tokens_used,
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    #[cfg(feature = "anthropic")]
    async fn evaluate(
        &self,
        prompt: &str,
        system_prompt: &str,
    ) -> Result<ProviderResponse, ProviderError> {
        let url = format!("{}/messages", self.base_url);
        tracing::debug!(url = %url, model = %self.completion.model, "Sending messages request");

        // Credential is exposed here only, at the point of use
        let response = super::http_client()
            .post(&url)
            .header("x-api-key", self.credential.expose())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&self.request(prompt, system_prompt))
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let body = super::read_body(response, ProviderKind::Anthropic).await?;
        Ok(parse_messages_response(&body))
    }

    #[cfg(not(feature = "anthropic"))]
    async fn evaluate(
        &self,
        _prompt: &str,
        _system_prompt: &str,
    ) -> Result<ProviderResponse, ProviderError> {
        Err(ProviderError::NotConfigured(
            "Anthropic provider requires 'anthropic' feature".to_string(),
        ))
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }

    fn model(&self) -> &str {
        &self.completion.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{ApiCredential, CredentialSource};
    use std::sync::Arc;

    fn provider() -> AnthropicProvider {
        AnthropicProvider::new(
            Arc::new(ApiCredential::new(
                "sk-ant-secret",
                CredentialSource::Programmatic,
                "Anthropic API key",
            )),
            CompletionConfig {
                model: "claude-3-5-sonnet-20241022".to_string(),
                max_tokens: 1024,
                temperature: 0.2,
            },
        )
    }

    #[test]
    fn test_request_wire_shape() {
        let p = provider();
        let request = p.request("the code", "be strict");
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "claude-3-5-sonnet-20241022");
        assert_eq!(json["max_tokens"], 1024);
        assert_eq!(json["system"], "be strict");
        assert_eq!(json["messages"].as_array().unwrap().len(), 1);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "the code");
    }

    #[test]
    fn test_response_joins_text_and_sums_tokens() {
        let body = r#"{
            "content": [
                {"type": "text", "text": "{\"summary\":"},
                {"type": "tool_use", "id": "toolu_1"},
                {"type": "text", "text": "\"ok\"}"}
            ],
            "usage": {"input_tokens": 1200, "output_tokens": 340}
        }"#;
        let response = parse_messages_response(body);
        assert_eq!(response.content, r#"{"summary":"ok"}"#);
        assert_eq!(response.tokens_used, Some(1540));
    }

    #[test]
    fn test_response_without_content_degrades_to_empty() {
        let response = parse_messages_response(r#"{"id":"msg_1"}"#);
        assert_eq!(response.content, "");
        assert_eq!(response.tokens_used, None);

        assert_eq!(parse_messages_response("not json").content, "");
    }

    #[test]
    fn test_malformed_usage_keeps_content() {
        let body = r#"{
            "content": [{"type": "text", "text": "{\"summary\":\"ok\"}"}],
            "usage": {"input_tokens": null, "output_tokens": 5}
        }"#;
        let response = parse_messages_response(body);
        assert_eq!(response.content, r#"{"summary":"ok"}"#);
        assert_eq!(response.tokens_used, None);

        let body = r#"{"content": [{"type": "text", "text": "{}"}], "usage": "n/a"}"#;
        let response = parse_messages_response(body);
        assert_eq!(response.content, "{}");
        assert_eq!(response.tokens_used, None);
    }

    #[test]
    fn test_debug_redacts_key() {
        let debug = format!("{:?}", provider().with_base_url("http://localhost:1/"));
        assert!(!debug.contains("sk-ant-secret"));
        assert!(debug.contains("http://localhost:1\""));
    }
}
