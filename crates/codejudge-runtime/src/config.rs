//! Process-wide judge settings.
//!
//! Credentials and endpoints are resolved once, when the settings are built,
//! and injected into the orchestrator. Nothing downstream reads the process
//! environment.

use std::sync::Arc;

use codejudge_core::ProviderKind;

use crate::providers::{
    ApiCredential, CredentialSource, SharedCredential, ANTHROPIC_API_KEY_ENV,
    ANTHROPIC_BASE_URL_ENV, ANTHROPIC_DEFAULT_BASE_URL, OPENAI_API_KEY_ENV, OPENAI_BASE_URL_ENV,
    OPENAI_DEFAULT_BASE_URL,
};

/// Environment variable that makes a missing credential a hard error.
pub const REQUIRE_CREDENTIALS_ENV: &str = "AI_JUDGE_REQUIRE_CREDENTIALS";

/// What to do when the configured remote provider has no credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingCredentialPolicy {
    /// Substitute the offline provider and log a warning.
    #[default]
    FallbackToOffline,
    /// Fail the judgment with `JudgeError::MissingCredential`.
    Fail,
}

/// Where and how to reach one remote provider.
#[derive(Debug, Clone)]
pub struct ProviderEndpoint {
    pub base_url: String,
    pub credential: Option<SharedCredential>,
}

impl ProviderEndpoint {
    fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            credential: None,
        }
    }

    pub fn has_credential(&self) -> bool {
        self.credential.as_ref().is_some_and(|c| !c.is_empty())
    }
}

/// Settings injected into [`JudgeOrchestrator`](crate::JudgeOrchestrator).
#[derive(Debug, Clone)]
pub struct JudgeSettings {
    pub openai: ProviderEndpoint,
    pub anthropic: ProviderEndpoint,
    pub missing_credential: MissingCredentialPolicy,
}

impl Default for JudgeSettings {
    /// No credentials, default endpoints, permissive fallback.
    fn default() -> Self {
        Self {
            openai: ProviderEndpoint::new(OPENAI_DEFAULT_BASE_URL),
            anthropic: ProviderEndpoint::new(ANTHROPIC_DEFAULT_BASE_URL),
            missing_credential: MissingCredentialPolicy::default(),
        }
    }
}

impl JudgeSettings {
    /// Resolve settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve settings from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let missing_credential = match lookup(REQUIRE_CREDENTIALS_ENV) {
            Some(v) if is_truthy(&v) => MissingCredentialPolicy::Fail,
            _ => MissingCredentialPolicy::FallbackToOffline,
        };

        Self {
            openai: ProviderEndpoint {
                base_url: base_url(OPENAI_BASE_URL_ENV, OPENAI_DEFAULT_BASE_URL),
                credential: ApiCredential::from_lookup(
                    &lookup,
                    OPENAI_API_KEY_ENV,
                    "OpenAI API key",
                )
                .map(Arc::new),
            },
            anthropic: ProviderEndpoint {
                base_url: base_url(ANTHROPIC_BASE_URL_ENV, ANTHROPIC_DEFAULT_BASE_URL),
                credential: ApiCredential::from_lookup(
                    &lookup,
                    ANTHROPIC_API_KEY_ENV,
                    "Anthropic API key",
                )
                .map(Arc::new),
            },
            missing_credential,
        }
    }

    pub fn with_openai_key(mut self, key: impl Into<String>) -> Self {
        self.openai.credential = Some(Arc::new(ApiCredential::new(
            key,
            CredentialSource::Programmatic,
            "OpenAI API key",
        )));
        self
    }

    pub fn with_anthropic_key(mut self, key: impl Into<String>) -> Self {
        self.anthropic.credential = Some(Arc::new(ApiCredential::new(
            key,
            CredentialSource::Programmatic,
            "Anthropic API key",
        )));
        self
    }

    pub fn with_openai_base_url(mut self, url: impl Into<String>) -> Self {
        self.openai.base_url = url.into();
        self
    }

    pub fn with_anthropic_base_url(mut self, url: impl Into<String>) -> Self {
        self.anthropic.base_url = url.into();
        self
    }

    pub fn with_missing_credential_policy(mut self, policy: MissingCredentialPolicy) -> Self {
        self.missing_credential = policy;
        self
    }

    /// Endpoint for a remote provider; `None` for offline.
    pub fn endpoint(&self, kind: ProviderKind) -> Option<&ProviderEndpoint> {
        match kind {
            ProviderKind::OpenAi => Some(&self.openai),
            ProviderKind::Anthropic => Some(&self.anthropic),
            ProviderKind::Offline => None,
        }
    }
}

/// Credential environment variable for a remote provider.
pub fn credential_env_var(kind: ProviderKind) -> Option<&'static str> {
    match kind {
        ProviderKind::OpenAi => Some(OPENAI_API_KEY_ENV),
        ProviderKind::Anthropic => Some(ANTHROPIC_API_KEY_ENV),
        ProviderKind::Offline => None,
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
