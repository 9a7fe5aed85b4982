//! Judge orchestrator.
//!
//! Drives one judgment end to end:
//! - Opt-out check (`enabled: false` never reaches a provider)
//! - Rubric validation
//! - Provider selection, once per call, with the offline fallback
//! - Prompt building, the provider call, response validation, aggregation
//!
//! The orchestrator holds no per-call state and never retries. Concurrent
//! judgments share nothing but the settings and the HTTP connection pool.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use thiserror::Error;

use codejudge_core::{
    validate_requirements, validate_response, AggregationError, CodeContext, JudgeConfig,
    JudgeMetadata, JudgeResult, ProviderKind, Requirement, RubricError, SchemaError,
    ScoreAggregator,
};

use crate::config::{credential_env_var, JudgeSettings, MissingCredentialPolicy};
use crate::prompts::{build_system_prompt, build_user_prompt};
use crate::providers::{
    AnthropicProvider, CompletionConfig, LlmProvider, OfflineProvider, OpenAiProvider,
    ProviderClient, ProviderError, SharedCredential,
};

/// Errors from a judgment.
#[derive(Error, Debug)]
pub enum JudgeError {
    #[error("Provider rejected credentials: {status} - {body}")]
    ProviderAuth { status: u16, body: String },

    #[error("Provider HTTP error: {status} - {body}")]
    ProviderHttp { status: u16, body: String },

    #[error("Provider network error: {0}")]
    ProviderNetwork(String),

    #[error("Provider not configured: {0}")]
    ProviderNotConfigured(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    RequirementMismatch(#[from] AggregationError),

    #[error(transparent)]
    InvalidRubric(#[from] RubricError),

    #[error("No credential for {provider}: set {env_var}")]
    MissingCredential {
        provider: ProviderKind,
        env_var: &'static str,
    },

    #[error("Judgment timed out after {0:?}")]
    Timeout(Duration),
}

impl From<ProviderError> for JudgeError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Auth { status, body } => JudgeError::ProviderAuth { status, body },
            ProviderError::Http { status, body } => JudgeError::ProviderHttp { status, body },
            ProviderError::Network(msg) => JudgeError::ProviderNetwork(msg),
            ProviderError::NotConfigured(msg) => JudgeError::ProviderNotConfigured(msg),
        }
    }
}

/// Outcome of [`JudgeOrchestrator::evaluate`].
#[derive(Debug, Clone, PartialEq)]
pub enum JudgeOutcome {
    /// The challenge opted out of AI judging. No provider was called.
    Disabled,

    Judged(JudgeResult),
}

impl JudgeOutcome {
    pub fn is_disabled(&self) -> bool {
        matches!(self, JudgeOutcome::Disabled)
    }

    pub fn into_result(self) -> Option<JudgeResult> {
        match self {
            JudgeOutcome::Judged(result) => Some(result),
            JudgeOutcome::Disabled => None,
        }
    }
}

/// Entry point of the judge pipeline.
#[derive(Debug, Clone, Default)]
pub struct JudgeOrchestrator {
    settings: JudgeSettings,
    aggregator: ScoreAggregator,
}

impl JudgeOrchestrator {
    pub fn new(settings: JudgeSettings) -> Self {
        Self {
            settings,
            aggregator: ScoreAggregator::new(),
        }
    }

    /// Orchestrator with settings resolved from the process environment.
    pub fn from_env() -> Self {
        Self::new(JudgeSettings::from_env())
    }

    pub fn settings(&self) -> &JudgeSettings {
        &self.settings
    }

    /// Judge a submission with the provider named in `config`.
    pub async fn evaluate(
        &self,
        config: &JudgeConfig,
        requirements: &[Requirement],
        context: &CodeContext,
    ) -> Result<JudgeOutcome, JudgeError> {
        if !config.enabled {
            tracing::debug!("AI judging disabled for this challenge");
            return Ok(JudgeOutcome::Disabled);
        }

        validate_requirements(requirements)?;
        let provider = self.select_provider(config, requirements)?;
        self.judge(&provider, config, requirements, context)
            .await
            .map(JudgeOutcome::Judged)
    }

    /// Judge a submission with a caller-supplied provider.
    ///
    /// `config.provider` is ignored; everything else behaves as in
    /// [`evaluate`](Self::evaluate).
    pub async fn evaluate_with_provider(
        &self,
        provider: &dyn LlmProvider,
        config: &JudgeConfig,
        requirements: &[Requirement],
        context: &CodeContext,
    ) -> Result<JudgeOutcome, JudgeError> {
        if !config.enabled {
            tracing::debug!("AI judging disabled for this challenge");
            return Ok(JudgeOutcome::Disabled);
        }

        validate_requirements(requirements)?;
        self.judge(provider, config, requirements, context)
            .await
            .map(JudgeOutcome::Judged)
    }

    /// [`evaluate`](Self::evaluate) bounded by a deadline.
    ///
    /// On expiry the in-flight call is dropped and nothing is returned but
    /// [`JudgeError::Timeout`].
    pub async fn evaluate_with_deadline(
        &self,
        deadline: Duration,
        config: &JudgeConfig,
        requirements: &[Requirement],
        context: &CodeContext,
    ) -> Result<JudgeOutcome, JudgeError> {
        let judgment = self.evaluate(config, requirements, context);
        match tokio::time::timeout(deadline, judgment).await {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::warn!(deadline = ?deadline, "Judgment timed out");
                Err(JudgeError::Timeout(deadline))
            }
        }
    }

    /// Pick the provider for one judgment.
    ///
    /// A remote provider without a credential becomes the offline provider,
    /// unless the settings demand credentials.
    pub fn select_provider(
        &self,
        config: &JudgeConfig,
        requirements: &[Requirement],
    ) -> Result<ProviderClient, JudgeError> {
        let kind = config.provider;
        let credential = if kind.is_remote() {
            self.remote_credential(kind)?
        } else {
            None
        };

        let completion = CompletionConfig::from_judge_config(config);
        let client = match (kind, credential) {
            (ProviderKind::OpenAi, Some(credential)) => ProviderClient::OpenAi(
                OpenAiProvider::new(credential, completion)
                    .with_base_url(self.settings.openai.base_url.clone()),
            ),
            (ProviderKind::Anthropic, Some(credential)) => ProviderClient::Anthropic(
                AnthropicProvider::new(credential, completion)
                    .with_base_url(self.settings.anthropic.base_url.clone()),
            ),
            _ => ProviderClient::Offline(OfflineProvider::new(requirements)),
        };

        Ok(client)
    }

    fn remote_credential(
        &self,
        kind: ProviderKind,
    ) -> Result<Option<SharedCredential>, JudgeError> {
        let credential = self
            .settings
            .endpoint(kind)
            .and_then(|endpoint| endpoint.credential.as_ref())
            .filter(|c| !c.is_empty());

        if let Some(credential) = credential {
            return Ok(Some(Arc::clone(credential)));
        }

        let env_var = credential_env_var(kind).unwrap_or_default();
        match self.settings.missing_credential {
            MissingCredentialPolicy::Fail => Err(JudgeError::MissingCredential {
                provider: kind,
                env_var,
            }),
            MissingCredentialPolicy::FallbackToOffline => {
                tracing::warn!(
                    provider = %kind,
                    env_var,
                    "No credential for configured provider, using offline judge"
                );
                Ok(None)
            }
        }
    }

    async fn judge(
        &self,
        provider: &dyn LlmProvider,
        config: &JudgeConfig,
        requirements: &[Requirement],
        context: &CodeContext,
    ) -> Result<JudgeResult, JudgeError> {
        let system_prompt = build_system_prompt(config, requirements);
        let user_prompt = build_user_prompt(requirements, context);

        tracing::debug!(
            system_tokens = provider.estimate_tokens(&system_prompt),
            user_tokens = provider.estimate_tokens(&user_prompt),
            files = context.files.len(),
            code_chars = context.total_chars(),
            "Prompts built"
        );
        tracing::info!(
            provider = %provider.kind(),
            model = provider.model(),
            requirements = requirements.len(),
            "Starting judgment"
        );

        let started = Instant::now();
        let response = provider.evaluate(&user_prompt, &system_prompt).await;
        let elapsed_ms = started.elapsed().as_millis();
        let duration_ms = u64::try_from(elapsed_ms).unwrap_or(u64::MAX);

        let response = response.inspect_err(|e| {
            tracing::warn!(
                provider = %provider.kind(),
                duration_ms,
                error = %e,
                "Provider call failed"
            );
        })?;

        let parsed = validate_response(&response.content).inspect_err(|e| {
            tracing::warn!(
                provider = %provider.kind(),
                error = %e,
                "Model output rejected"
            );
        })?;

        let evaluated_at = Utc::now();
        let card = self
            .aggregator
            .aggregate_at(parsed, requirements, evaluated_at)?;

        tracing::info!(
            provider = %provider.kind(),
            model = provider.model(),
            duration_ms,
            tokens_used = response.tokens_used,
            total_score = card.total_score,
            max_score = card.max_score,
            "Judgment complete"
        );

        Ok(JudgeResult {
            requirements: card.requirements,
            total_score: card.total_score,
            max_score: card.max_score,
            summary: card.summary,
            metadata: JudgeMetadata {
                provider: provider.kind(),
                model: provider.model().to_string(),
                evaluated_at,
                duration_ms,
                tokens_used: response.tokens_used,
            },
        })
    }
}
