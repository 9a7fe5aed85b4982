//! Data model shared by the judge pipeline.
//!
//! Inbound types (`JudgeConfig`, `Requirement`, `CodeContext`) come from the
//! challenge and artifact collaborators. Outbound types (`RequirementResult`,
//! `JudgeResult`) are handed to persistence as-is. Everything serializes in
//! camelCase to match the stored documents.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default completion budget when a challenge does not set `maxTokens`.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Default sampling temperature when a challenge does not set one.
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

/// The backend that performs the judgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProviderKind {
    /// OpenAI-style chat completions (primary).
    #[default]
    #[serde(rename = "openai", alias = "primary")]
    OpenAi,

    /// Anthropic-style messages (secondary).
    #[serde(rename = "anthropic", alias = "secondary")]
    Anthropic,

    /// Deterministic canned judge, no network.
    #[serde(rename = "offline", alias = "mock")]
    Offline,
}

impl ProviderKind {
    /// Whether this provider makes an outbound network call.
    pub fn is_remote(&self) -> bool {
        !matches!(self, ProviderKind::Offline)
    }

    /// Model used when the challenge config leaves `model` unset.
    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "gpt-4o",
            ProviderKind::Anthropic => "claude-3-5-sonnet-20241022",
            ProviderKind::Offline => "offline",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::OpenAi => write!(f, "openai"),
            ProviderKind::Anthropic => write!(f, "anthropic"),
            ProviderKind::Offline => write!(f, "offline"),
        }
    }
}

/// Per-challenge-version judge configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JudgeConfig {
    /// Opt-in switch; a disabled config never reaches a provider.
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub provider: ProviderKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Replaces the synthesized system prompt verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt_override: Option<String>,
}

impl JudgeConfig {
    /// An enabled config for the given provider with all defaults.
    pub fn enabled(provider: ProviderKind) -> Self {
        Self {
            enabled: true,
            provider,
            ..Default::default()
        }
    }

    /// Configured model, or the provider default.
    pub fn model_or_default(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }

    pub fn max_tokens_or_default(&self) -> u32 {
        self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)
    }

    pub fn temperature_or_default(&self) -> f32 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }
}

/// A weighted rubric item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requirement {
    pub id: String,

    pub title: String,

    #[serde(default)]
    pub description: String,

    /// Relative weight, must be > 0. Weights need not sum to 100.
    pub weight: f64,

    /// Ordered sub-checks.
    #[serde(default)]
    pub criteria: Vec<String>,

    /// Kinds of evidence the model should cite (e.g. "file path", "test output").
    #[serde(default)]
    pub evidence_types: Vec<String>,
}

impl Requirement {
    pub fn new(id: impl Into<String>, title: impl Into<String>, weight: f64) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            weight,
            criteria: Vec::new(),
            evidence_types: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_criterion(mut self, criterion: impl Into<String>) -> Self {
        self.criteria.push(criterion.into());
        self
    }

    pub fn with_evidence_type(mut self, evidence_type: impl Into<String>) -> Self {
        self.evidence_types.push(evidence_type.into());
        self
    }
}

/// A single file of the submitted artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeFile {
    pub path: String,
    pub content: String,
    pub language: String,
}

/// Optional build/runtime facts about the artifact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_output: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_output: Option<String>,
}

/// Transient snapshot of a submission, built by the caller per evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeContext {
    #[serde(default)]
    pub files: Vec<CodeFile>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<CodeMetadata>,
}

/// The model's judgment of one criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriterionResult {
    pub criterion: String,
    pub met: bool,
    /// 0..=100
    pub score: f64,
    pub reasoning: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<Vec<String>>,
}

/// Final, weighted result for one input requirement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementResult {
    pub requirement_id: String,
    pub title: String,
    /// Raw 0..=100 score from the model.
    pub score: f64,
    pub weight: f64,
    /// `round(score * weight / 100, 2)`
    pub weighted_score: f64,
    pub criteria: Vec<CriterionResult>,
    pub overall_reasoning: String,
    /// 0..=1
    pub confidence: f64,
    pub evaluated_at: DateTime<Utc>,
}

/// Provenance of a judgment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JudgeMetadata {
    /// Provider actually used, after any offline fallback.
    pub provider: ProviderKind,
    pub model: String,
    pub evaluated_at: DateTime<Utc>,
    /// Wall-clock time of the provider call only.
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u32>,
}

/// The complete output of one judgment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JudgeResult {
    /// One entry per input requirement, in input order.
    pub requirements: Vec<RequirementResult>,
    pub total_score: f64,
    pub max_score: f64,
    pub summary: String,
    pub metadata: JudgeMetadata,
}

impl JudgeResult {
    /// `total_score / max_score` in 0..=1, or 0 when `max_score` is 0.
    pub fn normalized_score(&self) -> f64 {
        if self.max_score > 0.0 {
            self.total_score / self.max_score
        } else {
            0.0
        }
    }
}
