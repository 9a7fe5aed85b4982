//! # codejudge-core
//!
//! Deterministic half of the AI judge pipeline.
//!
//! This crate turns a model's raw text into a verifiable weighted score:
//! - Validates the text against a strict response schema
//! - Correlates evaluations with the input rubric by requirement id
//! - Computes weighted, total and maximum scores
//!
//! ## Key Guarantees
//!
//! 1. **No network**: Nothing here talks to a model provider
//! 2. **No coercion**: Out-of-range model numbers are rejected, never clamped
//! 3. **Deterministic order**: Results follow the input requirement order
//! 4. **Stateless**: Every call creates and returns fresh values
//!
//! ## Example
//!
//! ```rust,ignore
//! use codejudge_core::{validate_response, Requirement, ScoreAggregator};
//!
//! let requirements = vec![Requirement::new("quality", "Code quality", 100.0)];
//! let response = validate_response(&raw_model_text)?;
//! let card = ScoreAggregator::new().aggregate(response, &requirements)?;
//! println!("{} / {}", card.total_score, card.max_score);
//! ```

pub mod aggregator;
pub mod context;
pub mod response;
pub mod rubric;
pub mod types;

// Re-export main types at crate root
pub use aggregator::{AggregationError, ScoreAggregator, ScoreCard};
pub use context::language_for_path;
pub use response::{
    validate_response, JudgeResponse, RequirementEvaluation, SchemaError, RESPONSE_SCHEMA_JSON,
};
pub use rubric::{validate_requirements, ChallengeRubric, RubricError};
pub use types::{
    CodeContext, CodeFile, CodeMetadata, CriterionResult, JudgeConfig, JudgeMetadata, JudgeResult,
    ProviderKind, Requirement, RequirementResult,
};
