//! Response validation for model output.
//!
//! The model's text is untrusted. It is parsed as JSON, checked against the
//! embedded schema, and only then turned into typed values. Out-of-range
//! numbers are rejected, never clamped: the model's own number is the score.

mod schema;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::CriterionResult;

pub use schema::RESPONSE_SCHEMA_JSON;

/// Errors from response validation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Response is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("Response violates schema at {path}: {message}")]
    Violation { path: String, message: String },

    #[error("Response schema unavailable: {0}")]
    SchemaUnavailable(String),
}

/// A validated judge response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JudgeResponse {
    pub requirements: Vec<RequirementEvaluation>,
    pub summary: String,
}

/// The model's evaluation of one requirement, before weighting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementEvaluation {
    pub requirement_id: String,
    pub score: f64,
    pub criteria: Vec<CriterionResult>,
    pub overall_reasoning: String,
    pub confidence: f64,
}

/// Parse and validate raw provider text.
///
/// No reconciliation against the input requirements happens here; that is
/// the aggregator's job.
pub fn validate_response(raw: &str) -> Result<JudgeResponse, SchemaError> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| SchemaError::InvalidJson(e.to_string()))?;

    schema::check_response_schema(&value)?;

    serde_json::from_value(value).map_err(|e| SchemaError::Violation {
        path: "/".to_string(),
        message: e.to_string(),
    })
}
