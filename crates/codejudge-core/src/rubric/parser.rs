//! Rubric parsing from YAML/JSON.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{JudgeConfig, Requirement};

/// Errors that can occur when loading or validating a rubric.
#[derive(Error, Debug)]
pub enum RubricError {
    #[error("Failed to read rubric file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid rubric: {0}")]
    Invalid(String),
}

/// Judge configuration plus the ordered requirement list of a challenge version.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeRubric {
    #[serde(default)]
    pub judge: JudgeConfig,

    pub requirements: Vec<Requirement>,
}

impl ChallengeRubric {
    /// Parse a rubric from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, RubricError> {
        let rubric: ChallengeRubric = serde_yaml::from_str(yaml)?;
        rubric.validate()?;
        Ok(rubric)
    }

    /// Parse a rubric from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, RubricError> {
        let rubric: ChallengeRubric = serde_json::from_str(json)?;
        rubric.validate()?;
        Ok(rubric)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, RubricError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, RubricError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Sum of requirement weights; this is the judge's `maxScore`.
    pub fn max_score(&self) -> f64 {
        self.requirements.iter().map(|r| r.weight).sum()
    }

    fn validate(&self) -> Result<(), RubricError> {
        validate_requirements(&self.requirements)
    }
}

/// Check that a requirement list can be judged and correlated.
///
/// Rejects an empty list, blank ids or titles, duplicate ids, and weights
/// that are not finite and strictly positive.
pub fn validate_requirements(requirements: &[Requirement]) -> Result<(), RubricError> {
    if requirements.is_empty() {
        return Err(RubricError::Invalid(
            "at least one requirement is needed".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for req in requirements {
        if req.id.trim().is_empty() {
            return Err(RubricError::Invalid(
                "requirement id must not be empty".to_string(),
            ));
        }
        if req.title.trim().is_empty() {
            return Err(RubricError::Invalid(format!(
                "requirement '{}' has an empty title",
                req.id
            )));
        }
        if !req.weight.is_finite() || req.weight <= 0.0 {
            return Err(RubricError::Invalid(format!(
                "requirement '{}' has invalid weight {}",
                req.id, req.weight
            )));
        }
        if !seen.insert(req.id.as_str()) {
            return Err(RubricError::Invalid(format!(
                "duplicate requirement id: {}",
                req.id
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProviderKind;

    const VALID_RUBRIC: &str = r#"
judge:
  enabled: true
  provider: anthropic
  maxTokens: 2000
requirements:
  - id: "functionality"
    title: "Functionality"
    description: "The app does what the challenge asks"
    weight: 60
    criteria:
      - "All endpoints respond"
      - "Edge cases handled"
    evidenceTypes: ["file path", "test output"]
  - id: "quality"
    title: "Code quality"
    weight: 40
"#;

    #[test]
    fn test_parse_valid_rubric() {
        let rubric = ChallengeRubric::from_yaml(VALID_RUBRIC).unwrap();
        assert!(rubric.judge.enabled);
        assert_eq!(rubric.judge.provider, ProviderKind::Anthropic);
        assert_eq!(rubric.judge.max_tokens, Some(2000));
        assert_eq!(rubric.requirements.len(), 2);
        assert_eq!(rubric.requirements[0].criteria.len(), 2);
        assert!(rubric.requirements[1].criteria.is_empty());
        assert_eq!(rubric.max_score(), 100.0);
    }

    #[test]
    fn test_parse_json_rubric_without_judge_section() {
        let json = r#"{"requirements":[{"id":"r1","title":"Docs","weight":10}]}"#;
        let rubric = ChallengeRubric::from_json(json).unwrap();
        assert!(!rubric.judge.enabled);
        assert_eq!(rubric.max_score(), 10.0);
    }

    #[test]
    fn test_duplicate_requirement_ids() {
        let yaml = r#"
requirements:
  - { id: "r1", title: "A", weight: 50 }
  - { id: "r1", title: "B", weight: 50 }
"#;
        let result = ChallengeRubric::from_yaml(yaml);
        assert!(matches!(result, Err(RubricError::Invalid(msg)) if msg.contains("duplicate")));
    }

    #[test]
    fn test_non_positive_weight_rejected() {
        let reqs = vec![Requirement::new("r1", "A", 0.0)];
        assert!(validate_requirements(&reqs).is_err());

        let reqs = vec![Requirement::new("r1", "A", -5.0)];
        assert!(validate_requirements(&reqs).is_err());

        let reqs = vec![Requirement::new("r1", "A", f64::NAN)];
        assert!(validate_requirements(&reqs).is_err());
    }

    #[test]
    fn test_empty_list_and_blank_fields_rejected() {
        assert!(validate_requirements(&[]).is_err());

        let blank_id = [Requirement::new("  ", "A", 1.0)];
        assert!(validate_requirements(&blank_id).is_err());

        let blank_title = [Requirement::new("r1", "", 1.0)];
        assert!(validate_requirements(&blank_title).is_err());
    }

    #[test]
    fn test_malformed_yaml() {
        let result = ChallengeRubric::from_yaml("requirements: [ {id: ");
        assert!(matches!(result, Err(RubricError::Yaml(_))));
    }
}
