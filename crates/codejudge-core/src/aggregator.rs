//! Aggregator: turns a validated response into weighted requirement scores.
//!
//! The aggregator applies fixed scoring rules:
//! 1. Every input requirement must be answered exactly once, and nothing else
//! 2. `weightedScore = round(score * weight / 100, 2)`
//! 3. `totalScore = Σ weightedScore`, `maxScore = Σ weight` over the INPUT list
//! 4. Output order is input order, whatever order the model used
//!
//! Criteria, reasoning and confidence are carried through untouched.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::response::{JudgeResponse, RequirementEvaluation};
use crate::types::{Requirement, RequirementResult};

/// Errors from score aggregation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AggregationError {
    #[error(
        "Response does not match requested requirements (missing: {missing:?}, unexpected: {unexpected:?}, duplicated: {duplicated:?})"
    )]
    RequirementMismatch {
        /// Requested ids the model did not answer.
        missing: Vec<String>,
        /// Ids the model answered that were never requested.
        unexpected: Vec<String>,
        /// Requested ids the model answered more than once.
        duplicated: Vec<String>,
    },
}

/// Weighted scores for a whole rubric, before run metadata is attached.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreCard {
    pub requirements: Vec<RequirementResult>,
    pub total_score: f64,
    pub max_score: f64,
    pub summary: String,
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `round(score * weight / 100, 2)`
pub fn weighted_score(score: f64, weight: f64) -> f64 {
    round2(score * weight / 100.0)
}

/// The aggregator correlates model evaluations with the input rubric.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScoreAggregator;

impl ScoreAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Aggregate a validated response against the requirements it was asked about.
    ///
    /// Any missing, unknown or repeated requirement id fails the whole
    /// evaluation; nothing is zero-filled or dropped.
    pub fn aggregate(
        &self,
        response: JudgeResponse,
        requirements: &[Requirement],
    ) -> Result<ScoreCard, AggregationError> {
        self.aggregate_at(response, requirements, Utc::now())
    }

    /// Same as [`aggregate`](Self::aggregate) with an explicit timestamp.
    pub fn aggregate_at(
        &self,
        response: JudgeResponse,
        requirements: &[Requirement],
        evaluated_at: DateTime<Utc>,
    ) -> Result<ScoreCard, AggregationError> {
        let JudgeResponse {
            requirements: evaluations,
            summary,
        } = response;

        let mut by_id = self.index_evaluations(evaluations, requirements)?;

        let mut results = Vec::with_capacity(requirements.len());
        for req in requirements {
            // index_evaluations guarantees presence
            let Some(eval) = by_id.remove(req.id.as_str()) else {
                return Err(AggregationError::RequirementMismatch {
                    missing: vec![req.id.clone()],
                    unexpected: vec![],
                    duplicated: vec![],
                });
            };

            results.push(RequirementResult {
                requirement_id: req.id.clone(),
                title: req.title.clone(),
                score: eval.score,
                weight: req.weight,
                weighted_score: weighted_score(eval.score, req.weight),
                criteria: eval.criteria,
                overall_reasoning: eval.overall_reasoning,
                confidence: eval.confidence,
                evaluated_at,
            });
        }

        let total_score = round2(results.iter().map(|r| r.weighted_score).sum());
        let max_score = requirements.iter().map(|r| r.weight).sum();

        tracing::debug!(
            requirements = results.len(),
            total_score,
            max_score,
            "Aggregated requirement scores"
        );

        Ok(ScoreCard {
            requirements: results,
            total_score,
            max_score,
            summary,
        })
    }

    /// Index evaluations by id and reject any id-level mismatch.
    fn index_evaluations<'r>(
        &self,
        evaluations: Vec<RequirementEvaluation>,
        requirements: &'r [Requirement],
    ) -> Result<HashMap<&'r str, RequirementEvaluation>, AggregationError> {
        let mut by_id: HashMap<&'r str, RequirementEvaluation> = HashMap::new();
        let mut unexpected = Vec::new();
        let mut duplicated = Vec::new();

        for eval in evaluations {
            match requirements.iter().find(|r| r.id == eval.requirement_id) {
                Some(req) => {
                    if by_id.contains_key(req.id.as_str()) {
                        if !duplicated.contains(&req.id) {
                            duplicated.push(req.id.clone());
                        }
                    } else {
                        by_id.insert(req.id.as_str(), eval);
                    }
                }
                None => unexpected.push(eval.requirement_id),
            }
        }

        let missing: Vec<String> = requirements
            .iter()
            .filter(|r| !by_id.contains_key(r.id.as_str()))
            .map(|r| r.id.clone())
            .collect();

        if !missing.is_empty() || !unexpected.is_empty() || !duplicated.is_empty() {
            tracing::warn!(
                ?missing,
                ?unexpected,
                ?duplicated,
                "Judge response does not match requested requirements"
            );
            return Err(AggregationError::RequirementMismatch {
                missing,
                unexpected,
                duplicated,
            });
        }

        Ok(by_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CriterionResult;

    fn eval(id: &str, score: f64) -> RequirementEvaluation {
        RequirementEvaluation {
            requirement_id: id.to_string(),
            score,
            criteria: vec![CriterionResult {
                criterion: format!("{} criterion", id),
                met: score >= 50.0,
                score,
                reasoning: format!("reasoning for {}", id),
                evidence: Some(vec!["src/lib.rs".to_string()]),
            }],
            overall_reasoning: format!("overall {}", id),
            confidence: 0.75,
        }
    }

    fn response(evals: Vec<RequirementEvaluation>) -> JudgeResponse {
        JudgeResponse {
            requirements: evals,
            summary: "summary".to_string(),
        }
    }

    #[test]
    fn test_weighted_scores_sixty_forty() {
        let reqs = vec![
            Requirement::new("functionality", "Functionality", 60.0),
            Requirement::new("quality", "Quality", 40.0),
        ];
        let card = ScoreAggregator::new()
            .aggregate(
                response(vec![eval("functionality", 80.0), eval("quality", 50.0)]),
                &reqs,
            )
            .unwrap();

        assert_eq!(card.requirements[0].weighted_score, 48.0);
        assert_eq!(card.requirements[1].weighted_score, 20.0);
        assert_eq!(card.total_score, 68.0);
        assert_eq!(card.max_score, 100.0);
        assert_eq!(card.summary, "summary");
    }

    #[test]
    fn test_output_follows_input_order() {
        let reqs = vec![
            Requirement::new("a", "A", 10.0),
            Requirement::new("b", "B", 20.0),
            Requirement::new("c", "C", 30.0),
        ];
        let card = ScoreAggregator::new()
            .aggregate(
                response(vec![eval("c", 10.0), eval("a", 20.0), eval("b", 30.0)]),
                &reqs,
            )
            .unwrap();

        let ids: Vec<&str> = card
            .requirements
            .iter()
            .map(|r| r.requirement_id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(card.requirements[0].score, 20.0);
    }

    #[test]
    fn test_fields_carried_through() {
        let reqs = vec![Requirement::new("a", "Title from rubric", 25.0)];
        let input = eval("a", 33.0);
        let expected_criteria = input.criteria.clone();
        let card = ScoreAggregator::new()
            .aggregate(response(vec![input]), &reqs)
            .unwrap();

        let result = &card.requirements[0];
        assert_eq!(result.title, "Title from rubric");
        assert_eq!(result.weight, 25.0);
        assert_eq!(result.criteria, expected_criteria);
        assert_eq!(result.overall_reasoning, "overall a");
        assert_eq!(result.confidence, 0.75);
        assert_eq!(result.weighted_score, 8.25);
    }

    #[test]
    fn test_rounding_to_two_decimals() {
        assert_eq!(weighted_score(33.333, 30.0), 10.0);
        assert_eq!(weighted_score(66.67, 15.0), 10.0);
        assert_eq!(weighted_score(77.7, 33.0), 25.64);
    }

    #[test]
    fn test_max_score_is_literal_weight_sum() {
        let reqs = vec![
            Requirement::new("a", "A", 7.5),
            Requirement::new("b", "B", 2.5),
        ];
        let card = ScoreAggregator::new()
            .aggregate(response(vec![eval("a", 100.0), eval("b", 100.0)]), &reqs)
            .unwrap();
        assert_eq!(card.max_score, 10.0);
        assert_eq!(card.total_score, 10.0);
    }

    #[test]
    fn test_missing_requirement_is_rejected() {
        let reqs = vec![
            Requirement::new("a", "A", 50.0),
            Requirement::new("b", "B", 50.0),
        ];
        let err = ScoreAggregator::new()
            .aggregate(response(vec![eval("a", 90.0)]), &reqs)
            .unwrap_err();
        assert_eq!(
            err,
            AggregationError::RequirementMismatch {
                missing: vec!["b".to_string()],
                unexpected: vec![],
                duplicated: vec![],
            }
        );
    }

    #[test]
    fn test_unknown_requirement_is_rejected() {
        let reqs = vec![Requirement::new("a", "A", 50.0)];
        let err = ScoreAggregator::new()
            .aggregate(response(vec![eval("a", 90.0), eval("zzz", 10.0)]), &reqs)
            .unwrap_err();
        match err {
            AggregationError::RequirementMismatch {
                missing,
                unexpected,
                duplicated,
            } => {
                assert!(missing.is_empty());
                assert_eq!(unexpected, vec!["zzz".to_string()]);
                assert!(duplicated.is_empty());
            }
        }
    }

    #[test]
    fn test_duplicate_requirement_is_rejected() {
        let reqs = vec![Requirement::new("a", "A", 50.0)];
        let err = ScoreAggregator::new()
            .aggregate(response(vec![eval("a", 90.0), eval("a", 10.0)]), &reqs)
            .unwrap_err();
        let AggregationError::RequirementMismatch { duplicated, .. } = err;
        assert_eq!(duplicated, vec!["a".to_string()]);
    }

    #[test]
    fn test_evaluated_at_is_stamped_once() {
        let reqs = vec![
            Requirement::new("a", "A", 50.0),
            Requirement::new("b", "B", 50.0),
        ];
        let now = Utc::now();
        let card = ScoreAggregator::new()
            .aggregate_at(response(vec![eval("a", 1.0), eval("b", 2.0)]), &reqs, now)
            .unwrap();
        assert!(card.requirements.iter().all(|r| r.evaluated_at == now));
    }
}
