//! Deterministic offline judge.
//!
//! Used for local testing and as the fallback when a remote provider has no
//! credential. Built per call from the requirement list so its canned answer
//! always names exactly the requested ids.

use super::{LlmProvider, ProviderError, ProviderResponse};
use async_trait::async_trait;
use codejudge_core::{ProviderKind, Requirement};
use serde_json::json;

/// Token count reported for every offline judgment.
pub const OFFLINE_TOKENS_USED: u32 = 500;

const OFFLINE_SCORE: f64 = 70.0;
const OFFLINE_CONFIDENCE: f64 = 0.5;

/// Canned, schema-valid judge.
#[derive(Debug, Clone)]
pub struct OfflineProvider {
    content: String,
}

impl OfflineProvider {
    pub fn new(requirements: &[Requirement]) -> Self {
        let evaluations: Vec<_> = requirements
            .iter()
            .map(|req| {
                let criteria: Vec<_> = req
                    .criteria
                    .iter()
                    .map(|criterion| {
                        json!({
                            "criterion": criterion,
                            "met": true,
                            "score": OFFLINE_SCORE,
                            "reasoning": "Offline evaluation; criterion not inspected."
                        })
                    })
                    .collect();

                json!({
                    "requirementId": req.id,
                    "score": OFFLINE_SCORE,
                    "criteria": criteria,
                    "overallReasoning": format!("Offline evaluation of '{}'.", req.title),
                    "confidence": OFFLINE_CONFIDENCE
                })
            })
            .collect();

        let content = json!({
            "requirements": evaluations,
            "summary": "Offline evaluation. No model was consulted."
        })
        .to_string();

        Self { content }
    }
}

#[async_trait]
impl LlmProvider for OfflineProvider {
    async fn evaluate(
        &self,
        _prompt: &str,
        _system_prompt: &str,
    ) -> Result<ProviderResponse, ProviderError> {
        Ok(ProviderResponse {
            content: self.content.clone(),
            tokens_used: Some(OFFLINE_TOKENS_USED),
        })
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Offline
    }

    fn model(&self) -> &str {
        ProviderKind::Offline.default_model()
    }
}
