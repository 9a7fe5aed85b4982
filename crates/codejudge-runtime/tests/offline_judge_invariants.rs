//! Property tests for the offline judge.
//!
//! Whatever rubric it is built from, the offline answer must pass schema
//! validation, name exactly the requested ids and aggregate to a total no
//! larger than the maximum.

use codejudge_core::{
    validate_response, CodeContext, JudgeConfig, ProviderKind, Requirement, ScoreAggregator,
};
use codejudge_runtime::{JudgeOrchestrator, LlmProvider, OfflineProvider};
use proptest::prelude::*;

fn rubric() -> impl Strategy<Value = Vec<Requirement>> {
    let requirement = (
        "[a-z0-9_-]{0,8}",
        "[A-Za-z0-9]\\PC{0,24}",
        prop::collection::vec("\\PC{0,30}", 0..5),
        (1u32..=100).prop_map(f64::from),
    );

    prop::collection::vec(requirement, 1..10).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (suffix, title, criteria, weight))| {
                // The index prefix keeps ids unique
                let mut req = Requirement::new(format!("req-{i}-{suffix}"), title, weight);
                req.criteria = criteria;
                req
            })
            .collect()
    })
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #[test]
    fn offline_answer_validates_and_aggregates(requirements in rubric()) {
        let provider = OfflineProvider::new(&requirements);
        let response = runtime()
            .block_on(provider.evaluate("prompt", "system"))
            .unwrap();

        let parsed = validate_response(&response.content).unwrap();
        for (evaluation, req) in parsed.requirements.iter().zip(&requirements) {
            prop_assert_eq!(evaluation.criteria.len(), req.criteria.len());
        }

        let card = ScoreAggregator::new()
            .aggregate(parsed, &requirements)
            .unwrap();

        let expected_max: f64 = requirements.iter().map(|r| r.weight).sum();
        prop_assert!((card.max_score - expected_max).abs() < 1e-9);
        prop_assert!(card.total_score <= card.max_score);

        let ids: Vec<&str> = card
            .requirements
            .iter()
            .map(|r| r.requirement_id.as_str())
            .collect();
        let expected_ids: Vec<&str> = requirements.iter().map(|r| r.id.as_str()).collect();
        prop_assert_eq!(ids, expected_ids);
    }

    #[test]
    fn offline_pipeline_always_judges(requirements in rubric()) {
        let config = JudgeConfig::enabled(ProviderKind::Offline);
        let context = CodeContext::default();
        let orchestrator = JudgeOrchestrator::default();
        let judgment = orchestrator.evaluate(&config, &requirements, &context);
        let result = runtime()
            .block_on(judgment)
            .unwrap()
            .into_result()
            .unwrap();

        prop_assert_eq!(result.metadata.provider, ProviderKind::Offline);
        prop_assert_eq!(result.requirements.len(), requirements.len());
        prop_assert!(result.total_score <= result.max_score);
    }
}
