//! # codejudge-runtime
//!
//! Network-facing half of the AI judge pipeline.
//!
//! This crate builds bounded prompts from a submission, sends them to one
//! LLM provider, and hands the raw answer to `codejudge-core` for schema
//! validation and weighted scoring.
//!
//! ## Important
//!
//! The runtime performs exactly one provider call per judgment and never
//! retries. Callers that want retries or a deadline own that policy; see
//! [`JudgeOrchestrator::evaluate_with_deadline`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use codejudge_runtime::{JudgeOrchestrator, JudgeOutcome};
//!
//! let orchestrator = JudgeOrchestrator::from_env();
//! match orchestrator.evaluate(&rubric.judge, &rubric.requirements, &context).await? {
//!     JudgeOutcome::Judged(result) => store(result),
//!     JudgeOutcome::Disabled => {}
//! }
//! ```

pub mod config;
pub mod orchestrator;
pub mod prompts;
pub mod providers;

pub use config::{JudgeSettings, MissingCredentialPolicy, ProviderEndpoint};
pub use orchestrator::{JudgeError, JudgeOrchestrator, JudgeOutcome};
pub use providers::{
    AnthropicProvider, LlmProvider, OfflineProvider, OpenAiProvider, ProviderClient,
    ProviderError, ProviderResponse,
};
