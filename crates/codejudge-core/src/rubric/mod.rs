//! Rubric loading and validation.
//!
//! A challenge version ships its judge configuration together with the
//! ordered requirement list. This module parses that pair from YAML or JSON
//! and enforces the invariants the aggregator depends on.

mod parser;

pub use parser::{validate_requirements, ChallengeRubric, RubricError};
