//! JSON Schema for the judge response.
//!
//! The same bytes are embedded in the system prompt and compiled here, so the
//! shape the model is told to emit is exactly the shape that is accepted.

use std::sync::OnceLock;

use serde_json::Value;

use super::SchemaError;

/// Embedded response schema (loaded at compile time).
pub const RESPONSE_SCHEMA_JSON: &str =
    include_str!("../../../../schema/judge-response.schema.json");

/// Compiled validator (initialized once, reused).
static COMPILED_SCHEMA: OnceLock<Result<jsonschema::Validator, String>> = OnceLock::new();

fn get_validator() -> Result<&'static jsonschema::Validator, SchemaError> {
    let result = COMPILED_SCHEMA.get_or_init(|| {
        let schema_value: Value = serde_json::from_str(RESPONSE_SCHEMA_JSON)
            .map_err(|e| format!("Invalid schema JSON: {}", e))?;

        jsonschema::options()
            .build(&schema_value)
            .map_err(|e| format!("Failed to compile schema: {}", e))
    });

    match result {
        Ok(v) => Ok(v),
        Err(e) => Err(SchemaError::SchemaUnavailable(e.clone())),
    }
}

/// Check a parsed response against the schema, stopping at the first violation.
pub(crate) fn check_response_schema(value: &Value) -> Result<(), SchemaError> {
    let validator = get_validator()?;

    if let Some(error) = validator.iter_errors(value).next() {
        let mut path = error.instance_path.to_string();
        if path.is_empty() {
            path.push('/');
        }
        return Err(SchemaError::Violation {
            path,
            message: error.to_string(),
        });
    }

    Ok(())
}
