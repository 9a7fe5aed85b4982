//! Judge prompts.
//!
//! Two pure builders:
//! 1. System prompt - judging constraints, the rubric, and the exact response
//!    schema the validator enforces
//! 2. User prompt - the rubric again plus a bounded view of the submission
//!
//! Code is untrusted and unbounded, so the user prompt truncates silently:
//! at most [`MAX_FILES`] files, [`MAX_FILE_CHARS`] characters per file and
//! [`MAX_OUTPUT_CHARS`] characters of build or test output.

use codejudge_core::{CodeContext, JudgeConfig, Requirement, RESPONSE_SCHEMA_JSON};

/// Files included in the user prompt, in artifact order.
pub const MAX_FILES: usize = 20;

/// Characters kept from each file.
pub const MAX_FILE_CHARS: usize = 5000;

/// Characters kept from build output and from test output.
pub const MAX_OUTPUT_CHARS: usize = 1000;

/// Base system prompt shared by every judgment.
///
/// Frames the model as a rubric executor. It scores only what the rubric
/// names and must answer with the schema appended below it.
pub const BASE_SYSTEM_PROMPT: &str = r#"
You are a strict code judge evaluating a submission against a fixed rubric.

## Judging Constraints
1. Evaluate ONLY the requirements and criteria you are given - do not invent criteria
2. Score each requirement from 0 to 100 and each criterion from 0 to 100
3. Report confidence from 0.0 to 1.0 for each requirement
4. Cite evidence (file paths or short code excerpts) wherever you can
5. Use each requirement id exactly once, spelled exactly as given
6. Do not execute code; judge only what you can read

## Output Rules
- Respond with a single JSON object and nothing else
- No markdown fences, no commentary before or after the object
- Numbers must stay inside their ranges; out-of-range values are rejected
"#;

/// Build the system prompt.
///
/// `system_prompt_override` is returned verbatim when set.
pub fn build_system_prompt(config: &JudgeConfig, requirements: &[Requirement]) -> String {
    if let Some(prompt) = &config.system_prompt_override {
        return prompt.clone();
    }

    let mut out = String::from(BASE_SYSTEM_PROMPT.trim_start());

    out.push_str("\n## Rubric\n");
    for req in requirements {
        out.push_str(&format!("\n### {} (id: {})\n", req.title, req.id));
        if !req.description.is_empty() {
            out.push_str(&format!("{}\n", req.description));
        }
        for criterion in &req.criteria {
            out.push_str(&format!("- {}\n", criterion));
        }
    }

    out.push_str("\n## Response Schema (JSON Schema)\n");
    out.push_str(RESPONSE_SCHEMA_JSON.trim_end());
    out.push('\n');

    out
}

/// Build the user prompt: requirements, metadata, then files.
pub fn build_user_prompt(requirements: &[Requirement], context: &CodeContext) -> String {
    let mut out = String::from("## Requirements\n");

    for req in requirements {
        out.push_str(&format!(
            "\n### {} (id: {}, weight: {})\n",
            req.title, req.id, req.weight
        ));
        if !req.description.is_empty() {
            out.push_str(&format!("{}\n", req.description));
        }
        if !req.criteria.is_empty() {
            out.push_str("Criteria:\n");
            for criterion in &req.criteria {
                out.push_str(&format!("- {}\n", criterion));
            }
        }
        if !req.evidence_types.is_empty() {
            let evidence = req.evidence_types.join(", ");
            out.push_str(&format!("Evidence types: {}\n", evidence));
        }
    }

    if let Some(meta) = &context.metadata {
        out.push_str("\n## Metadata\n");
        if let Some(framework) = &meta.framework {
            out.push_str(&format!("Framework: {}\n", framework));
        }
        if let Some(language) = &meta.language {
            out.push_str(&format!("Language: {}\n", language));
        }
        if let Some(build) = &meta.build_output {
            let build = truncate_chars(build, MAX_OUTPUT_CHARS);
            out.push_str(&format!("Build output:\n```\n{}\n```\n", build));
        }
        if let Some(tests) = &meta.test_output {
            let tests = truncate_chars(tests, MAX_OUTPUT_CHARS);
            out.push_str(&format!("Test output:\n```\n{}\n```\n", tests));
        }
    }

    let shown = context.files.len().min(MAX_FILES);
    out.push_str(&format!("\n## Files ({} of {})\n", shown, context.files.len()));
    for file in context.files.iter().take(MAX_FILES) {
        out.push_str(&format!(
            "\n### File: {} ({})\n```{}\n{}\n```\n",
            file.path,
            file.language,
            file.language,
            truncate_chars(&file.content, MAX_FILE_CHARS)
        ));
    }

    out
}

/// First `max` characters of `s` (not bytes).
fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
