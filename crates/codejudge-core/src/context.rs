//! Helpers for building a [`CodeContext`] from a submission's file manifest.

use std::path::Path;

use crate::types::{CodeContext, CodeFile, CodeMetadata};

/// Map a file path to a language tag by extension.
///
/// Unknown or missing extensions map to `"text"`.
pub fn language_for_path(path: &str) -> &'static str {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("rs") => "rust",
        Some("ts") | Some("tsx") => "typescript",
        Some("js") | Some("jsx") | Some("mjs") | Some("cjs") => "javascript",
        Some("py") => "python",
        Some("go") => "go",
        Some("java") => "java",
        Some("kt") | Some("kts") => "kotlin",
        Some("c") | Some("h") => "c",
        Some("cc") | Some("cpp") | Some("cxx") | Some("hpp") => "cpp",
        Some("cs") => "csharp",
        Some("rb") => "ruby",
        Some("php") => "php",
        Some("swift") => "swift",
        Some("sol") => "solidity",
        Some("html") | Some("htm") => "html",
        Some("css") | Some("scss") => "css",
        Some("json") => "json",
        Some("yaml") | Some("yml") => "yaml",
        Some("toml") => "toml",
        Some("md") => "markdown",
        Some("sh") | Some("bash") => "shell",
        Some("sql") => "sql",
        _ => "text",
    }
}

impl CodeFile {
    /// Create a file entry, inferring `language` from the path.
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        let path = path.into();
        let language = language_for_path(&path).to_string();
        Self {
            path,
            content: content.into(),
            language,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

impl CodeContext {
    pub fn new(files: Vec<CodeFile>) -> Self {
        Self {
            files,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: CodeMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Total characters across all file contents, before any truncation.
    pub fn total_chars(&self) -> usize {
        self.files.iter().map(|f| f.content.chars().count()).sum()
    }
}
