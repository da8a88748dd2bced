//! Normalized facts handed to the engine by the extraction layer.
//!
//! The engine never reads source files itself; a language-specific extractor
//! produces one [`FileFacts`] per file and the engine works from those alone.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// A raw import specifier and the 1-based line it appears on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportFact {
    pub specifier: String,
    pub line: usize,
}

/// Length record for one function or method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionFact {
    pub name: String,
    pub start_line: usize,
    pub line_count: usize,
}

/// Everything the extraction layer reports about a single file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFacts {
    pub path: String,
    #[serde(default)]
    pub imports: Vec<ImportFact>,
    #[serde(default)]
    pub functions: Vec<FunctionFact>,
}

impl FileFacts {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            imports: Vec::new(),
            functions: Vec::new(),
        }
    }

    pub fn with_import(mut self, specifier: &str, line: usize) -> Self {
        self.imports.push(ImportFact {
            specifier: specifier.to_string(),
            line,
        });
        self
    }

    pub fn with_function(mut self, name: &str, start_line: usize, line_count: usize) -> Self {
        self.functions.push(FunctionFact {
            name: name.to_string(),
            start_line,
            line_count,
        });
        self
    }
}

/// The full fact set for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactSet {
    #[serde(default)]
    pub files: Vec<FileFacts>,
}

impl FactSet {
    pub fn new(files: Vec<FileFacts>) -> Self {
        Self { files }
    }

    /// Load a fact set from a JSON facts file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read facts file '{}'", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("failed to parse facts file '{}'", path.display()))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let facts: FactSet = serde_json::from_str(content)?;
        Ok(facts)
    }
}
