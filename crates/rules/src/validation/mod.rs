//! Schema validation of raw pipeline documents with structured errors and suggestions.
//!
//! Walks every document of a set against the [`schema()`](crate::definition::schema)
//! model and accumulates path-tagged errors. Nothing short-circuits: the set
//! is valid only when the full error list is empty.

mod walker;

pub mod fuzzy;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;

use crate::definition::{schema, type_name, Scope};
use crate::schema::SourceDocument;

// ── Result types ────────────────────────────────────────────────────

/// Overall validation outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
}

/// A single schema violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Document prefix plus dotted location, e.g.
    /// `"pipeline #7, file a.json.rules[0].config.metadata[1].metadataType"`.
    pub path: String,
    pub message: String,
    /// Optional "did you mean …?" suggestion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation error: {}: {}", self.path, self.message)?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, " ({})", suggestion)?;
        }
        Ok(())
    }
}

impl ValidationResult {
    pub(crate) fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    pub(crate) fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.valid = false;
        self.errors.push(ValidationError {
            path: path.into(),
            message: message.into(),
            suggestion: None,
        });
    }

    pub(crate) fn error_with_suggestion(
        &mut self,
        path: impl Into<String>,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) {
        self.valid = false;
        self.errors.push(ValidationError {
            path: path.into(),
            message: message.into(),
            suggestion: Some(suggestion.into()),
        });
    }

    /// Report every error to the log sink, in document order.
    pub fn log_errors(&self) {
        for e in &self.errors {
            error!(path = %e.path, suggestion = ?e.suggestion, "{}", e.message);
        }
        if !self.valid {
            error!(count = self.errors.len(), "pipeline configuration is invalid");
        }
    }
}

// ── Public API ──────────────────────────────────────────────────────

/// Validate one raw document, appending to `result`.
fn validate_into(doc: &SourceDocument, result: &mut ValidationResult) {
    let prefix = doc.label();
    let model = schema();

    let Value::Object(body) = &doc.body else {
        result.error(
            prefix,
            format!(
                "Invalid value type \"{}\" for pipeline document.  Must be \"object\".",
                type_name(&doc.body)
            ),
        );
        return;
    };

    walker::check_node(body, &model.pipeline_def, &Scope::root(body), &prefix, result);
}

/// Validate a single raw document.
pub fn validate_document(doc: &SourceDocument) -> ValidationResult {
    let mut result = ValidationResult::new();
    validate_into(doc, &mut result);
    result
}

/// Validate a whole document set. Errors keep document order.
pub fn validate_documents(docs: &[SourceDocument]) -> ValidationResult {
    let mut result = ValidationResult::new();
    for doc in docs {
        validate_into(doc, &mut result);
    }
    result
}
