//! Error types for loading, validating and aggregating pipeline documents.

use std::path::PathBuf;

/// Errors that can occur while processing a pipeline document set.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Filesystem I/O error, tagged with the offending file.
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON parse/serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parse error.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// CSV writer error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A file could not be parsed into a document.
    #[error("failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    /// The validation gate rejected the document set.
    #[error("{0} validation error(s) in pipeline configuration")]
    Invalid(usize),

    /// A match type or rule name the engine does not recognize.
    #[error("{detail} in {pipeline}{}", rule_suffix(.rule))]
    Structural {
        pipeline: String,
        rule: Option<usize>,
        detail: String,
    },

    /// Two merge-equivalent rules disagree on their match clause type.
    #[error("cannot merge {found} match into {expected} match ({context})")]
    MergeTypeMismatch {
        context: String,
        expected: String,
        found: String,
    },

    /// Unsupported input source or malformed auxiliary document.
    #[error("{0}")]
    Document(String),
}

fn rule_suffix(rule: &Option<usize>) -> String {
    rule.map(|r| format!(", rules[{r}]")).unwrap_or_default()
}

/// Result alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
