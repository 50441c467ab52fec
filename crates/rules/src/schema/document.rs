//! Pipeline documents: raw (as loaded) and typed (post-validation).

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{MatchClause, Rule};
use crate::error::{PipelineError, Result};

/// Pipeline identifier; the control plane uses numbers, hand-written files often strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PipelineId {
    Number(i64),
    Text(String),
}

impl fmt::Display for PipelineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineId::Number(n) => write!(f, "{}", n),
            PipelineId::Text(s) => f.write_str(s),
        }
    }
}

/// Diagnostic label shared by validation errors and aggregation failures.
pub fn pipeline_label(id: impl fmt::Display, filename: &str) -> String {
    format!("pipeline #{}, file {}", id, filename)
}

/// A pipeline document exactly as loaded, before the validation gate.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDocument {
    pub filename: String,
    pub body: Value,
}

impl SourceDocument {
    pub fn new(filename: impl Into<String>, body: Value) -> Self {
        Self {
            filename: filename.into(),
            body,
        }
    }

    /// Raw `id` rendered for diagnostics, `?` when absent.
    pub fn display_id(&self) -> String {
        match self.body.get("id") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => "?".to_string(),
            Some(other) => other.to_string(),
        }
    }

    pub fn label(&self) -> String {
        pipeline_label(self.display_id(), &self.filename)
    }

    /// Convert into the typed model. Rules are converted one by one so a
    /// failure names the offending rule index.
    pub fn parse(&self) -> Result<PipelineDocument> {
        let label = self.label();
        let structural = |rule: Option<usize>, detail: String| PipelineError::Structural {
            pipeline: label.clone(),
            rule,
            detail,
        };

        let mut body = self.body.clone();
        let rules = body
            .as_object_mut()
            .and_then(|o| o.remove("rules"))
            .unwrap_or_else(|| Value::Array(Vec::new()));

        let mut doc: PipelineDocument =
            serde_json::from_value(body).map_err(|e| structural(None, e.to_string()))?;

        let Value::Array(rules) = rules else {
            return Err(structural(None, "rules is not an array".to_string()));
        };
        doc.rules = rules
            .into_iter()
            .enumerate()
            .map(|(i, rule)| serde_json::from_value(rule).map_err(|e| structural(Some(i), e.to_string())))
            .collect::<Result<Vec<Rule>>>()?;
        doc.filename = Some(self.filename.clone());
        Ok(doc)
    }
}

/// Top-level configuration unit: default match plus an ordered rule list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineDocument {
    pub id: PipelineId,
    #[serde(rename = "apiVersion", default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(rename = "match", default, skip_serializing_if = "Option::is_none")]
    pub match_clause: Option<MatchClause>,
    #[serde(default)]
    pub rules: Vec<Rule>,
    /// Set by the loader; never part of serialized output.
    #[serde(skip)]
    pub filename: Option<String>,
}

impl PipelineDocument {
    pub fn label(&self) -> String {
        pipeline_label(&self.id, self.filename.as_deref().unwrap_or("?"))
    }

    /// The default match, treating an empty clause as absent.
    pub fn default_match(&self) -> Option<&MatchClause> {
        self.match_clause.as_ref().filter(|m| !m.is_empty())
    }
}
