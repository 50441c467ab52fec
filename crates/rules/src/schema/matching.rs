//! Match clauses: the entity or annotation condition selecting a pipeline.

use std::fmt;
use std::str::FromStr;

use pipedump_core::EntityRef;
use serde::{Deserialize, Serialize};

/// The four supported match clause shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchType {
    MultiSource,
    Source,
    MultiAnnotation,
    Annotation,
}

impl MatchType {
    pub const ALL: [MatchType; 4] = [
        MatchType::MultiSource,
        MatchType::Source,
        MatchType::MultiAnnotation,
        MatchType::Annotation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MatchType::MultiSource => "multi-source",
            MatchType::Source => "source",
            MatchType::MultiAnnotation => "multi-annotation",
            MatchType::Annotation => "annotation",
        }
    }

    /// Singular types map onto their `multi-*` counterparts.
    pub fn normalized(self) -> Self {
        match self {
            MatchType::Source | MatchType::MultiSource => MatchType::MultiSource,
            MatchType::Annotation | MatchType::MultiAnnotation => MatchType::MultiAnnotation,
        }
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        MatchType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown match type '{}'", s))
    }
}

/// An annotation produced upstream by document ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnnotationRef {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Typed payload of a match clause, one variant per [`MatchType`].
#[derive(Debug, Clone, PartialEq)]
pub enum MatchValue {
    MultiSource(Vec<EntityRef>),
    Source(EntityRef),
    MultiAnnotation(Vec<AnnotationRef>),
    Annotation(AnnotationRef),
}

/// A match clause, serialized as `{type, description?, value}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMatchClause", into = "RawMatchClause")]
pub struct MatchClause {
    pub description: Option<String>,
    pub value: MatchValue,
}

#[derive(Serialize, Deserialize)]
struct Items<T> {
    items: Vec<T>,
}

#[derive(Serialize, Deserialize)]
struct RawMatchClause {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    value: serde_json::Value,
}

impl TryFrom<RawMatchClause> for MatchClause {
    type Error = String;

    fn try_from(raw: RawMatchClause) -> std::result::Result<Self, Self::Error> {
        let kind: MatchType = raw.kind.parse()?;
        let value = match kind {
            MatchType::MultiSource => serde_json::from_value::<Items<EntityRef>>(raw.value)
                .map(|v| MatchValue::MultiSource(v.items)),
            MatchType::Source => serde_json::from_value(raw.value).map(MatchValue::Source),
            MatchType::MultiAnnotation => serde_json::from_value::<Items<AnnotationRef>>(raw.value)
                .map(|v| MatchValue::MultiAnnotation(v.items)),
            MatchType::Annotation => serde_json::from_value(raw.value).map(MatchValue::Annotation),
        }
        .map_err(|e| format!("invalid {} match value: {}", kind, e))?;
        Ok(MatchClause {
            description: raw.description,
            value,
        })
    }
}

impl From<MatchClause> for RawMatchClause {
    fn from(clause: MatchClause) -> Self {
        let kind = clause.match_type().as_str().to_string();
        let value = match clause.value {
            MatchValue::MultiSource(items) => serde_json::to_value(Items { items }),
            MatchValue::Source(item) => serde_json::to_value(item),
            MatchValue::MultiAnnotation(items) => serde_json::to_value(Items { items }),
            MatchValue::Annotation(item) => serde_json::to_value(item),
        }
        .unwrap_or_default();
        RawMatchClause {
            kind,
            description: clause.description,
            value,
        }
    }
}

impl MatchClause {
    pub fn match_type(&self) -> MatchType {
        match self.value {
            MatchValue::MultiSource(_) => MatchType::MultiSource,
            MatchValue::Source(_) => MatchType::Source,
            MatchValue::MultiAnnotation(_) => MatchType::MultiAnnotation,
            MatchValue::Annotation(_) => MatchType::Annotation,
        }
    }

    /// Rewrite singular clauses into the equivalent single-item `multi-*` form.
    pub fn normalized(&self) -> MatchClause {
        let value = match &self.value {
            MatchValue::Source(item) => MatchValue::MultiSource(vec![item.clone()]),
            MatchValue::Annotation(item) => MatchValue::MultiAnnotation(vec![item.clone()]),
            other => other.clone(),
        };
        MatchClause {
            description: self.description.clone(),
            value,
        }
    }

    /// Number of match items carried by the clause.
    pub fn len(&self) -> usize {
        match &self.value {
            MatchValue::MultiSource(items) => items.len(),
            MatchValue::MultiAnnotation(items) => items.len(),
            MatchValue::Source(_) | MatchValue::Annotation(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
