//! Rule-type specific `config` payloads.

use std::fmt;

use pipedump_core::EntityRef;
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::definition::integral;

/// Whether a tag or derived value is added or removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    #[default]
    Add,
    Remove,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Add => write!(f, "add"),
            ActionKind::Remove => write!(f, "remove"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relevance {
    #[default]
    High,
    Medium,
    Low,
}

impl fmt::Display for Relevance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relevance::High => write!(f, "high"),
            Relevance::Medium => write!(f, "medium"),
            Relevance::Low => write!(f, "low"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentType {
    Formatted,
    Result,
}

// ── assign-static-entity-metadata ───────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignStaticEntityMetadata {
    pub metadata: Vec<StaticMetadata>,
}

/// Entities assigned verbatim under one metadata type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticMetadata {
    #[serde(rename = "metadataType")]
    pub metadata_type: String,
    pub items: Vec<EntityRef>,
}

// ── modify-static-entity-tags ───────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifyStaticEntityTags {
    #[serde(rename = "entityTags")]
    pub entity_tags: Vec<EntityTag>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityTag {
    #[serde(flatten)]
    pub entity: EntityRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<ActionKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance: Option<Relevance>,
}

// ── modify-derived-metadata ─────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifyDerivedMetadata {
    pub derive: Vec<DeriveStep>,
    pub metadata: Vec<DerivedMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maps: Option<Vec<EntityMap>>,
}

/// One function application in a derivation chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeriveStep {
    pub function: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<FunctionArg>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionArg {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetadata {
    #[serde(rename = "metadataType")]
    pub metadata_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<ActionKind>,
    #[serde(
        rename = "assignmentType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub assignment_type: Option<AssignmentType>,
    #[serde(
        default,
        deserialize_with = "integral_offset",
        skip_serializing_if = "Option::is_none"
    )]
    pub offset: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formats: Option<Vec<String>>,
}

/// `offset` is written as `5` or `5.0` alike.
fn integral_offset<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u8>, D::Error> {
    let Some(n) = Option::<serde_json::Number>::deserialize(deserializer)? else {
        return Ok(None);
    };
    integral(&n)
        .and_then(|v| u8::try_from(v).ok())
        .map(Some)
        .ok_or_else(|| de::Error::custom(format!("invalid offset {}", n)))
}

/// Named text-to-entity lookup table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMap {
    pub name: String,
    pub map: Vec<EntityMapEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMapEntry {
    #[serde(flatten)]
    pub entity: EntityRef,
    pub text: Vec<String>,
}
