use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static FTS_TYPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^fts_(?P<type>[a-z]+)_").expect("valid regex"));
static TYPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<type>[a-z]+)_").expect("valid regex"));

/// Fallback entity type when an external id carries no recognizable prefix.
pub const UNKNOWN_ENTITY_TYPE: &str = "unknown";

/// Raw entity reference as written in a pipeline document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub provider: String,
    #[serde(rename = "externalId")]
    pub external_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Entity record as returned by the entity directory.
///
/// Entities synthesized before resolution carry no `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub external_id: String,
    pub provider: String,
    pub name: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    pub type_display: String,
}

/// Anything that carries a canonical `externalId/provider` identity.
pub trait EntityIdentity {
    fn external_id(&self) -> &str;
    fn provider(&self) -> &str;

    /// Canonical lookup key: `<externalId>/<provider>`.
    fn entity_key(&self) -> String {
        format!("{}/{}", self.external_id(), self.provider())
    }
}

impl EntityIdentity for EntityRef {
    fn external_id(&self) -> &str {
        &self.external_id
    }

    fn provider(&self) -> &str {
        &self.provider
    }
}

impl EntityIdentity for Entity {
    fn external_id(&self) -> &str {
        &self.external_id
    }

    fn provider(&self) -> &str {
        &self.provider
    }
}

/// Canonical key of any identity-bearing value.
pub fn entity_key(item: &impl EntityIdentity) -> String {
    item.entity_key()
}

/// Best-effort entity type guess from an external id.
///
/// `fts_<type>_...` wins over the looser `<type>_...`; anything else is `"unknown"`.
pub fn type_from_external_id(external_id: &str) -> String {
    FTS_TYPE_RE
        .captures(external_id)
        .or_else(|| TYPE_RE.captures(external_id))
        .and_then(|caps| caps.name("type"))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| UNKNOWN_ENTITY_TYPE.to_string())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl Entity {
    /// Build an unresolved entity from a raw reference, guessing its type.
    pub fn synthesize(item: &EntityRef) -> Self {
        let entity_type = type_from_external_id(&item.external_id);
        Self {
            id: None,
            external_id: item.external_id.clone(),
            provider: item.provider.clone(),
            name: item
                .name
                .clone()
                .unwrap_or_else(|| item.external_id.clone()),
            type_display: capitalize(&entity_type),
            entity_type,
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "{} [{}][{}]", self.name, id, self.entity_type),
            None => write!(f, "{} [-][{}]", self.name, self.entity_type),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity_ref(external_id: &str, provider: &str, name: Option<&str>) -> EntityRef {
        EntityRef {
            provider: provider.to_string(),
            external_id: external_id.to_string(),
            name: name.map(str::to_string),
        }
    }

    #[test]
    fn key_ignores_name() {
        let a = entity_ref("e1", "p", Some("First"));
        let b = entity_ref("e1", "p", Some("Second"));
        assert_eq!(entity_key(&a), "e1/p");
        assert_eq!(entity_key(&a), entity_key(&b));
    }

    #[test]
    fn resolved_and_raw_keys_agree() {
        let raw = entity_ref("fts_jurisdiction_us", "fts", None);
        let resolved = Entity::synthesize(&raw);
        assert_eq!(raw.entity_key(), resolved.entity_key());
    }

    #[test]
    fn type_prefix_patterns() {
        assert_eq!(type_from_external_id("fts_agency_sec"), "agency");
        assert_eq!(type_from_external_id("doctype_rule"), "doctype");
        assert_eq!(type_from_external_id("fts_"), "fts");
        assert_eq!(type_from_external_id("SEC"), "unknown");
        assert_eq!(type_from_external_id("123_abc"), "unknown");
    }

    #[test]
    fn synthesize_defaults_name_and_display() {
        let entity = Entity::synthesize(&entity_ref("fts_agency_sec", "fts", None));
        assert_eq!(entity.name, "fts_agency_sec");
        assert_eq!(entity.entity_type, "agency");
        assert_eq!(entity.type_display, "Agency");
        assert_eq!(entity.id, None);
        assert_eq!(entity.to_string(), "fts_agency_sec [-][agency]");
    }

    #[test]
    fn resolved_entity_display() {
        let entity: Entity = serde_json::from_value(serde_json::json!({
            "id": 42,
            "external_id": "fts_jurisdiction_us",
            "provider": "fts",
            "name": "United States",
            "type": "jurisdiction",
            "type_display": "Jurisdiction",
        }))
        .unwrap();
        assert_eq!(entity.to_string(), "United States [42][jurisdiction]");
    }
}
