//! Entity extraction and canonical keys for match items.

use std::collections::HashMap;

use indexmap::IndexMap;
use pipedump_core::{type_from_external_id, Entity, EntityIdentity, EntityRef};

use crate::schema::{AnnotationRef, MatchClause, MatchValue, PipelineDocument, Rule, RuleAction};

/// Human-readable surrogate key of an annotation match item:
/// `"<description> [<value>][<last segment of name>]"`.
///
/// Items without a description use their value in its place.
pub fn annotation_match_name(item: &AnnotationRef) -> String {
    let segment = item.name.rsplit('/').next().unwrap_or(&item.name);
    format!(
        "{} [{}][{}]",
        item.description.as_deref().unwrap_or(&item.value),
        item.value,
        segment
    )
}

/// Entity references implied by a match clause. Annotations carry none.
pub fn entities_from_match(clause: &MatchClause) -> Vec<&EntityRef> {
    match &clause.value {
        MatchValue::MultiSource(items) => items.iter().collect(),
        MatchValue::Source(item) => vec![item],
        MatchValue::MultiAnnotation(_) | MatchValue::Annotation(_) => Vec::new(),
    }
}

/// Entity references embedded in a rule's action configuration.
pub fn entities_from_rule(rule: &Rule) -> Vec<&EntityRef> {
    match &rule.action {
        RuleAction::AssignStaticEntityMetadata(config) => config
            .metadata
            .iter()
            .flat_map(|m| m.items.iter())
            .collect(),
        RuleAction::ModifyStaticEntityTags(config) => {
            config.entity_tags.iter().map(|t| &t.entity).collect()
        }
        RuleAction::ModifyDerivedMetadata(config) => config
            .maps
            .iter()
            .flatten()
            .flat_map(|m| m.map.iter().map(|e| &e.entity))
            .collect(),
        RuleAction::Uncluster => Vec::new(),
    }
}

/// Every entity referenced by a document set, synthesized ahead of
/// resolution and keyed by `entity_key`.
///
/// A key seen again overwrites the earlier entity but keeps its position.
pub fn unresolved_entities(docs: &[PipelineDocument]) -> IndexMap<String, Entity> {
    let mut entities = IndexMap::new();
    let mut collect = |refs: Vec<&EntityRef>| {
        for item in refs {
            entities.insert(item.entity_key(), Entity::synthesize(item));
        }
    };

    for doc in docs {
        if let Some(clause) = &doc.match_clause {
            collect(entities_from_match(clause));
        }
        for rule in &doc.rules {
            if let Some(clause) = &rule.match_clause {
                collect(entities_from_match(clause));
            }
            collect(entities_from_rule(rule));
        }
    }
    entities
}

/// Merge identity of every item in a clause: `entity_key` for entities,
/// [`annotation_match_name`] for annotations.
pub fn match_keys(clause: &MatchClause) -> Vec<String> {
    match &clause.value {
        MatchValue::MultiSource(items) => items.iter().map(|i| i.entity_key()).collect(),
        MatchValue::Source(item) => vec![item.entity_key()],
        MatchValue::MultiAnnotation(items) => items.iter().map(annotation_match_name).collect(),
        MatchValue::Annotation(item) => vec![annotation_match_name(item)],
    }
}

/// A match rendered for reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchEntry {
    pub description: String,
    /// Set for entity matches; used to attach contributors.
    pub entity_key: Option<String>,
}

/// Resolved entities keyed by `entity_key`.
#[derive(Debug, Clone, Default)]
pub struct EntityIndex {
    entities: HashMap<String, Entity>,
}

impl EntityIndex {
    pub fn from_resolved(resolved: impl IntoIterator<Item = Entity>) -> Self {
        Self {
            entities: resolved
                .into_iter()
                .map(|e| (e.entity_key(), e))
                .collect(),
        }
    }

    pub fn get(&self, item: &impl EntityIdentity) -> Option<&Entity> {
        self.entities.get(&item.entity_key())
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Keys of `wanted` that the directory did not return.
    pub fn missing<'a>(&self, wanted: &'a IndexMap<String, Entity>) -> Vec<&'a str> {
        wanted
            .keys()
            .filter(|k| !self.entities.contains_key(k.as_str()))
            .map(String::as_str)
            .collect()
    }

    /// `"<name> [<id>][<type>]"` for a resolved entity, a placeholder
    /// naming the guessed type otherwise.
    pub fn describe(&self, item: &EntityRef) -> String {
        match self.get(item) {
            Some(entity) => entity.to_string(),
            None => format!(
                "{} [unresolved][{}]",
                item.name.as_deref().unwrap_or(&item.external_id),
                type_from_external_id(&item.external_id)
            ),
        }
    }

    /// Report entries for a clause, deduplicated by description in
    /// first-seen order. An absent clause yields nothing.
    pub fn match_entries(&self, clause: Option<&MatchClause>) -> Vec<MatchEntry> {
        let Some(clause) = clause else {
            return Vec::new();
        };
        let entries: Vec<MatchEntry> = match &clause.value {
            MatchValue::MultiSource(items) => items.iter().map(|i| self.entity_entry(i)).collect(),
            MatchValue::Source(item) => vec![self.entity_entry(item)],
            MatchValue::MultiAnnotation(items) => items.iter().map(annotation_entry).collect(),
            MatchValue::Annotation(item) => vec![annotation_entry(item)],
        };

        let mut seen = std::collections::HashSet::new();
        entries
            .into_iter()
            .filter(|e| seen.insert(e.description.clone()))
            .collect()
    }

    fn entity_entry(&self, item: &EntityRef) -> MatchEntry {
        MatchEntry {
            description: self.describe(item),
            entity_key: Some(item.entity_key()),
        }
    }
}

fn annotation_entry(item: &AnnotationRef) -> MatchEntry {
    MatchEntry {
        description: annotation_match_name(item),
        entity_key: None,
    }
}
