//! Rule actions grouped under every match they apply to.

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;
use tracing::debug;

use super::ordering::compare_metadata_types;
use crate::normalize::EntityIndex;
use crate::schema::{ActionKind, PipelineDocument, Rule, RuleAction};

/// Metadata type → action descriptions produced by one rule.
pub type ActionMap = BTreeMap<String, BTreeSet<String>>;

const ENTITY_TAGS: &str = "entityTags";
const UNCLUSTER: &str = "uncluster";

/// Describe what a rule does, per metadata type.
pub fn rule_actions(rule: &Rule, index: &EntityIndex) -> ActionMap {
    let mut actions = ActionMap::new();
    match &rule.action {
        RuleAction::AssignStaticEntityMetadata(config) => {
            for metadata in &config.metadata {
                actions
                    .entry(metadata.metadata_type.clone())
                    .or_default()
                    .extend(metadata.items.iter().map(|item| index.describe(item)));
            }
        }
        RuleAction::ModifyStaticEntityTags(config) => {
            let tags = actions.entry(ENTITY_TAGS.to_string()).or_default();
            for tag in &config.entity_tags {
                let action = tag.action.unwrap_or_default();
                let relevance = match action {
                    ActionKind::Add => tag.relevance.unwrap_or_default().to_string(),
                    ActionKind::Remove => String::new(),
                };
                tags.insert(format!(
                    "{}[{}][{}]",
                    index.describe(&tag.entity),
                    action,
                    relevance
                ));
            }
        }
        RuleAction::ModifyDerivedMetadata(config) => {
            for metadata in &config.metadata {
                actions
                    .entry(metadata.metadata_type.clone())
                    .or_default()
                    .insert(format!("[Derived][{}]", metadata.action.unwrap_or_default()));
            }
        }
        RuleAction::Uncluster => {
            actions
                .entry(UNCLUSTER.to_string())
                .or_default()
                .insert(UNCLUSTER.to_string());
        }
    }
    actions
}

/// One report row: the actions applied under a single match description.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MatchRow {
    /// Entity key behind an entity match; `None` for annotations.
    pub entity_key: Option<String>,
    /// Metadata type → sorted descriptions, types in precedence order.
    pub actions: IndexMap<String, Vec<String>>,
}

/// Match description → [`MatchRow`], descriptions sorted lexicographically.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ByMatchReport {
    rows: IndexMap<String, MatchRow>,
}

impl ByMatchReport {
    pub fn rows(&self) -> impl Iterator<Item = (&str, &MatchRow)> {
        self.rows.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn get(&self, description: &str) -> Option<&MatchRow> {
        self.rows.get(description)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Every metadata type present in the report, in column order.
    pub fn metadata_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self
            .rows
            .values()
            .flat_map(|row| row.actions.keys().map(String::as_str))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        types.sort_by(|a, b| compare_metadata_types(a, b));
        types
    }
}

#[derive(Default)]
struct Accumulator {
    entity_key: Option<String>,
    actions: ActionMap,
}

/// Group every rule's actions under each of its effective matches.
///
/// A rule with no (or an empty) match of its own applies under its
/// document's default match. Output order depends only on content, never
/// on input document order.
pub fn aggregate_by_matches(docs: &[PipelineDocument], index: &EntityIndex) -> ByMatchReport {
    let mut acc: BTreeMap<String, Accumulator> = BTreeMap::new();

    for doc in docs {
        let defaults = index.match_entries(doc.match_clause.as_ref());
        for rule in &doc.rules {
            let own = index.match_entries(rule.match_clause.as_ref());
            let matches = if own.is_empty() { &defaults } else { &own };
            if matches.is_empty() {
                debug!(pipeline = %doc.label(), rule = %rule.name(), "rule has no effective match");
                continue;
            }

            let actions = rule_actions(rule, index);
            if actions.is_empty() {
                continue;
            }

            for entry in matches {
                let slot = acc.entry(entry.description.clone()).or_default();
                // Keep the smallest key so the choice does not depend on input order.
                slot.entity_key = slot
                    .entity_key
                    .take()
                    .into_iter()
                    .chain(entry.entity_key.clone())
                    .min();
                for (metadata_type, values) in &actions {
                    slot.actions
                        .entry(metadata_type.clone())
                        .or_default()
                        .extend(values.iter().cloned());
                }
            }
        }
    }

    let rows = acc
        .into_iter()
        .map(|(description, slot)| {
            let mut actions: Vec<(String, Vec<String>)> = slot
                .actions
                .into_iter()
                .map(|(t, values)| (t, values.into_iter().collect()))
                .collect();
            actions.sort_by(|(a, _), (b, _)| compare_metadata_types(a, b));
            (
                description,
                MatchRow {
                    entity_key: slot.entity_key,
                    actions: actions.into_iter().collect(),
                },
            )
        })
        .collect();

    ByMatchReport { rows }
}
