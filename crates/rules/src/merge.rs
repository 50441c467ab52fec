//! Rule merge identity and match clause union.

use std::collections::HashSet;

use pipedump_core::EntityIdentity;
use serde_json::{Map, Value};

use crate::error::{PipelineError, Result};
use crate::normalize::annotation_match_name;
use crate::schema::{MatchClause, MatchType, MatchValue, Rule};

/// Identity deciding whether two rules may be folded together.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RuleKey {
    /// The rule has no explicit match. Never merged.
    Default,
    /// Canonical config JSON plus the normalized match type.
    Keyed { config: String, match_type: MatchType },
}

impl RuleKey {
    pub fn is_mergeable(&self) -> bool {
        matches!(self, RuleKey::Keyed { .. })
    }
}

/// Merge identity of a rule.
pub fn rule_key(rule: &Rule) -> RuleKey {
    match &rule.match_clause {
        None => RuleKey::Default,
        Some(clause) => RuleKey::Keyed {
            config: canonical_json(&rule.action.config_value()),
            match_type: clause.match_type().normalized(),
        },
    }
}

fn sorted(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut out = Map::new();
            for key in keys {
                out.insert(key.clone(), sorted(&map[key]));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(sorted).collect()),
        other => other.clone(),
    }
}

/// Serialization with object keys in sorted order, so key order in the
/// source document never affects equality.
pub fn canonical_json(value: &Value) -> String {
    sorted(value).to_string()
}

fn union_by_key<T>(items: &mut Vec<T>, extra: Vec<T>, key: impl Fn(&T) -> String) {
    let mut seen: HashSet<String> = items.iter().map(&key).collect();
    for item in extra {
        if seen.insert(key(&item)) {
            items.push(item);
        }
    }
}

/// Union `source` into `target`, keyed by canonical item identity.
///
/// Both clauses are normalized to their `multi-*` form first. An absent
/// `source` returns `target` unchanged. Differing types fail with
/// [`PipelineError::MergeTypeMismatch`] naming `context`.
pub fn merge_matches(
    target: &MatchClause,
    source: Option<&MatchClause>,
    context: &str,
) -> Result<MatchClause> {
    let Some(source) = source else {
        return Ok(target.clone());
    };
    let target = target.normalized();
    let source = source.normalized();
    let (expected, found) = (target.match_type(), source.match_type());

    let value = match (target.value, source.value) {
        (MatchValue::MultiSource(mut items), MatchValue::MultiSource(extra)) => {
            union_by_key(&mut items, extra, |i| i.entity_key());
            MatchValue::MultiSource(items)
        }
        (MatchValue::MultiAnnotation(mut items), MatchValue::MultiAnnotation(extra)) => {
            union_by_key(&mut items, extra, annotation_match_name);
            MatchValue::MultiAnnotation(items)
        }
        _ => {
            return Err(PipelineError::MergeTypeMismatch {
                context: context.to_string(),
                expected: expected.to_string(),
                found: found.to_string(),
            })
        }
    };

    Ok(MatchClause {
        description: target.description,
        value,
    })
}
