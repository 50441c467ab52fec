//! Fold a pipeline set into one document, merging equivalent rules.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::merge::{merge_matches, rule_key, RuleKey};
use crate::schema::{MatchClause, PipelineDocument, Rule};

/// Merge all documents into one pipeline.
///
/// `apiVersion`, `id` and `description` come from the first document. The
/// first non-empty default match seeds the merged default; later defaults
/// are unioned into it. Rules sharing a [`RuleKey::Keyed`] identity are
/// folded into the first occurrence; rules without an explicit match are
/// kept as they are. Output rules keep first-appearance order.
pub fn aggregate_by_actions(docs: &[PipelineDocument]) -> Result<PipelineDocument> {
    let first = docs
        .first()
        .ok_or_else(|| PipelineError::Document("no pipelines to aggregate".to_string()))?;

    let mut default_match: Option<MatchClause> = None;
    let mut rules: Vec<Rule> = Vec::new();
    let mut positions: HashMap<RuleKey, usize> = HashMap::new();

    for doc in docs {
        let label = doc.label();

        if let Some(clause) = doc.default_match() {
            default_match = Some(match default_match.take() {
                None => clause.clone(),
                Some(current) => merge_matches(&current, Some(clause), &label)?,
            });
        }

        for (i, rule) in doc.rules.iter().enumerate() {
            let key = rule_key(rule);
            let existing = match &key {
                RuleKey::Default => None,
                RuleKey::Keyed { .. } => positions.get(&key).copied(),
            };

            match existing {
                Some(pos) => {
                    let merged = match &rules[pos].match_clause {
                        Some(current) => merge_matches(
                            current,
                            rule.match_clause.as_ref(),
                            &format!("{}, rules[{}]", label, i),
                        )?,
                        None => continue,
                    };
                    debug!(pipeline = %label, rule = i, into = pos, "merged rule");
                    rules[pos].match_clause = Some(merged);
                }
                None => {
                    if key.is_mergeable() {
                        positions.insert(key, rules.len());
                    }
                    rules.push(rule.clone());
                }
            }
        }
    }

    Ok(PipelineDocument {
        id: first.id.clone(),
        api_version: first.api_version.clone(),
        description: first.description.clone(),
        active: None,
        match_clause: default_match,
        rules,
        filename: None,
    })
}
