//! Pipeline rules: a named action plus an optional override match.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{
    AssignStaticEntityMetadata, MatchClause, ModifyDerivedMetadata, ModifyStaticEntityTags,
};

/// The fixed set of rule names; each selects the shape of `config`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleName {
    AssignStaticEntityMetadata,
    ModifyDerivedMetadata,
    ModifyStaticEntityTags,
    Uncluster,
}

impl RuleName {
    pub const ALL: [RuleName; 4] = [
        RuleName::AssignStaticEntityMetadata,
        RuleName::ModifyDerivedMetadata,
        RuleName::ModifyStaticEntityTags,
        RuleName::Uncluster,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RuleName::AssignStaticEntityMetadata => "assign-static-entity-metadata",
            RuleName::ModifyDerivedMetadata => "modify-derived-metadata",
            RuleName::ModifyStaticEntityTags => "modify-static-entity-tags",
            RuleName::Uncluster => "uncluster",
        }
    }
}

impl fmt::Display for RuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleName {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        RuleName::ALL
            .into_iter()
            .find(|n| n.as_str() == s)
            .ok_or_else(|| format!("unknown rule name '{}'", s))
    }
}

/// Rule configuration, one variant per [`RuleName`].
#[derive(Debug, Clone, PartialEq)]
pub enum RuleAction {
    AssignStaticEntityMetadata(AssignStaticEntityMetadata),
    ModifyDerivedMetadata(ModifyDerivedMetadata),
    ModifyStaticEntityTags(ModifyStaticEntityTags),
    Uncluster,
}

impl RuleAction {
    pub fn name(&self) -> RuleName {
        match self {
            RuleAction::AssignStaticEntityMetadata(_) => RuleName::AssignStaticEntityMetadata,
            RuleAction::ModifyDerivedMetadata(_) => RuleName::ModifyDerivedMetadata,
            RuleAction::ModifyStaticEntityTags(_) => RuleName::ModifyStaticEntityTags,
            RuleAction::Uncluster => RuleName::Uncluster,
        }
    }

    /// The `config` payload as a JSON tree (`null` for `uncluster`).
    pub fn config_value(&self) -> serde_json::Value {
        match self {
            RuleAction::AssignStaticEntityMetadata(c) => serde_json::to_value(c),
            RuleAction::ModifyDerivedMetadata(c) => serde_json::to_value(c),
            RuleAction::ModifyStaticEntityTags(c) => serde_json::to_value(c),
            RuleAction::Uncluster => Ok(serde_json::Value::Null),
        }
        .unwrap_or_default()
    }

    fn from_config(name: RuleName, config: serde_json::Value) -> serde_json::Result<Self> {
        Ok(match name {
            RuleName::AssignStaticEntityMetadata => {
                RuleAction::AssignStaticEntityMetadata(serde_json::from_value(config)?)
            }
            RuleName::ModifyDerivedMetadata => {
                RuleAction::ModifyDerivedMetadata(serde_json::from_value(config)?)
            }
            RuleName::ModifyStaticEntityTags => {
                RuleAction::ModifyStaticEntityTags(serde_json::from_value(config)?)
            }
            RuleName::Uncluster => RuleAction::Uncluster,
        })
    }
}

/// A pipeline rule, serialized as `{name, description?, config, match?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRule", into = "RawRule")]
pub struct Rule {
    pub description: Option<String>,
    pub action: RuleAction,
    /// Overrides the owning document's default match when present and non-empty.
    pub match_clause: Option<MatchClause>,
}

#[derive(Serialize, Deserialize)]
struct RawRule {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default)]
    config: serde_json::Value,
    #[serde(rename = "match", default, skip_serializing_if = "Option::is_none")]
    match_clause: Option<MatchClause>,
}

impl TryFrom<RawRule> for Rule {
    type Error = String;

    fn try_from(raw: RawRule) -> std::result::Result<Self, Self::Error> {
        let name: RuleName = raw.name.parse()?;
        let action = RuleAction::from_config(name, raw.config)
            .map_err(|e| format!("invalid {} config: {}", name, e))?;
        Ok(Rule {
            description: raw.description,
            action,
            match_clause: raw.match_clause,
        })
    }
}

impl From<Rule> for RawRule {
    fn from(rule: Rule) -> Self {
        RawRule {
            name: rule.action.name().as_str().to_string(),
            description: rule.description,
            config: rule.action.config_value(),
            match_clause: rule.match_clause,
        }
    }
}

impl Rule {
    pub fn name(&self) -> RuleName {
        self.action.name()
    }
}
