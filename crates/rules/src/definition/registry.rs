//! The static schema of pipeline documents, built once on first use.

use std::sync::{Arc, LazyLock};

use super::{Definition, Facet, FieldDef, OneOf, Shape};
use crate::schema::{MatchType, RuleName};

// ── Vocabularies ────────────────────────────────────────────────────

/// Annotation names a match may test.
pub const ANNOTATION_NAMES: &[&str] = &[
    "matched.document-ingestion.fintechstudios.com/channel-id",
    "matched.document-ingestion.fintechstudios.com/document-id",
    "matched.document-ingestion.fintechstudios.com/source-id",
];

/// Functions available to `modify-derived-metadata` derivation steps.
pub const DERIVE_FUNCTIONS: &[&str] = &[
    "createEntity",
    "federalRegisterIssuingAgencies",
    "federalRegisterNoticesIssuingAgencies",
    "federalRegisterDocTypes",
    "federalRegisterExecutiveOfficeDocTypes",
    "federalRegisterNoticesDocTypes",
    "findEntities",
    "format",
    "regex",
    "setVariable",
    "source",
    "split",
    "sublist",
    "textToEntityMap",
    "trim",
];

/// Argument names accepted by each derivation function.
const FUNCTION_ARGS: &[(&str, &[&str])] = &[
    (
        "createEntity",
        &[
            "type",
            "typeDisplay",
            "name",
            "externalId",
            "provider",
            "allowMissingVariables",
            "keepPartial",
        ],
    ),
    ("federalRegisterIssuingAgencies", &[]),
    ("federalRegisterNoticesIssuingAgencies", &[]),
    ("federalRegisterDocTypes", &[]),
    ("federalRegisterExecutiveOfficeDocTypes", &[]),
    ("federalRegisterNoticesDocTypes", &[]),
    ("findEntities", &["entityTypes"]),
    ("format", &["template", "allowMissingVariables", "keepPartial"]),
    ("regex", &["command", "regex", "replacement"]),
    ("setVariable", &["name", "value"]),
    ("source", &["sourceName"]),
    ("split", &["delimiter"]),
    ("sublist", &["start", "end"]),
    ("textToEntityMap", &["mapName", "entityTypes"]),
    ("trim", &[]),
];

/// Arguments whose values are themselves enumerated.
const ARG_VALUES: &[(&str, &[&str])] = &[
    ("command", &["match", "replace", "removeOnNoMatch", "removeOnMatch"]),
    ("sourceName", &["url", "title", "fullText", "summary"]),
];

/// Metadata types a derivation may write.
pub const DERIVED_METADATA_TYPES: &[&str] = &[
    "cik",
    "docCitations",
    "docNumber",
    "docSummary",
    "docTypes",
    "filedAs",
    "filingDate",
    "filingType",
    "issuingAgencies",
    "jurisdictions",
    "publicationDate",
    "volumeNumber",
    "volumes",
];

const ACTIONS: &[&str] = &["add", "remove"];
const ASSIGNMENT_TYPES: &[&str] = &["formatted", "result"];
const RELEVANCES: &[&str] = &["high", "medium", "low"];

/// Functions that work without arguments.
fn args_optional(function: &str) -> bool {
    function == "trim" || function.starts_with("federalRegister")
}

// ── Model ───────────────────────────────────────────────────────────

/// Root definitions for the validated node kinds.
#[derive(Debug)]
pub struct SchemaModel {
    /// A whole document: `{id, apiVersion?, description?, active?, match?, rules}`.
    pub pipeline_def: Arc<Definition>,
    /// A match clause: `{type, description?, value}`.
    pub match_def: Arc<Definition>,
    /// A rule: `{name, description?, config, match?}`.
    pub rule_def: Arc<Definition>,
}

static SCHEMA: LazyLock<SchemaModel> = LazyLock::new(SchemaModel::build);

/// The process-wide schema, immutable after first use.
pub fn schema() -> &'static SchemaModel {
    &SCHEMA
}

fn entity_def() -> Definition {
    Definition::new()
        .field("provider", FieldDef::string().required())
        .field("externalId", FieldDef::string().required())
        .field("name", FieldDef::string())
}

fn annotation_def() -> Definition {
    Definition::new()
        .field(
            "name",
            FieldDef::string()
                .required()
                .one_of(Facet::Direct(OneOf::strings(ANNOTATION_NAMES))),
        )
        .field("value", FieldDef::string().required())
        .field("description", FieldDef::string())
}

fn items_of(def: Definition) -> Definition {
    Definition::new().field(
        "items",
        FieldDef::array(Facet::Direct(Shape::fields(def))).required(),
    )
}

fn match_def() -> Definition {
    let shapes = [
        (MatchType::MultiSource, items_of(entity_def())),
        (MatchType::Source, entity_def()),
        (MatchType::MultiAnnotation, items_of(annotation_def())),
        (MatchType::Annotation, annotation_def()),
    ];
    let type_names: Vec<&'static str> = MatchType::ALL.iter().map(|t| t.as_str()).collect();

    Definition::new()
        .field(
            "type",
            FieldDef::string()
                .required()
                .one_of(Facet::Direct(OneOf::Strings(type_names))),
        )
        .field("description", FieldDef::string())
        .field(
            "value",
            FieldDef::object(Facet::keyed(
                "type",
                shapes
                    .into_iter()
                    .map(|(t, def)| (t.as_str(), Shape::fields(def))),
            ))
            .required(),
        )
}

fn assign_static_entity_metadata_def() -> Definition {
    let metadata = Definition::new()
        .field("metadataType", FieldDef::string().required())
        .field(
            "items",
            FieldDef::array(Facet::Direct(Shape::fields(entity_def()))).required(),
        );
    Definition::new().field(
        "metadata",
        FieldDef::array(Facet::Direct(Shape::fields(metadata))).required(),
    )
}

fn modify_derived_metadata_def() -> Definition {
    let arg = Definition::new()
        .field(
            "name",
            FieldDef::string().required().one_of(Facet::keyed(
                "function",
                FUNCTION_ARGS
                    .iter()
                    .map(|(function, args)| (*function, OneOf::strings(args))),
            )),
        )
        .field(
            "value",
            FieldDef::string().required().one_of(Facet::keyed(
                "name",
                ARG_VALUES
                    .iter()
                    .map(|(name, values)| (*name, OneOf::strings(values))),
            )),
        );

    let step = Definition::new()
        .field(
            "function",
            FieldDef::string()
                .required()
                .one_of(Facet::Direct(OneOf::strings(DERIVE_FUNCTIONS))),
        )
        .field(
            "args",
            FieldDef::array(Facet::Direct(Shape::fields(arg))).required_when(Facet::keyed(
                "function",
                DERIVE_FUNCTIONS.iter().map(|f| (*f, !args_optional(f))),
            )),
        );

    let metadata = Definition::new()
        .field(
            "metadataType",
            FieldDef::string()
                .required()
                .one_of(Facet::Direct(OneOf::strings(DERIVED_METADATA_TYPES))),
        )
        .field(
            "action",
            FieldDef::string().one_of(Facet::Direct(OneOf::strings(ACTIONS))),
        )
        .field(
            "assignmentType",
            FieldDef::string().one_of(Facet::Direct(OneOf::strings(ASSIGNMENT_TYPES))),
        )
        .field(
            "offset",
            FieldDef::number().one_of(Facet::Direct(OneOf::Integers((0..=9).collect()))),
        )
        .field("formats", FieldDef::string_array());

    let map_entry = Definition::new()
        .extend(&entity_def())
        .field("text", FieldDef::string_array().required());
    let map = Definition::new()
        .field("name", FieldDef::string().required())
        .field(
            "map",
            FieldDef::array(Facet::Direct(Shape::fields(map_entry))).required(),
        );

    Definition::new()
        .field(
            "derive",
            FieldDef::array(Facet::Direct(Shape::fields(step))).required(),
        )
        .field(
            "metadata",
            FieldDef::array(Facet::Direct(Shape::fields(metadata))).required(),
        )
        .field("maps", FieldDef::array(Facet::Direct(Shape::fields(map))))
}

fn modify_static_entity_tags_def() -> Definition {
    let tag = Definition::new()
        .extend(&entity_def())
        .field(
            "action",
            FieldDef::string().one_of(Facet::Direct(OneOf::strings(ACTIONS))),
        )
        .field(
            "relevance",
            FieldDef::string().one_of(Facet::Direct(OneOf::strings(RELEVANCES))),
        );
    Definition::new().field(
        "entityTags",
        FieldDef::array(Facet::Direct(Shape::fields(tag))).required(),
    )
}

fn rule_shape(name: RuleName) -> Shape {
    match name {
        RuleName::AssignStaticEntityMetadata => Shape::fields(assign_static_entity_metadata_def()),
        RuleName::ModifyDerivedMetadata => Shape::fields(modify_derived_metadata_def()),
        RuleName::ModifyStaticEntityTags => Shape::fields(modify_static_entity_tags_def()),
        RuleName::Uncluster => Shape::Empty,
    }
}

fn rule_def(match_def: &Arc<Definition>) -> Definition {
    let rule_names: Vec<&'static str> = RuleName::ALL.iter().map(|n| n.as_str()).collect();

    Definition::new()
        .field(
            "name",
            FieldDef::string()
                .required()
                .one_of(Facet::Direct(OneOf::Strings(rule_names))),
        )
        .field("description", FieldDef::string())
        .field(
            "config",
            FieldDef::object(Facet::keyed(
                "name",
                RuleName::ALL.into_iter().map(|n| (n.as_str(), rule_shape(n))),
            ))
            .required(),
        )
        .field(
            "match",
            FieldDef::object(Facet::Direct(Shape::Fields(Arc::clone(match_def)))),
        )
}

fn pipeline_def(match_def: &Arc<Definition>, rule_def: &Arc<Definition>) -> Definition {
    Definition::new()
        .field("id", FieldDef::identifier().required())
        .field("apiVersion", FieldDef::string())
        .field("description", FieldDef::string())
        .field("active", FieldDef::boolean())
        .field(
            "match",
            FieldDef::object(Facet::Direct(Shape::Fields(Arc::clone(match_def))))
                .nullable()
                .reported_as("Default Match"),
        )
        .field(
            "rules",
            FieldDef::array(Facet::Direct(Shape::Fields(Arc::clone(rule_def)))).required(),
        )
}

impl SchemaModel {
    fn build() -> Self {
        let match_def = Arc::new(match_def());
        let rule_def = Arc::new(rule_def(&match_def));
        let pipeline_def = Arc::new(pipeline_def(&match_def, &rule_def));
        Self {
            pipeline_def,
            match_def,
            rule_def,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::definition::{FieldType, Scope};

    #[test]
    fn config_shape_selected_by_rule_name() {
        let model = schema();
        let config = model.rule_def.get("config").unwrap();
        assert_eq!(config.field_type, FieldType::Object);

        let rule = json!({"name": "modify-static-entity-tags"});
        let scope = Scope::root(rule.as_object().unwrap());
        match config.def.as_ref().unwrap().resolve(&scope).unwrap() {
            Shape::Fields(def) => assert_eq!(def.names(), vec!["entityTags"]),
            Shape::Empty => panic!("expected fields"),
        }

        let rule = json!({"name": "uncluster"});
        let scope = Scope::root(rule.as_object().unwrap());
        assert!(matches!(
            config.def.as_ref().unwrap().resolve(&scope),
            Some(Shape::Empty)
        ));
    }

    #[test]
    fn pipeline_envelope_fields() {
        let model = schema();
        assert_eq!(
            model.pipeline_def.names(),
            vec!["id", "apiVersion", "description", "active", "match", "rules"]
        );
        let default_match = model.pipeline_def.get("match").unwrap();
        assert!(default_match.nullable);
        assert_eq!(default_match.path_segment("match"), "Default Match");
        assert_eq!(
            model.pipeline_def.get("active").unwrap().field_type,
            FieldType::Boolean
        );
    }

    #[test]
    fn args_requirement_depends_on_function() {
        assert!(args_optional("trim"));
        assert!(args_optional("federalRegisterDocTypes"));
        assert!(!args_optional("split"));
    }

    #[test]
    fn every_function_has_an_argument_set() {
        for function in DERIVE_FUNCTIONS {
            assert!(
                FUNCTION_ARGS.iter().any(|(f, _)| f == function),
                "missing args for {function}"
            );
        }
    }
}
