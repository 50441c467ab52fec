//! Tests for the by-match and by-action aggregators.

use pipedump_core::Entity;
use proptest::prelude::*;
use serde_json::{json, Value};

use super::*;
use crate::error::PipelineError;
use crate::normalize::{match_keys, EntityIndex};
use crate::schema::{MatchType, PipelineDocument};

fn pipeline(filename: &str, value: Value) -> PipelineDocument {
    let mut doc: PipelineDocument = serde_json::from_value(value).unwrap();
    doc.filename = Some(filename.to_string());
    doc
}

fn entity(id: i64, external_id: &str, name: &str, entity_type: &str) -> Entity {
    Entity {
        id: Some(id),
        external_id: external_id.to_string(),
        provider: "fts".to_string(),
        name: name.to_string(),
        entity_type: entity_type.to_string(),
        type_display: entity_type.to_string(),
    }
}

fn index() -> EntityIndex {
    EntityIndex::from_resolved(vec![
        entity(1, "fts_source_edgar", "EDGAR", "source"),
        entity(2, "fts_source_fedreg", "Federal Register", "source"),
        entity(10, "fts_jurisdiction_us", "United States", "jurisdiction"),
        entity(20, "fts_agency_sec", "SEC", "agency"),
    ])
}

fn src(external_id: &str) -> Value {
    json!({"provider": "fts", "externalId": external_id})
}

fn sec_pipeline() -> PipelineDocument {
    pipeline(
        "sec.json",
        json!({
            "id": 12,
            "apiVersion": "v1",
            "description": "SEC",
            "match": {"type": "multi-source", "value": {"items": [src("fts_source_edgar")]}},
            "rules": [
                {
                    "name": "assign-static-entity-metadata",
                    "config": {"metadata": [
                        {"metadataType": "jurisdictions", "items": [src("fts_jurisdiction_us")]},
                        {"metadataType": "customTopic", "items": [src("fts_topic_ai")]}
                    ]}
                },
                {
                    "name": "modify-static-entity-tags",
                    "config": {"entityTags": [
                        {"provider": "fts", "externalId": "fts_agency_sec", "relevance": "low"},
                        {"provider": "fts", "externalId": "fts_jurisdiction_us", "action": "remove", "relevance": "low"}
                    ]},
                    "match": {
                        "type": "annotation",
                        "description": "ignored",
                        "value": {
                            "name": "matched.document-ingestion.fintechstudios.com/channel-id",
                            "value": "press",
                            "description": "Press releases"
                        }
                    }
                },
                {
                    "name": "modify-derived-metadata",
                    "config": {
                        "derive": [{"function": "trim"}],
                        "metadata": [{"metadataType": "docNumber"}, {"metadataType": "docNumber", "action": "remove"}]
                    }
                },
                {"name": "uncluster", "config": null}
            ]
        }),
    )
}

fn fedreg_pipeline() -> PipelineDocument {
    pipeline(
        "fedreg.json",
        json!({
            "id": 13,
            "match": {"type": "source", "value": src("fts_source_fedreg")},
            "rules": [
                {
                    "name": "assign-static-entity-metadata",
                    "config": {"metadata": [
                        {"metadataType": "jurisdictions", "items": [src("fts_jurisdiction_us")]},
                        {"metadataType": "issuingAgencies", "items": [src("fts_agency_sec")]}
                    ]}
                },
                {
                    "name": "modify-static-entity-tags",
                    "config": {"entityTags": []},
                    "match": {"type": "multi-source", "value": {"items": []}}
                }
            ]
        }),
    )
}

// ── by-match ────────────────────────────────────────────────────────

#[test]
fn rules_fall_back_to_default_match() {
    let report = aggregate_by_matches(&[sec_pipeline()], &index());

    let edgar = report.get("EDGAR [1][source]").unwrap();
    assert_eq!(edgar.entity_key.as_deref(), Some("fts_source_edgar/fts"));
    let types: Vec<&str> = edgar.actions.keys().map(String::as_str).collect();
    assert_eq!(types, vec!["jurisdictions", "docNumber", "uncluster", "customTopic"]);
    assert_eq!(edgar.actions["jurisdictions"], vec!["United States [10][jurisdiction]"]);
    assert_eq!(edgar.actions["docNumber"], vec!["[Derived][add]", "[Derived][remove]"]);
    assert_eq!(edgar.actions["uncluster"], vec!["uncluster"]);
    assert_eq!(
        edgar.actions["customTopic"],
        vec!["fts_topic_ai [unresolved][topic]"]
    );
}

#[test]
fn annotation_match_rows_carry_tag_actions() {
    let report = aggregate_by_matches(&[sec_pipeline()], &index());
    let press = report.get("Press releases [press][channel-id]").unwrap();
    assert_eq!(press.entity_key, None);
    assert_eq!(
        press.actions["entityTags"],
        vec![
            "SEC [20][agency][add][low]",
            "United States [10][jurisdiction][remove][]",
        ]
    );
    assert_eq!(report.len(), 2);
}

#[test]
fn empty_rule_match_uses_default_and_empty_actions_still_count() {
    let report = aggregate_by_matches(&[fedreg_pipeline()], &index());
    assert_eq!(report.len(), 1);
    let row = report.get("Federal Register [2][source]").unwrap();
    let types: Vec<&str> = row.actions.keys().map(String::as_str).collect();
    assert_eq!(types, vec!["jurisdictions", "issuingAgencies", "entityTags"]);
    assert!(row.actions["entityTags"].is_empty());
}

#[test]
fn unlisted_metadata_types_sort_after_listed_columns() {
    let report = aggregate_by_matches(&[fedreg_pipeline(), sec_pipeline()], &index());
    assert_eq!(
        report.metadata_types(),
        vec![
            "jurisdictions",
            "issuingAgencies",
            "docNumber",
            "uncluster",
            "entityTags",
            "customTopic",
        ]
    );
    let rows: Vec<&str> = report.rows().map(|(d, _)| d).collect();
    assert_eq!(
        rows,
        vec![
            "EDGAR [1][source]",
            "Federal Register [2][source]",
            "Press releases [press][channel-id]",
        ]
    );
}

#[test]
fn rule_without_any_match_contributes_nothing() {
    let doc = pipeline("bare.json", json!({"id": 1, "rules": [{"name": "uncluster", "config": null}]}));
    assert!(aggregate_by_matches(&[doc], &index()).is_empty());
}

#[test]
fn explicit_source_match_yields_single_key() {
    let doc = pipeline(
        "one.json",
        json!({
            "id": 5,
            "rules": [{
                "name": "uncluster",
                "config": null,
                "match": {"type": "source", "value": {"provider": "p", "externalId": "e1"}}
            }]
        }),
    );
    let clause = doc.rules[0].match_clause.as_ref().unwrap();
    assert_eq!(match_keys(clause), vec!["e1/p"]);

    let report = aggregate_by_matches(&[doc], &index());
    let (description, row) = report.rows().next().unwrap();
    assert_eq!(description, "e1 [unresolved][unknown]");
    assert_eq!(row.entity_key.as_deref(), Some("e1/p"));
}

proptest! {
    #[test]
    fn by_match_ignores_document_order(
        order in Just(vec![0usize, 1, 2]).prop_shuffle()
    ) {
        let third = pipeline(
            "third.json",
            json!({
                "id": 14,
                "match": {"type": "multi-source", "value": {"items": [src("fts_source_edgar"), src("fts_source_fedreg")]}},
                "rules": [{
                    "name": "modify-static-entity-tags",
                    "config": {"entityTags": [{"provider": "fts", "externalId": "fts_agency_sec", "action": "add"}]}
                }]
            }),
        );
        let docs = [sec_pipeline(), fedreg_pipeline(), third];
        let baseline = aggregate_by_matches(&docs, &index());
        let permuted: Vec<PipelineDocument> = order.iter().map(|&i| docs[i].clone()).collect();
        prop_assert_eq!(aggregate_by_matches(&permuted, &index()), baseline);
    }
}

// ── by-action ───────────────────────────────────────────────────────

fn static_rule_pipeline(id: i64, filename: &str, items: &[&str]) -> PipelineDocument {
    let items: Vec<Value> = items.iter().map(|i| src(i)).collect();
    pipeline(
        filename,
        json!({
            "id": id,
            "apiVersion": "v1",
            "description": format!("pipeline {id}"),
            "rules": [{
                "name": "assign-static-entity-metadata",
                "config": {"metadata": [{"metadataType": "jurisdictions", "items": [src("fts_jurisdiction_us")]}]},
                "match": {"type": "multi-source", "value": {"items": items}}
            }]
        }),
    )
}

#[test]
fn disjoint_matches_are_unioned() {
    let docs = [
        static_rule_pipeline(1, "a.json", &["fts_source_a", "fts_source_b"]),
        static_rule_pipeline(2, "b.json", &["fts_source_c"]),
    ];
    let merged = aggregate_by_actions(&docs).unwrap();
    assert_eq!(merged.rules.len(), 1);
    let clause = merged.rules[0].match_clause.as_ref().unwrap();
    assert_eq!(
        match_keys(clause),
        vec!["fts_source_a/fts", "fts_source_b/fts", "fts_source_c/fts"]
    );
    assert_eq!(merged.id, docs[0].id);
    assert_eq!(merged.description.as_deref(), Some("pipeline 1"));
    assert_eq!(merged.filename, None);
}

#[test]
fn overlapping_matches_are_not_duplicated() {
    let docs = [
        static_rule_pipeline(1, "a.json", &["fts_source_a", "fts_source_b"]),
        static_rule_pipeline(2, "b.json", &["fts_source_b", "fts_source_c"]),
    ];
    let merged = aggregate_by_actions(&docs).unwrap();
    assert_eq!(merged.rules.len(), 1);
    assert_eq!(merged.rules[0].match_clause.as_ref().unwrap().len(), 3);
}

#[test]
fn single_pipeline_round_trips() {
    let doc = sec_pipeline();
    let merged = aggregate_by_actions(std::slice::from_ref(&doc)).unwrap();
    assert_eq!(merged.rules.len(), doc.rules.len());
    for rule in &doc.rules {
        assert!(merged.rules.contains(rule), "missing {:?}", rule);
    }
    assert_eq!(merged.match_clause, doc.match_clause);

    let json = serde_json::to_value(&merged).unwrap();
    assert!(json.get("filename").is_none());
    assert_eq!(json["apiVersion"], "v1");
}

#[test]
fn rules_without_explicit_match_are_never_merged() {
    let docs = [fedreg_pipeline(), fedreg_pipeline()];
    let merged = aggregate_by_actions(&docs).unwrap();
    // The static rule is default-matched and kept twice; the tag rule is keyed and folded.
    assert_eq!(merged.rules.len(), 3);
}

#[test]
fn default_matches_are_merged_across_pipelines() {
    let merged = aggregate_by_actions(&[fedreg_pipeline(), sec_pipeline()]).unwrap();
    let clause = merged.match_clause.unwrap();
    assert_eq!(clause.match_type(), MatchType::MultiSource);
    assert_eq!(
        match_keys(&clause),
        vec!["fts_source_fedreg/fts", "fts_source_edgar/fts"]
    );
    assert_eq!(merged.id, fedreg_pipeline().id);
}

#[test]
fn default_match_type_mismatch_is_fatal() {
    let annotated = pipeline(
        "notes.json",
        json!({
            "id": 20,
            "match": {"type": "annotation", "value": {
                "name": "matched.document-ingestion.fintechstudios.com/source-id",
                "value": "9"
            }},
            "rules": []
        }),
    );
    let err = aggregate_by_actions(&[sec_pipeline(), annotated]).unwrap_err();
    match err {
        PipelineError::MergeTypeMismatch { context, expected, found } => {
            assert_eq!(context, "pipeline #20, file notes.json");
            assert_eq!(expected, "multi-source");
            assert_eq!(found, "multi-annotation");
        }
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn empty_input_is_an_error() {
    assert!(matches!(
        aggregate_by_actions(&[]),
        Err(PipelineError::Document(_))
    ));
}
