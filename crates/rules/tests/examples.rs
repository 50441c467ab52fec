//! Integration tests over the example pipelines in `data/pipelines/examples/`:
//! load, validate, resolve offline, then aggregate both ways.

use std::path::PathBuf;

use pipedump_rules::aggregate::{aggregate_by_actions, aggregate_by_matches};
use pipedump_rules::loader::PipelineLoader;
use pipedump_rules::normalize::{match_keys, unresolved_entities, EntityIndex};
use pipedump_rules::report::{write_csv_to, SourceMap};
use pipedump_rules::schema::{MatchType, PipelineDocument, RuleName};
use pipedump_rules::validation::validate_documents;

/// Resolve the data directory relative to the workspace root.
/// Integration tests run from the crate directory, so we go up two levels.
fn data_dir() -> PathBuf {
    let manifest = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest.join("../../data")
}

fn load_examples() -> Vec<PipelineDocument> {
    let mut loader = PipelineLoader::new();
    loader
        .load_files(&[data_dir().join("pipelines/examples")])
        .unwrap_or_else(|e| panic!("Failed to load examples: {}", e));

    let result = validate_documents(loader.documents());
    assert!(result.valid, "example errors: {:#?}", result.errors);

    loader
        .documents()
        .iter()
        .map(|d| d.parse().unwrap_or_else(|e| panic!("Failed to parse {}: {}", d.filename, e)))
        .collect()
}

fn offline_index(docs: &[PipelineDocument]) -> EntityIndex {
    EntityIndex::from_resolved(unresolved_entities(docs).into_values())
}

#[test]
fn examples_load_in_name_order() {
    let docs = load_examples();
    let ids: Vec<String> = docs.iter().map(|d| d.id.to_string()).collect();
    assert_eq!(ids, vec!["103", "101", "102"]);
    assert!(docs[0].filename.as_deref().unwrap().ends_with("federal-register.yml"));
}

#[test]
fn example_entities_are_collected_once() {
    let docs = load_examples();
    let entities = unresolved_entities(&docs);

    assert!(entities.contains_key("fts_doctype_rule/fts"));
    assert!(entities.contains_key("fts_source_sec_speeches/fts"));
    let us = &entities["fts_jurisdiction_us_federal/fts"];
    assert_eq!(us.name, "United States Federal");
    assert_eq!(us.entity_type, "jurisdiction");
    assert_eq!(us.type_display, "Jurisdiction");
    assert_eq!(
        entities.keys().filter(|k| k.as_str() == "fts_topic_enforcement/fts").count(),
        1
    );
}

#[test]
fn examples_by_match() {
    let docs = load_examples();
    let report = aggregate_by_matches(&docs, &offline_index(&docs));

    let edgar = report.get("SEC EDGAR [-][source]").expect("edgar row");
    let types: Vec<&str> = edgar.actions.keys().map(String::as_str).collect();
    assert_eq!(types, vec!["jurisdictions", "issuingAgencies", "docNumber"]);
    assert_eq!(
        edgar.actions["issuingAgencies"],
        vec!["Securities and Exchange Commission [-][agency]"]
    );

    let litigation = report.get("SEC Litigation [-][source]").expect("litigation row");
    assert_eq!(litigation.actions["uncluster"], vec!["uncluster"]);

    let press = report
        .get("SEC press releases [press-releases][channel-id]")
        .expect("press row");
    assert_eq!(
        press.actions["entityTags"],
        vec!["Enforcement [-][topic][add][medium]"]
    );

    // The newsroom default match has no default-matched rules.
    assert!(report.get("SEC Newsroom [-][source]").is_none());
}

#[test]
fn examples_by_action() {
    let docs = load_examples();
    let merged = aggregate_by_actions(&docs).unwrap();

    assert_eq!(merged.id.to_string(), "103");
    assert_eq!(merged.rules.len(), 6);

    let default = merged.match_clause.as_ref().unwrap();
    assert_eq!(default.match_type(), MatchType::MultiSource);
    assert_eq!(
        match_keys(default),
        vec![
            "fts_source_federal_register/fts",
            "fts_source_sec_edgar/fts",
            "fts_source_sec_news/fts",
        ]
    );

    let tags = merged
        .rules
        .iter()
        .find(|r| r.name() == RuleName::ModifyStaticEntityTags)
        .unwrap();
    assert_eq!(tags.match_clause.as_ref().unwrap().len(), 2);

    let uncluster = merged
        .rules
        .iter()
        .find(|r| r.name() == RuleName::Uncluster)
        .unwrap();
    assert_eq!(
        match_keys(uncluster.match_clause.as_ref().unwrap()),
        vec!["fts_source_sec_litigation/fts", "fts_source_sec_speeches/fts"]
    );
}

#[test]
fn static_metadata_example_validates() {
    let mut loader = PipelineLoader::new();
    loader
        .load_static_metadata_files(&[data_dir().join("static-metadata/jurisdictions.json")])
        .unwrap();
    assert!(validate_documents(loader.documents()).valid);

    let doc = loader.documents()[0].parse().unwrap();
    assert_eq!(doc.rules[0].name(), RuleName::AssignStaticEntityMetadata);
    assert_eq!(doc.default_match().unwrap().len(), 2);
}

#[test]
fn examples_csv_with_contributors() {
    let docs = load_examples();
    let report = aggregate_by_matches(&docs, &offline_index(&docs));
    let sources = SourceMap::load(&data_dir().join("sourcemap.json")).unwrap();

    let mut buf = Vec::new();
    write_csv_to(&mut buf, &report, Some(&sources)).unwrap();
    let csv = String::from_utf8(buf).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("Match,Contributor,jurisdictions,issuingAgencies,docTypes,docNumber,uncluster,entityTags")
    );
    assert!(csv.contains("\nSEC EDGAR [-][source],Filings team,"));
    assert!(csv.contains("\nFederal Register [-][source],Filings team,"));
}
