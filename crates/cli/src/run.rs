use anyhow::{Context, Result};
use pipedump_core::DirectoryConfig;
use pipedump_directory::create_resolver;
use pipedump_rules::aggregate::{aggregate_by_actions, aggregate_by_matches};
use pipedump_rules::error::PipelineError;
use pipedump_rules::loader::PipelineLoader;
use pipedump_rules::normalize::{unresolved_entities, EntityIndex};
use pipedump_rules::report::{write_csv, write_json, SourceMap};
use pipedump_rules::schema::PipelineDocument;
use pipedump_rules::validation::validate_documents;
use tracing::{info, warn};

use crate::cli::CliArgs;

/// Load → validate → resolve → aggregate → write.
pub async fn run(args: &CliArgs, config: &DirectoryConfig) -> Result<()> {
    args.check()?;

    let sources = args
        .sourcemap
        .as_deref()
        .map(SourceMap::load)
        .transpose()
        .context("failed to load source map")?;

    let mut loader = PipelineLoader::new();
    loader
        .load_files(&args.filename)
        .context("failed to load pipeline files")?;
    loader
        .load_static_metadata_files(&args.staticmetadatafile)
        .context("failed to load static metadata files")?;
    info!(documents = loader.documents().len(), "pipeline documents loaded");

    let validation = validate_documents(loader.documents());
    if !validation.valid {
        validation.log_errors();
        return Err(PipelineError::Invalid(validation.errors.len()).into());
    }

    let docs = loader
        .documents()
        .iter()
        .map(|doc| doc.parse())
        .collect::<Result<Vec<PipelineDocument>, _>>()?;

    let wanted = unresolved_entities(&docs);
    let resolver = create_resolver(config, args.offline)?;
    info!(resolver = resolver.name(), entities = wanted.len(), "resolving entities");
    let resolved = resolver
        .resolve(wanted.values().cloned().collect())
        .await
        .context("entity resolution failed")?;

    let index = EntityIndex::from_resolved(resolved);
    let missing = index.missing(&wanted);
    if !missing.is_empty() {
        warn!(count = missing.len(), entities = ?missing, "entities not resolved by directory");
    }

    if let Some(outfile) = &args.outfile {
        let report = aggregate_by_matches(&docs, &index);
        write_csv(outfile, &report, sources.as_ref())?;
    }

    if let Some(jsonfile) = &args.jsonfile {
        let merged = aggregate_by_actions(&docs)?;
        write_json(jsonfile, &merged)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn data_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data")
    }

    fn config() -> DirectoryConfig {
        DirectoryConfig::from_lookup("", |_| None).unwrap()
    }

    #[tokio::test]
    async fn offline_run_writes_both_reports() {
        let out = tempfile::tempdir().unwrap();
        let args = CliArgs {
            filename: vec![data_dir().join("pipelines/examples")],
            staticmetadatafile: vec![data_dir().join("static-metadata/jurisdictions.json")],
            outfile: Some(out.path().join("by-match.csv")),
            jsonfile: Some(out.path().join("merged.json")),
            sourcemap: Some(data_dir().join("sourcemap.json")),
            offline: true,
            ..Default::default()
        };

        run(&args, &config()).await.unwrap();

        let csv = std::fs::read_to_string(out.path().join("by-match.csv")).unwrap();
        assert!(csv.starts_with("Match,Contributor,jurisdictions,"));
        let merged: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(out.path().join("merged.json")).unwrap())
                .unwrap();
        assert!(merged["rules"].as_array().is_some_and(|r| !r.is_empty()));
    }

    #[tokio::test]
    async fn invalid_documents_stop_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = dir.path().join("broken.json");
        std::fs::write(
            &pipeline,
            r#"{"id": 1, "rules": [{"name": "uncluster", "config": null, "mtach": {}}]}"#,
        )
        .unwrap();
        let outfile = dir.path().join("out.csv");
        let args = CliArgs {
            filename: vec![pipeline],
            outfile: Some(outfile.clone()),
            offline: true,
            ..Default::default()
        };

        let err = run(&args, &config()).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::Invalid(1))
        ));
        assert!(!outfile.exists());
    }

    #[tokio::test]
    async fn online_run_needs_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let args = CliArgs {
            filename: vec![data_dir().join("pipelines/examples")],
            jsonfile: Some(dir.path().join("merged.json")),
            ..Default::default()
        };
        let err = run(&args, &config()).await.unwrap_err();
        assert!(err.to_string().contains("FTS_API_USERNAME"));
    }
}
