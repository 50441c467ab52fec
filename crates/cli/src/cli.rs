use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;

/// Validate pipeline configuration and dump it as reports.
///
/// Loads pipeline and static metadata files, checks them against the
/// pipeline schema, resolves referenced entities, then writes a by-match
/// CSV and/or a merged by-action JSON pipeline.
#[derive(Parser, Debug, Default)]
#[command(name = "pipedump", about = "Validate and dump pipeline configuration")]
pub struct CliArgs {
    /// Pipeline files or directories to load (JSON or YAML)
    #[arg(short = 'f', long, env = "CONFIG_DUMP_FILENAME", value_delimiter = ',', num_args = 1..)]
    pub filename: Vec<PathBuf>,

    /// Static metadata files, one synthetic pipeline per entry
    #[arg(
        short = 's',
        long,
        env = "CONFIG_DUMP_STATICMETADATAFILE",
        value_delimiter = ',',
        num_args = 1..
    )]
    pub staticmetadatafile: Vec<PathBuf>,

    /// Control-plane pipeline ids (fetching is not supported)
    #[arg(short = 'p', long, env = "CONFIG_DUMP_PIPELINE", value_delimiter = ',', num_args = 1..)]
    pub pipeline: Vec<String>,

    /// By-match CSV report path
    #[arg(short = 'o', long, env = "CONFIG_DUMP_OUTFILE")]
    pub outfile: Option<PathBuf>,

    /// Merged by-action JSON pipeline path
    #[arg(short = 'j', long, env = "CONFIG_DUMP_JSONFILE")]
    pub jsonfile: Option<PathBuf>,

    /// JSON map of entity key (externalId/provider) to contributor
    #[arg(short = 'm', long, env = "CONFIG_DUMP_SOURCEMAP")]
    pub sourcemap: Option<PathBuf>,

    /// Skip the entity directory and use unresolved entities as-is
    #[arg(long, env = "CONFIG_DUMP_OFFLINE")]
    pub offline: bool,
}

impl CliArgs {
    /// Reject argument combinations before any file is read.
    pub fn check(&self) -> Result<()> {
        if self.filename.is_empty() && self.pipeline.is_empty() && self.staticmetadatafile.is_empty()
        {
            bail!("at least one of --filename, --pipeline or --staticmetadatafile is required");
        }
        if self.outfile.is_none() && self.jsonfile.is_none() {
            bail!("at least one of --outfile or --jsonfile is required");
        }
        if !self.pipeline.is_empty() {
            bail!(
                "fetching pipelines by id is not supported ({}); export them to files and use --filename",
                self.pipeline.join(", ")
            );
        }
        if self.sourcemap.is_some() && self.outfile.is_none() {
            tracing::warn!("--sourcemap only affects the CSV report and --outfile is not set");
        }
        Ok(())
    }
}
