//! Core [`PipelineLoader`]: reads raw pipeline documents from disk.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info};

use super::result::{LoadResult, LoadStatus};
use super::static_metadata::static_metadata_documents;
use crate::error::{PipelineError, Result};
use crate::schema::SourceDocument;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Yaml,
}

impl Format {
    fn of(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Some(Format::Json),
            Some("yml") | Some("yaml") => Some(Format::Yaml),
            _ => None,
        }
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> PipelineError + '_ {
    move |source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Collects raw documents from pipeline and static metadata files.
///
/// Documents keep load order, which is the order validation errors are
/// reported in. Any unreadable or unparsable file aborts the load.
#[derive(Debug, Default)]
pub struct PipelineLoader {
    documents: Vec<SourceDocument>,
    results: Vec<LoadResult>,
}

impl PipelineLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one file into a JSON tree. YAML is chosen by extension;
    /// anything else is read as JSON.
    pub fn read_value(path: &Path) -> Result<Value> {
        let contents = fs::read_to_string(path).map_err(io_error(path))?;
        let parsed = match Format::of(path).unwrap_or(Format::Json) {
            Format::Json => serde_json::from_str(&contents).map_err(|e| e.to_string()),
            Format::Yaml => serde_yaml::from_str(&contents).map_err(|e| e.to_string()),
        };
        parsed.map_err(|message| PipelineError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Load pipeline files. Directories are scanned recursively for
    /// `*.json` / `*.yml` / `*.yaml` files in name order.
    pub fn load_files(&mut self, paths: &[PathBuf]) -> Result<()> {
        for path in paths {
            if path.is_dir() {
                self.scan_dir(path)?;
            } else {
                self.load_pipeline_file(path)?;
            }
        }
        Ok(())
    }

    /// Load static metadata files, each expanding into one document per entry.
    pub fn load_static_metadata_files(&mut self, paths: &[PathBuf]) -> Result<()> {
        for path in paths {
            let value = Self::read_value(path)?;
            let docs = static_metadata_documents(&path.display().to_string(), value)?;
            info!(path = %path.display(), count = docs.len(), "loaded static metadata");
            self.results.push(LoadResult {
                path: path.clone(),
                status: LoadStatus::Loaded {
                    documents: docs.len(),
                },
            });
            self.documents.extend(docs);
        }
        Ok(())
    }

    fn load_pipeline_file(&mut self, path: &Path) -> Result<()> {
        let body = Self::read_value(path)?;
        let doc = SourceDocument::new(path.display().to_string(), body);
        info!(pipeline = %doc.display_id(), path = %path.display(), "loaded pipeline");
        self.documents.push(doc);
        self.results.push(LoadResult {
            path: path.to_path_buf(),
            status: LoadStatus::Loaded { documents: 1 },
        });
        Ok(())
    }

    fn skip(&mut self, path: PathBuf, reason: &str) {
        debug!(path = %path.display(), reason, "skipped file");
        self.results.push(LoadResult {
            path,
            status: LoadStatus::Skipped {
                reason: reason.to_string(),
            },
        });
    }

    fn scan_dir(&mut self, dir: &Path) -> Result<()> {
        let mut entries = fs::read_dir(dir)
            .map_err(io_error(dir))?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<PathBuf>>>()
            .map_err(io_error(dir))?;
        entries.sort();

        for path in entries {
            let hidden = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with('.'));
            if hidden {
                if path.is_file() {
                    self.skip(path, "dotfile");
                }
                continue;
            }

            if path.is_dir() {
                self.scan_dir(&path)?;
                continue;
            }

            if Format::of(&path).is_none() {
                self.skip(path, "not a pipeline file");
                continue;
            }

            self.load_pipeline_file(&path)?;
        }
        Ok(())
    }

    pub fn documents(&self) -> &[SourceDocument] {
        &self.documents
    }

    pub fn results(&self) -> &[LoadResult] {
        &self.results
    }

    pub fn into_documents(self) -> Vec<SourceDocument> {
        self.documents
    }
}
