//! Report writers: by-match CSV and merged-pipeline JSON.

mod csv_report;
mod source_map;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::error::{PipelineError, Result};
use crate::schema::PipelineDocument;

pub use csv_report::{write_csv, write_csv_to};
pub use source_map::SourceMap;

pub(crate) fn create(path: &Path) -> Result<BufWriter<File>> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Write the merged pipeline as pretty-printed JSON.
pub fn write_json(path: &Path, doc: &PipelineDocument) -> Result<()> {
    let mut out = create(path)?;
    serde_json::to_writer_pretty(&mut out, doc)?;
    out.write_all(b"\n")
        .and_then(|_| out.flush())
        .map_err(|source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    info!(path = %path.display(), rules = doc.rules.len(), "wrote merged pipeline");
    Ok(())
}
