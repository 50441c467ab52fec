//! By-match CSV: one row per match, one column per metadata type.

use std::io::Write;
use std::path::Path;

use tracing::info;

use super::{create, SourceMap};
use crate::aggregate::ByMatchReport;
use crate::error::Result;

const MATCH_COLUMN: &str = "Match";
const CONTRIBUTOR_COLUMN: &str = "Contributor";
const VALUE_SEPARATOR: &str = "; ";

/// Write the report as CSV to any writer.
///
/// Columns are `Match`, `Contributor` (only with a source map), then every
/// metadata type in precedence order. Cells join their values with `"; "`.
pub fn write_csv_to<W: Write>(
    writer: W,
    report: &ByMatchReport,
    sources: Option<&SourceMap>,
) -> Result<()> {
    let types = report.metadata_types();
    let mut out = csv::Writer::from_writer(writer);

    let mut header = vec![MATCH_COLUMN];
    if sources.is_some() {
        header.push(CONTRIBUTOR_COLUMN);
    }
    header.extend(types.iter().copied());
    out.write_record(&header)?;

    for (description, row) in report.rows() {
        let mut record = vec![description.to_string()];
        if let Some(sources) = sources {
            let contributor = row
                .entity_key
                .as_deref()
                .and_then(|key| sources.contributor(key))
                .unwrap_or_default();
            record.push(contributor.to_string());
        }
        for metadata_type in &types {
            record.push(
                row.actions
                    .get(*metadata_type)
                    .map(|values| values.join(VALUE_SEPARATOR))
                    .unwrap_or_default(),
            );
        }
        out.write_record(&record)?;
    }

    out.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Write the report as CSV to `path`.
pub fn write_csv(path: &Path, report: &ByMatchReport, sources: Option<&SourceMap>) -> Result<()> {
    write_csv_to(create(path)?, report, sources)?;
    info!(path = %path.display(), rows = report.len(), "wrote by-match report");
    Ok(())
}
