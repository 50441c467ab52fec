//! Static metadata files: entity assignments keyed by a match, without a
//! full pipeline around them.
//!
//! Each entry `{id, description?, match, metadata}` becomes a pipeline with a
//! single `assign-static-entity-metadata` rule, so it passes through the same
//! validation gate as hand-written pipelines.

use serde_json::{json, Map, Value};

use crate::error::{PipelineError, Result};
use crate::schema::{RuleName, SourceDocument};

fn entry_document(filename: &str, index: usize, entry: Value) -> Result<SourceDocument> {
    let Value::Object(mut entry) = entry else {
        return Err(PipelineError::Document(format!(
            "static metadata entry {} in {} is not an object",
            index, filename
        )));
    };

    let description = entry.remove("description");
    let mut rule = Map::new();
    rule.insert(
        "name".to_string(),
        Value::String(RuleName::AssignStaticEntityMetadata.as_str().to_string()),
    );
    if let Some(description) = &description {
        rule.insert("description".to_string(), description.clone());
    }
    rule.insert(
        "config".to_string(),
        json!({ "metadata": entry.remove("metadata").unwrap_or(Value::Null) }),
    );

    let mut body = Map::new();
    if let Some(id) = entry.remove("id") {
        body.insert("id".to_string(), id);
    }
    body.insert("apiVersion".to_string(), json!("v1"));
    if let Some(description) = description {
        body.insert("description".to_string(), description);
    }
    body.insert("active".to_string(), json!(true));
    body.insert("match".to_string(), entry.remove("match").unwrap_or(Value::Null));
    body.insert("rules".to_string(), Value::Array(vec![Value::Object(rule)]));

    Ok(SourceDocument::new(filename, Value::Object(body)))
}

/// Expand a static metadata file (one entry or an array of entries) into
/// synthetic pipeline documents named after the file.
pub fn static_metadata_documents(filename: &str, value: Value) -> Result<Vec<SourceDocument>> {
    match value {
        Value::Array(entries) => entries
            .into_iter()
            .enumerate()
            .map(|(i, entry)| entry_document(filename, i, entry))
            .collect(),
        entry @ Value::Object(_) => Ok(vec![entry_document(filename, 0, entry)?]),
        _ => Err(PipelineError::Document(format!(
            "static metadata file {} must hold an object or an array of objects",
            filename
        ))),
    }
}
