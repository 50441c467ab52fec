use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;

use crate::error::{PipelineError, Result};
use crate::loader::PipelineLoader;

/// Entity key (`externalId/provider`) → contributor name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceMap {
    contributors: HashMap<String, String>,
}

impl SourceMap {
    /// Read a JSON (or YAML) object of string values.
    pub fn load(path: &Path) -> Result<Self> {
        Self::from_value(PipelineLoader::read_value(path)?)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(PipelineError::Document(
                "source map must be an object of entity key to contributor".to_string(),
            ));
        };
        let contributors = map
            .into_iter()
            .map(|(key, value)| match value {
                Value::String(name) => Ok((key, name)),
                other => Err(PipelineError::Document(format!(
                    "source map entry {} must be a string, not {}",
                    key, other
                ))),
            })
            .collect::<Result<_>>()?;
        Ok(Self { contributors })
    }

    pub fn contributor(&self, entity_key: &str) -> Option<&str> {
        self.contributors.get(entity_key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.contributors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contributors.is_empty()
    }
}
