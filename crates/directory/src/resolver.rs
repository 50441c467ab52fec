use async_trait::async_trait;
use pipedump_core::{DirectoryConfig, Entity};

use crate::error::DirectoryError;
use crate::fts::FtsApiDirectory;
use crate::offline::OfflineDirectory;

/// Trait for entity directories: each backend implements this.
#[async_trait]
pub trait EntityResolver: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    /// Resolve synthesized entities into directory records.
    ///
    /// The response need not preserve input order; callers index the result
    /// by entity key.
    async fn resolve(&self, entities: Vec<Entity>) -> Result<Vec<Entity>, DirectoryError>;
}

/// Create the directory backend for this run.
pub fn create_resolver(
    config: &DirectoryConfig,
    offline: bool,
) -> Result<Box<dyn EntityResolver>, DirectoryError> {
    if offline {
        return Ok(Box::new(OfflineDirectory));
    }
    Ok(Box::new(FtsApiDirectory::new(config)?))
}
