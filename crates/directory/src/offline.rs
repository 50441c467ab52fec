use async_trait::async_trait;
use pipedump_core::Entity;
use tracing::debug;

use crate::error::DirectoryError;
use crate::resolver::EntityResolver;

/// Directory stand-in that hands the synthesized entities straight back.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineDirectory;

#[async_trait]
impl EntityResolver for OfflineDirectory {
    fn name(&self) -> &str {
        "offline"
    }

    async fn resolve(&self, entities: Vec<Entity>) -> Result<Vec<Entity>, DirectoryError> {
        debug!(count = entities.len(), "offline directory echoing entities");
        Ok(entities)
    }
}
