//! Filesystem loader for pipeline and static metadata files.
//!
//! Pipeline files are JSON (`.json`) or YAML (`.yml`/`.yaml`); both become
//! the same raw [`SourceDocument`](crate::schema::SourceDocument) tree that the
//! validator checks. Static metadata files are expanded into synthetic
//! single-rule pipelines.

mod core;
mod result;
mod static_metadata;


pub use self::core::PipelineLoader;
pub use self::result::{LoadResult, LoadStatus};
pub use self::static_metadata::static_metadata_documents;
