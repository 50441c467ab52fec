//! Entity resolution against the external entity directory.
//!
//! [`EntityResolver`] is the seam the CLI depends on. [`FtsApiDirectory`]
//! talks to the FTS API over HTTP; [`OfflineDirectory`] echoes entities back
//! without any network access.

pub mod error;
pub mod fts;
pub mod offline;
pub mod resolver;

pub use error::DirectoryError;
pub use fts::FtsApiDirectory;
pub use offline::OfflineDirectory;
pub use resolver::{create_resolver, EntityResolver};
