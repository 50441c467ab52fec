pub mod config;
pub mod entity;
pub mod error;

pub use config::{load_dotenv, Credentials, DirectoryConfig};
pub use entity::*;
pub use error::*;
