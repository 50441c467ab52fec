use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("{key} is required and must be set in the environment.")]
    MissingEnv { key: String },

    #[error("{key} must {must_be}, not {value}")]
    InvalidEnv {
        key: String,
        must_be: String,
        value: String,
    },
}
