#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("FTS API request error: {status} - {body}")]
    Api { status: u16, body: String },
    /// The API gateway answered 2xx but wrapped an error in the body.
    #[error("{0}")]
    Response(String),
    #[error("failed to parse response: {0}")]
    Parse(String),
    #[error("directory not configured: {0}")]
    NotConfigured(String),
}
