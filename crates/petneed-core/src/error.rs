use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Malformed payload: {0}")]
    Parse(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Favorites store failed: {0}")]
    Favorites(String),

    #[error("Operation failed: {0}")]
    Operation(String),
}

impl Error {
    pub fn fetch(url: &str, reason: impl ToString) -> Self {
        Self::Fetch { url: url.to_string(), reason: reason.to_string() }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self { Self::Parse(e.to_string()) }
}

pub type Result<T> = std::result::Result<T, Error>;
