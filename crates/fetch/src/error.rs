use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("local file not found: {0}")]
    NotFound(String),

    #[error("failed to fetch {reference}: {message}")]
    Failed { reference: String, message: String },

    #[error("resource too large: {actual} bytes exceeds the {limit} byte limit")]
    TooLarge { actual: u64, limit: u64 },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    #[must_use]
    pub fn failed(reference: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            reference: reference.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
