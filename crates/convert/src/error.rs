use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("source too large: {actual} bytes exceeds the {limit} byte limit")]
    SourceTooLarge { actual: u64, limit: u64 },

    #[error("unsupported presentation format: {0}")]
    UnsupportedFormat(String),

    #[error("{0}")]
    Failed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
