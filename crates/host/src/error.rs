use {limelight_common::FromMessage, thiserror::Error};

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Message(String),

    #[error("no item at index {0}")]
    ItemIndex(usize),

    #[error("no slide at index {0}")]
    SlideIndex(usize),

    #[error("nothing is live")]
    NotLive,

    #[error("theme '{0}' not found")]
    ThemeNotFound(String),

    #[error("theme '{0}' already exists")]
    ThemeExists(String),

    #[error("cannot delete theme '{0}': {1}")]
    ThemeInUse(String, String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("malformed service file: {0}")]
    Parse(#[from] serde_json::Error),
}

impl Error {
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

impl FromMessage for Error {
    fn from_message(message: String) -> Self {
        Self::Message(message)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

limelight_common::impl_context!();
