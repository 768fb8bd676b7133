use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The queue is full or the consumer has stopped. Nothing was executed.
    #[error("bridge unavailable: {0}")]
    Unavailable(String),

    /// The wait expired. `started` tells whether the command began executing
    /// before the deadline; when false it was cancelled and never ran.
    #[error("command timed out (execution started: {started})")]
    Timeout { started: bool },

    /// The command executed and returned an error.
    #[error("command failed: {0}")]
    Failed(String),

    /// The command panicked; the loop survived.
    #[error("command panicked: {0}")]
    Panicked(String),
}

pub type Result<T> = std::result::Result<T, Error>;
