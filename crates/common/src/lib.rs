//! Shared error definitions and utilities used across all limelight crates.

pub mod error;

pub use error::{Error, FromMessage, Result};
