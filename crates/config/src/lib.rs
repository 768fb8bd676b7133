//! Configuration loading for limelight.
//!
//! Discovers `limelight.{toml,yaml,yml,json}` in the working directory and
//! then `~/.config/limelight/`, falling back to built-in defaults.

pub mod loader;
pub mod schema;

pub use {
    loader::{config_dir, discover_and_load, load_config},
    schema::{BridgeConfig, ConvertConfig, FetchConfig, LimelightConfig, ServerConfig},
};
