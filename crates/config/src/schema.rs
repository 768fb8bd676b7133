//! Config schema with serde defaults. Every section is optional in the file.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LimelightConfig {
    pub server: ServerConfig,
    pub bridge: BridgeConfig,
    pub fetch: FetchConfig,
    pub convert: ConvertConfig,
}

/// Gateway server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to. Defaults to "127.0.0.1"; the gateway is meant for
    /// a trusted local caller only.
    pub bind: String,
    /// Port to listen on.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".into(),
            port: 8765,
        }
    }
}

/// Command bridge configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Bounded queue capacity between the gateway and the command loop.
    pub queue_capacity: usize,
    /// Default wait for a command result, in milliseconds.
    pub default_timeout_ms: u64,
    /// Wait for slow commands (presentation conversion), in milliseconds.
    pub long_timeout_ms: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 64,
            default_timeout_ms: 10_000,
            long_timeout_ms: 90_000,
        }
    }
}

/// Remote resource fetch configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Hard cap on downloaded bytes. Defaults to 100 MB.
    pub max_bytes: u64,
    /// Connect + read timeout per request, in seconds.
    pub timeout_seconds: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_bytes: 100 * 1024 * 1024,
            timeout_seconds: 30,
        }
    }
}

/// Presentation conversion configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Hard cap on the source file size. Defaults to 50 MB.
    pub max_source_bytes: u64,
    /// Timeout for a LibreOffice conversion run, in seconds.
    pub soffice_timeout_seconds: u64,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            max_source_bytes: 50 * 1024 * 1024,
            soffice_timeout_seconds: 90,
        }
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = LimelightConfig::default();
        assert_eq!(cfg.server.bind, "127.0.0.1");
        assert_eq!(cfg.server.port, 8765);
        assert_eq!(cfg.bridge.queue_capacity, 64);
        assert_eq!(cfg.bridge.default_timeout_ms, 10_000);
        assert_eq!(cfg.convert.max_source_bytes, 50 * 1024 * 1024);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg: LimelightConfig = toml::from_str("[server]\nport = 9000\n").unwrap();
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.server.bind, "127.0.0.1");
        assert_eq!(cfg.bridge.long_timeout_ms, 90_000);
    }
}
