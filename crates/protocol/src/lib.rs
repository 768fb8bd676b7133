//! Tool-invocation protocol definitions.
//!
//! All communication uses JSON over a loopback HTTP endpoint.
//!
//! Shapes:
//! - `InvokeRequest`  — caller → gateway tool call
//! - `InvokeResponse` — gateway → caller result
//! - `ErrorShape`     — stable error kind + human-readable message

use serde::{Deserialize, Serialize};

// ── Constants ────────────────────────────────────────────────────────────────

pub const DEFAULT_PORT: u16 = 8765;
pub const MAX_PAYLOAD_BYTES: usize = 524_288; // 512 KB

// ── Error kinds ──────────────────────────────────────────────────────────────

/// Stable error kinds for programmatic handling by callers.
pub mod error_kinds {
    pub const UNKNOWN_TOOL: &str = "UNKNOWN_TOOL";
    pub const INVALID_ARGUMENTS: &str = "INVALID_ARGUMENTS";
    pub const BRIDGE_UNAVAILABLE: &str = "BRIDGE_UNAVAILABLE";
    pub const COMMAND_FAILED: &str = "COMMAND_FAILED";
    pub const COMMAND_TIMEOUT: &str = "COMMAND_TIMEOUT";
    pub const SOURCE_TOO_LARGE: &str = "SOURCE_TOO_LARGE";
    pub const FETCH_FAILED: &str = "FETCH_FAILED";
    pub const CONVERSION_FAILED: &str = "CONVERSION_FAILED";
    pub const UNSUPPORTED_FORMAT: &str = "UNSUPPORTED_FORMAT";
}

// ── Error shape ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorShape {
    pub kind: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
}

impl ErrorShape {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            tool: None,
        }
    }

    #[must_use]
    pub fn for_tool(mut self, tool: impl Into<String>) -> Self {
        self.tool = Some(tool.into());
        self
    }
}

impl std::fmt::Display for ErrorShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ErrorShape {}

// ── Frames ───────────────────────────────────────────────────────────────────

/// Caller → gateway tool invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvokeRequest {
    pub tool: String,
    #[serde(default)]
    pub arguments: serde_json::Value,
    /// Per-call submit timeout override, in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

/// Gateway → caller result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvokeResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorShape>,
}

impl InvokeResponse {
    pub fn ok(result: serde_json::Value) -> Self {
        Self {
            ok: true,
            result: Some(result),
            error: None,
        }
    }

    pub fn err(error: ErrorShape) -> Self {
        Self {
            ok: false,
            result: None,
            error: Some(error),
        }
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_shape_roundtrip() {
        let err = ErrorShape::new(error_kinds::UNKNOWN_TOOL, "no such tool").for_tool("frobnicate");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "UNKNOWN_TOOL");
        assert_eq!(json["tool"], "frobnicate");
        let back: ErrorShape = serde_json::from_value(json).unwrap();
        assert_eq!(back.message, "no such tool");
    }

    #[test]
    fn response_omits_absent_fields() {
        let ok = serde_json::to_value(InvokeResponse::ok(serde_json::json!({"n": 1}))).unwrap();
        assert!(ok.get("error").is_none());
        let err = serde_json::to_value(InvokeResponse::err(ErrorShape::new(
            error_kinds::COMMAND_FAILED,
            "boom",
        )))
        .unwrap();
        assert!(err.get("result").is_none());
        assert_eq!(err["ok"], false);
    }

    #[test]
    fn invoke_request_defaults_arguments() {
        let req: InvokeRequest = serde_json::from_str(r#"{"tool": "next_slide"}"#).unwrap();
        assert_eq!(req.tool, "next_slide");
        assert!(req.arguments.is_null());
        assert!(req.timeout_ms.is_none());
    }
}
