//! Tool descriptions and argument validation.
//!
//! Validation runs before a tool's handler is called and before anything is
//! enqueued on the command bridge, so a bad call has no side effects. The
//! offending argument is always named in the error message.

use serde_json::Value;

use limelight_protocol::{ErrorShape, error_kinds};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Integer,
    Boolean,
}

impl ParamKind {
    fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_u64() || value.is_i64(),
            Self::Boolean => value.is_boolean(),
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    pub description: &'static str,
    /// Value the handler assumes when an optional parameter is absent,
    /// surfaced in the catalog listing.
    pub default: Option<Value>,
}

impl ParamSpec {
    pub fn required(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: true,
            description,
            default: None,
        }
    }

    pub fn optional(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: false,
            description,
            default: None,
        }
    }

    #[must_use]
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }
}

#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub params: Vec<ParamSpec>,
    /// Slow tools (downloads, conversion) get the long default timeout.
    pub slow: bool,
}

impl ToolSpec {
    pub fn new(name: &'static str, description: &'static str, params: Vec<ParamSpec>) -> Self {
        Self {
            name,
            description,
            params,
            slow: false,
        }
    }

    #[must_use]
    pub fn slow(mut self) -> Self {
        self.slow = true;
        self
    }

    /// Check `arguments` against this spec. `null` counts as no arguments.
    pub fn validate(&self, arguments: &Value) -> Result<(), ErrorShape> {
        let empty = serde_json::Map::new();
        let object = match arguments {
            Value::Null => &empty,
            Value::Object(map) => map,
            _ => {
                return Err(self.invalid("arguments must be a JSON object"));
            },
        };

        for param in &self.params {
            match object.get(param.name) {
                None | Some(Value::Null) => {
                    if param.required {
                        return Err(
                            self.invalid(format!("missing required argument '{}'", param.name))
                        );
                    }
                },
                Some(value) => {
                    if !param.kind.matches(value) {
                        return Err(self.invalid(format!(
                            "argument '{}' must be a {}",
                            param.name,
                            param.kind.label()
                        )));
                    }
                },
            }
        }

        for key in object.keys() {
            if !self.params.iter().any(|p| p.name == key) {
                return Err(self.invalid(format!("unknown argument '{key}'")));
            }
        }

        Ok(())
    }

    fn invalid(&self, message: impl Into<String>) -> ErrorShape {
        ErrorShape::new(error_kinds::INVALID_ARGUMENTS, message).for_tool(self.name)
    }

    /// Listing entry for `GET /tools`.
    pub fn describe(&self) -> Value {
        serde_json::json!({
            "name": self.name,
            "description": self.description,
            "parameters": self.params.iter().map(|p| {
                let mut entry = serde_json::json!({
                    "name": p.name,
                    "type": p.kind.label(),
                    "required": p.required,
                    "description": p.description,
                });
                if let Some(default) = &p.default {
                    entry["default"] = default.clone();
                }
                entry
            }).collect::<Vec<_>>(),
        })
    }
}

// ── Argument accessors ───────────────────────────────────────────────────────
// Used by handlers after validation; they still produce named errors so a
// handler misreading its own spec fails loudly rather than silently.

pub fn required_str<'a>(arguments: &'a Value, name: &str) -> Result<&'a str, ErrorShape> {
    arguments.get(name).and_then(Value::as_str).ok_or_else(|| {
        ErrorShape::new(
            error_kinds::INVALID_ARGUMENTS,
            format!("missing required argument '{name}'"),
        )
    })
}

pub fn optional_str<'a>(arguments: &'a Value, name: &str) -> Option<&'a str> {
    arguments.get(name).and_then(Value::as_str)
}

pub fn required_index(arguments: &Value, name: &str) -> Result<usize, ErrorShape> {
    arguments
        .get(name)
        .and_then(Value::as_u64)
        .map(|n| n as usize)
        .ok_or_else(|| {
            ErrorShape::new(
                error_kinds::INVALID_ARGUMENTS,
                format!("missing required argument '{name}'"),
            )
        })
}

pub fn optional_u32(arguments: &Value, name: &str) -> Option<u32> {
    arguments.get(name).and_then(Value::as_u64).map(|n| n as u32)
}

pub fn optional_bool(arguments: &Value, name: &str) -> Option<bool> {
    arguments.get(name).and_then(Value::as_bool)
}
