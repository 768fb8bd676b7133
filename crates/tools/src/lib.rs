//! Tool catalog and dispatch.
//!
//! Every capability the gateway exposes is a named tool with a typed
//! argument spec. Invocation order: resolve the tool, validate arguments,
//! run the handler. Handlers do their slow work (downloads, conversion) on
//! the async runtime and only then submit a short state-mutating command
//! through the bridge, so the host loop never blocks on I/O.

use std::{collections::HashMap, future::Future, path::PathBuf, pin::Pin, sync::Arc, time::Duration};

use {serde_json::Value, tracing::debug, uuid::Uuid};

use {
    limelight_bridge::CommandBridge,
    limelight_config::LimelightConfig,
    limelight_host::HostState,
    limelight_protocol::{ErrorShape, error_kinds},
};

pub mod spec;

mod live;
mod media;
mod service;
mod theme;

pub use spec::{ParamKind, ParamSpec, ToolSpec};

/// What a tool handler produces.
pub type ToolResult = Result<Value, ErrorShape>;

/// A boxed async tool handler.
pub type HandlerFn =
    Box<dyn Fn(ToolContext) -> Pin<Box<dyn Future<Output = ToolResult> + Send>> + Send + Sync>;

/// Shared dependencies handed to every handler.
pub struct ToolDeps {
    pub bridge: CommandBridge<HostState>,
    pub config: LimelightConfig,
    /// Session-scoped home for downloaded media and converted PDFs; removed
    /// when the application exits.
    media_dir: tempfile::TempDir,
}

impl ToolDeps {
    pub fn new(bridge: CommandBridge<HostState>, config: LimelightConfig) -> std::io::Result<Self> {
        Ok(Self {
            bridge,
            config,
            media_dir: tempfile::tempdir()?,
        })
    }

    pub fn media_dir(&self) -> &std::path::Path {
        self.media_dir.path()
    }

    /// Move a file into the session media directory under a collision-free
    /// name, returning the new path.
    pub fn adopt(&self, path: &std::path::Path) -> Result<PathBuf, ErrorShape> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map_or_else(|| "media".to_owned(), ToOwned::to_owned);
        let target = self.media_dir().join(format!("{}-{name}", Uuid::new_v4()));
        std::fs::copy(path, &target).map_err(|e| {
            ErrorShape::new(
                error_kinds::FETCH_FAILED,
                format!("failed to store {}: {e}", path.display()),
            )
        })?;
        Ok(target)
    }
}

/// Context passed to every tool handler.
pub struct ToolContext {
    pub arguments: Value,
    pub deps: Arc<ToolDeps>,
    /// Wait budget for the bridge submit this call makes.
    pub timeout: Duration,
}

impl ToolContext {
    /// Run a closure against the host state through the bridge.
    pub async fn submit<F>(&self, f: F) -> ToolResult
    where
        F: FnOnce(&mut HostState) -> limelight_host::Result<Value> + Send + 'static,
    {
        self.deps
            .bridge
            .submit(
                move |state| f(state).map_err(|e| limelight_common::Error::message(e.to_string())),
                self.timeout,
            )
            .await
            .map_err(bridge_error)
    }
}

// ── Error mapping ────────────────────────────────────────────────────────────

pub(crate) fn bridge_error(e: limelight_bridge::Error) -> ErrorShape {
    use limelight_bridge::Error as E;
    match e {
        E::Unavailable(m) => ErrorShape::new(error_kinds::BRIDGE_UNAVAILABLE, m),
        E::Timeout { started } => ErrorShape::new(
            error_kinds::COMMAND_TIMEOUT,
            if started {
                "command timed out after execution started; its effects may still apply"
            } else {
                "command timed out before execution and was cancelled"
            },
        ),
        E::Failed(m) | E::Panicked(m) => ErrorShape::new(error_kinds::COMMAND_FAILED, m),
    }
}

pub(crate) fn fetch_error(e: limelight_fetch::Error) -> ErrorShape {
    use limelight_fetch::Error as E;
    match e {
        E::TooLarge { actual, limit } => ErrorShape::new(
            error_kinds::SOURCE_TOO_LARGE,
            format!("{actual} bytes exceeds the {limit} byte limit"),
        ),
        other => ErrorShape::new(error_kinds::FETCH_FAILED, other.to_string()),
    }
}

pub(crate) fn convert_error(e: limelight_convert::Error) -> ErrorShape {
    use limelight_convert::Error as E;
    match e {
        E::SourceTooLarge { actual, limit } => ErrorShape::new(
            error_kinds::SOURCE_TOO_LARGE,
            format!("{actual} bytes exceeds the {limit} byte limit"),
        ),
        E::UnsupportedFormat(m) => ErrorShape::new(error_kinds::UNSUPPORTED_FORMAT, m),
        other => ErrorShape::new(error_kinds::CONVERSION_FAILED, other.to_string()),
    }
}

// ── Catalog ──────────────────────────────────────────────────────────────────

pub struct ToolCatalog {
    deps: Arc<ToolDeps>,
    tools: HashMap<&'static str, (ToolSpec, HandlerFn)>,
}

impl ToolCatalog {
    pub fn new(deps: Arc<ToolDeps>) -> Self {
        let mut catalog = Self {
            deps,
            tools: HashMap::new(),
        };
        service::register(&mut catalog);
        media::register(&mut catalog);
        live::register(&mut catalog);
        theme::register(&mut catalog);
        catalog
    }

    pub(crate) fn register(&mut self, spec: ToolSpec, handler: HandlerFn) {
        self.tools.insert(spec.name, (spec, handler));
    }

    /// Listing for `GET /tools`, sorted by name.
    pub fn list(&self) -> Vec<Value> {
        let mut specs: Vec<&ToolSpec> = self.tools.values().map(|(spec, _)| spec).collect();
        specs.sort_by_key(|spec| spec.name);
        specs.iter().map(|spec| spec.describe()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Validate and run a tool call.
    pub async fn invoke(
        &self,
        name: &str,
        arguments: Value,
        timeout_ms: Option<u64>,
    ) -> ToolResult {
        let Some((spec, handler)) = self.tools.get(name) else {
            return Err(
                ErrorShape::new(error_kinds::UNKNOWN_TOOL, format!("unknown tool: {name}"))
                    .for_tool(name),
            );
        };

        spec.validate(&arguments)?;

        let bridge_config = &self.deps.config.bridge;
        let default_ms = if spec.slow {
            bridge_config.long_timeout_ms
        } else {
            bridge_config.default_timeout_ms
        };
        let timeout = Duration::from_millis(timeout_ms.unwrap_or(default_ms));
        debug!(tool = name, "invoking tool");
        let ctx = ToolContext {
            arguments,
            deps: Arc::clone(&self.deps),
            timeout,
        };
        handler(ctx).await.map_err(|e| {
            if e.tool.is_none() {
                e.for_tool(name)
            } else {
                e
            }
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Catalog wired to a live host loop on its own thread.
    pub(crate) fn catalog() -> (ToolCatalog, std::thread::JoinHandle<()>) {
        let config = LimelightConfig::default();
        let (bridge, command_loop) = limelight_bridge::channel(config.bridge.queue_capacity);
        let handle = std::thread::spawn(move || {
            let mut state = HostState::new();
            command_loop.run(&mut state);
        });
        #[allow(clippy::unwrap_used)]
        let deps = ToolDeps::new(bridge, config).unwrap();
        (ToolCatalog::new(Arc::new(deps)), handle)
    }
}
