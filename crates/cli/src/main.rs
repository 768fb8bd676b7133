//! The `limelight` binary.
//!
//! `limelight` (or `limelight gateway`) starts the host loop and the HTTP
//! gateway. `tools` and `invoke` are thin HTTP clients for a gateway that is
//! already running, handy for poking at the tool catalog from a shell.

use std::sync::Arc;

use {
    clap::{Parser, Subcommand},
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use {
    limelight_host::HostState,
    limelight_protocol::InvokeResponse,
    limelight_tools::{ToolCatalog, ToolDeps},
};

#[derive(Parser)]
#[command(name = "limelight", about = "Limelight — agent-driven presentation host")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Address to bind or connect to (overrides config value).
    #[arg(long, global = true)]
    bind: Option<String>,

    /// Port to listen or connect on (overrides config value).
    #[arg(long, global = true)]
    port: Option<u16>,

    /// Explicit config file path (otherwise discovered).
    #[arg(long, global = true, env = "LIMELIGHT_CONFIG")]
    config: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the gateway server (default when no subcommand is provided).
    Gateway,
    /// List the tools a running gateway exposes.
    Tools,
    /// Call one tool on a running gateway.
    Invoke {
        /// Tool name, e.g. `add_song`.
        tool: String,
        /// Arguments as a JSON object.
        #[arg(long, default_value = "{}")]
        arguments: String,
        /// Per-call timeout override, in milliseconds.
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_thread_ids(false))
            .init();
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<limelight_config::LimelightConfig> {
    let mut config = match &cli.config {
        Some(path) => limelight_config::load_config(path)?,
        None => limelight_config::discover_and_load(),
    };
    if let Some(bind) = &cli.bind {
        config.server.bind = bind.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    Ok(config)
}

async fn run_gateway(cli: &Cli) -> anyhow::Result<()> {
    let config = load_config(cli)?;

    // The host state lives on its own thread for the life of the process;
    // everything else talks to it through the bridge.
    let (bridge, command_loop) = limelight_bridge::channel(config.bridge.queue_capacity);
    std::thread::Builder::new()
        .name("limelight-host".into())
        .spawn(move || {
            let mut state = HostState::new();
            command_loop.run(&mut state);
        })?;

    let bind = config.server.bind.clone();
    let port = config.server.port;
    let deps = ToolDeps::new(bridge, config)?;
    let catalog = Arc::new(ToolCatalog::new(Arc::new(deps)));
    info!(tools = catalog.len(), "tool catalog ready");

    limelight_gateway::start_gateway(&bind, port, catalog).await
}

fn gateway_url(cli: &Cli) -> anyhow::Result<String> {
    let config = load_config(cli)?;
    Ok(format!("http://{}:{}", config.server.bind, config.server.port))
}

async fn run_tools(cli: &Cli) -> anyhow::Result<()> {
    let body: serde_json::Value = reqwest::get(format!("{}/tools", gateway_url(cli)?))
        .await?
        .error_for_status()?
        .json()
        .await?;
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

async fn run_invoke(
    cli: &Cli,
    tool: &str,
    arguments: &str,
    timeout_ms: Option<u64>,
) -> anyhow::Result<()> {
    let arguments: serde_json::Value = serde_json::from_str(arguments)
        .map_err(|e| anyhow::anyhow!("--arguments must be valid JSON: {e}"))?;

    let response: InvokeResponse = reqwest::Client::new()
        .post(format!("{}/invoke", gateway_url(cli)?))
        .json(&serde_json::json!({
            "tool": tool,
            "arguments": arguments,
            "timeout_ms": timeout_ms,
        }))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    if let Some(error) = response.error {
        anyhow::bail!("{error}");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_telemetry(&cli);
    info!(version = env!("CARGO_PKG_VERSION"), "limelight starting");

    match &cli.command {
        None | Some(Commands::Gateway) => run_gateway(&cli).await,
        Some(Commands::Tools) => run_tools(&cli).await,
        Some(Commands::Invoke {
            tool,
            arguments,
            timeout_ms,
        }) => run_invoke(&cli, tool, arguments, *timeout_ms).await,
    }
}
