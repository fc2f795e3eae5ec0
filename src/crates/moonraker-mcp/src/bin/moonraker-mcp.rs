//! moonraker-mcp - MCP tool server for Moonraker printers
//!
//! Main entry point: serves the MCP endpoint, or lists and calls tools
//! directly from the command line.

use anyhow::Context;
use clap::{Parser, Subcommand};
use moonraker_mcp::server::{create_router, SecurityState};
use moonraker_mcp::{build_registry, McpConfig};
use serde_json::Value;
use tracing_subscriber::EnvFilter;
use utils::{FromEnv, ValidateConfig};

#[derive(Parser)]
#[command(name = "moonraker-mcp")]
#[command(about = "MCP tool server for Moonraker-controlled 3D printers", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Address to bind (overrides HOST)
    #[arg(long, global = true)]
    host: Option<String>,

    /// Port to bind (overrides PORT)
    #[arg(long, global = true)]
    port: Option<u16>,

    /// Moonraker base URL (overrides MOONRAKER_URL)
    #[arg(long, global = true)]
    moonraker_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the MCP endpoint over HTTP (default)
    Serve,

    /// Print the tool definitions as JSON
    Tools,

    /// Invoke one tool and print its result
    Call {
        /// Tool name
        tool: String,
        /// JSON object with the tool arguments
        #[arg(short, long, default_value = "{}")]
        args: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = McpConfig::from_env("").context("Failed to load configuration")?;
    if let Some(url) = cli.moonraker_url {
        config = config.with_moonraker_url(url);
    }
    if let Some(host) = cli.host {
        config = config.with_host(host);
    }
    if let Some(port) = cli.port {
        config = config.with_port(port);
    }
    config.validate().context("Invalid configuration")?;

    let registry = build_registry(&config).context("Failed to initialize tools")?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config, registry).await,
        Commands::Tools => {
            println!("{}", serde_json::to_string_pretty(&registry.definitions())?);
            Ok(())
        }
        Commands::Call { tool, args } => {
            let arguments: Value =
                serde_json::from_str(&args).context("--args must be valid JSON")?;
            let result = registry.call(&tool, &arguments).await;
            println!("{}", serde_json::to_string_pretty(&result.to_value())?);
            if result.is_error() {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

async fn serve(config: McpConfig, registry: moonraker_mcp::ToolRegistry) -> anyhow::Result<()> {
    let addr = config.server.socket_addr()?;

    tracing::info!("Moonraker URL: {}", config.moonraker_url);
    tracing::info!(tools = registry.definitions().len(), "Tool registry ready");
    match &config.gemini {
        Some(gemini) => tracing::info!("Vision analysis enabled with {}", gemini.model),
        None => tracing::warn!("GEMINI_API_KEY not set; analyze_snapshot will report an error"),
    }

    let security = SecurityState::new(config.auth_token.clone());
    if security.is_open() {
        tracing::warn!("MCP_AUTH_TOKEN not set; /mcp accepts unauthenticated requests");
    }

    let app = create_router(registry, security, config.server.timeout);

    tracing::info!("Starting moonraker-mcp server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("moonraker-mcp server shut down gracefully");
    Ok(())
}

/// Signal for graceful shutdown (Ctrl-C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install CTRL-C signal handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to install SIGTERM signal handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received CTRL-C signal, shutting down");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, shutting down");
        }
    }
}
