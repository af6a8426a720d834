#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod args;

use std::sync::Arc;

use args::Args;
use clap::Parser;
use fluxgate_commands::{CommandContext, CommandRegistry};
use fluxgate_config::Config;
use fluxgate_imagegen::FluxClient;
use fluxgate_mcp::FluxgateServer;
use rmcp::{ServiceExt, transport::stdio};
use secrecy::SecretString;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration and apply CLI overrides
    let mut config = Config::load(&args.config)?;
    if let Some(work_dir) = args.work_dir {
        config.server.work_dir = work_dir;
    }
    if let Some(token) = args.token {
        config.flux.token = Some(SecretString::from(token));
    }
    if let Some(timeout) = args.timeout {
        config.flux.timeout_secs = timeout;
    }
    config.validate()?;

    init_tracing(&config.server.log_filter);

    tracing::info!(
        config_path = %args.config.display(),
        work_dir = %config.server.work_dir.display(),
        timeout_secs = config.flux.timeout_secs,
        "starting fluxgate"
    );

    // The working directory is created once here; it is safe for
    // concurrent use afterwards.
    std::fs::create_dir_all(&config.server.work_dir)?;

    let flux = FluxClient::new(&config.flux, &config.server.work_dir)
        .map_err(|e| anyhow::anyhow!("failed to initialize inference client: {e}"))?;

    let context = Arc::new(CommandContext {
        work_dir: config.server.work_dir.clone(),
        flux,
        payload_budget_bytes: config.flux.payload_budget_bytes,
    });
    let registry = Arc::new(CommandRegistry::with_builtins(context));

    tracing::info!(
        commands = ?registry.names().collect::<Vec<_>>(),
        "command registry initialized"
    );

    let service = FluxgateServer::new(registry)
        .serve(stdio())
        .await
        .map_err(|e| anyhow::anyhow!("failed to start MCP transport: {e}"))?;

    // A won signal branch drops the running service, which tears the
    // transport down.
    tokio::select! {
        result = service.waiting() => {
            result.map_err(|e| anyhow::anyhow!("transport error: {e}"))?;
        }
        () = shutdown_signal() => {}
    }

    tracing::info!("fluxgate stopped");
    Ok(())
}

/// Initialize the tracing subscriber
///
/// Logs go to stderr; stdout belongs to the MCP transport.
fn init_tracing(filter: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Wait for a shutdown signal (`SIGINT` or `SIGTERM`)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    tracing::info!("shutdown signal received");
}
