use std::path::PathBuf;

use clap::Parser;

/// Fluxgate MCP server
#[derive(Debug, Parser)]
#[command(name = "fluxgate", about = "MCP server bridging tools to FLUX.1-schnell")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "fluxgate.toml", env = "FLUXGATE_CONFIG")]
    pub config: PathBuf,

    /// Override the working directory for generated files
    #[arg(long, env = "MCP_WORK_DIR")]
    pub work_dir: Option<PathBuf>,

    /// Override the inference API bearer token
    #[arg(long, env = "HF_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Override the request timeout in seconds
    #[arg(long, env = "MCP_TIMEOUT")]
    pub timeout: Option<u64>,
}
