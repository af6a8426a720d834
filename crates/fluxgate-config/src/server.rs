use std::path::PathBuf;

use serde::Deserialize;

/// Default working directory for generated files
fn default_work_dir() -> PathBuf {
    PathBuf::from("./mcp_data")
}

/// Default log filter directive
fn default_log_filter() -> String {
    "info".to_string()
}

/// Server-level configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Directory where generated images are persisted
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,
    /// Log filter directive (e.g. "info", "fluxgate=debug")
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            work_dir: default_work_dir(),
            log_filter: default_log_filter(),
        }
    }
}
