#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod builtins;
mod registry;

use std::path::PathBuf;

use fluxgate_imagegen::FluxClient;
use serde_json::{Map, Value};

pub use registry::{CommandHandler, CommandRegistry};

/// Injected environment shared by all command handlers
///
/// Built once at startup and read-only afterwards; there is no
/// process-wide mutable state.
pub struct CommandContext {
    /// Directory generated files live under
    pub work_dir: PathBuf,
    /// Inference API client
    pub flux: FluxClient,
    /// Maximum text-encoded size of a single image payload
    pub payload_budget_bytes: usize,
}

/// Outcome of a dispatched command
///
/// Every handler returns one of these; no error or panic crosses the
/// registry boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandResult {
    /// Command completed; carries a string-keyed result mapping
    Success(Map<String, Value>),
    /// Command failed; carries a user-visible message
    Failure(String),
}

impl CommandResult {
    /// Build a success result from key/value pairs
    pub fn success(entries: impl IntoIterator<Item = (&'static str, Value)>) -> Self {
        let mut map = Map::new();
        for (key, value) in entries {
            map.insert(key.to_string(), value);
        }
        Self::Success(map)
    }

    /// Build a failure result
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure(message.into())
    }

    /// Whether this is a success
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}
