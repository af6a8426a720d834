#![allow(clippy::must_use_candidate)]

mod env;
pub mod flux;
mod loader;
pub mod server;

use serde::Deserialize;

pub use flux::FluxConfig;
pub use server::ServerConfig;

/// Top-level Fluxgate configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Flux inference backend configuration
    #[serde(default)]
    pub flux: FluxConfig,
}
