#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod gateway;
pub mod python;

pub use gateway::FluxgateServer;
