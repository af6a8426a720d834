#![allow(
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::module_name_repetitions
)]

pub mod client;
pub mod codec;
mod error;
mod types;

pub use client::FluxClient;
pub use error::{ImageGenError, Result};
pub use types::{EncodedPayload, GeneratedImage, GenerationRequest};
