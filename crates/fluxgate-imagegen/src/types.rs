use std::path::PathBuf;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;

use crate::error::{ImageGenError, Result};

/// Default image dimension in pixels
fn default_dimension() -> u32 {
    1024
}

/// Default number of diffusion steps
fn default_steps() -> u32 {
    4
}

/// Default seed randomization
fn default_randomize_seed() -> bool {
    true
}

/// A validated text-to-image generation request
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationRequest {
    /// Text prompt describing the desired image
    pub prompt: String,
    /// Output width in pixels
    #[serde(default = "default_dimension")]
    pub width: u32,
    /// Output height in pixels
    #[serde(default = "default_dimension")]
    pub height: u32,
    /// Number of diffusion steps
    #[serde(default = "default_steps", rename = "num_inference_steps")]
    pub steps: u32,
    /// Seed sent to the model when `randomize_seed` is false
    #[serde(default)]
    pub seed: u64,
    /// Let the backend pick a fresh seed per request
    #[serde(default = "default_randomize_seed")]
    pub randomize_seed: bool,
}

impl GenerationRequest {
    /// Create a request for the given prompt with default parameters
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            width: default_dimension(),
            height: default_dimension(),
            steps: default_steps(),
            seed: 0,
            randomize_seed: default_randomize_seed(),
        }
    }

    /// Check the request is well formed
    ///
    /// Called before any network I/O; an invalid request never reaches
    /// the inference API.
    pub fn validate(&self) -> Result<()> {
        if self.prompt.trim().is_empty() {
            return Err(ImageGenError::Validation("prompt must not be empty".to_string()));
        }

        if self.width == 0 || self.height == 0 {
            return Err(ImageGenError::Validation(
                "width and height must be positive".to_string(),
            ));
        }

        if self.steps == 0 {
            return Err(ImageGenError::Validation(
                "num_inference_steps must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

/// A generated image persisted under the working directory
///
/// The file is the sole owner of the binary; no pixel data is retained
/// in memory past the write.
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    /// Opaque unique token, also embedded in the filename
    pub id: String,
    /// Location of the PNG on disk
    pub file_path: PathBuf,
    /// Decoded pixel width
    pub width: u32,
    /// Decoded pixel height
    pub height: u32,
    /// Prompt the image was generated from
    pub prompt: String,
}

/// PNG image bytes ready for transport encoding
///
/// Transient: produced from a file or buffer, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPayload {
    bytes: Vec<u8>,
}

impl EncodedPayload {
    /// Wrap already-PNG-encoded bytes
    pub fn from_png_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// The PNG-encoded bytes
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// MIME type of the payload
    pub fn mime_type(&self) -> &'static str {
        "image/png"
    }

    /// Raw (pre-transport-encoding) size in bytes
    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }

    /// Size after base64 transport encoding
    ///
    /// Base64 maps every 3 input bytes to 4 output characters, with
    /// padding to a multiple of 4.
    pub fn encoded_size(&self) -> usize {
        self.bytes.len().div_ceil(3) * 4
    }

    /// Base64-encode for a text transport envelope
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}
