use std::path::{Path, PathBuf};
use std::time::Duration;

use fluxgate_config::FluxConfig;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::error::{ImageGenError, Result};
use crate::types::{GeneratedImage, GenerationRequest};

/// Client for the Hugging Face text-to-image inference API
///
/// Holds no mutable state: the endpoint, token, and working directory
/// are fixed at construction, so one client is safely shared across
/// concurrent tool invocations.
pub struct FluxClient {
    client: reqwest::Client,
    endpoint: String,
    token: Option<SecretString>,
    work_dir: PathBuf,
}

/// Wire format for the inference API request body
#[derive(Serialize)]
struct InferencePayload<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
}

/// Generation parameters nested in the request body
///
/// The `seed` key is omitted entirely when the caller asked for a
/// randomized seed; the API treats seed presence as "use this exact
/// seed".
#[derive(Serialize)]
struct InferenceParameters {
    width: u32,
    height: u32,
    num_inference_steps: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
}

impl FluxClient {
    /// Build a client from configuration
    ///
    /// The configured timeout is the only deadline anywhere in the
    /// pipeline; it applies to the whole outbound request.
    pub fn new(config: &FluxConfig, work_dir: &Path) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ImageGenError::Transient(format!("failed to build HTTP client: {e}")))?;

        let endpoint = format!("{}/models/{}", config.api_base.trim_end_matches('/'), config.model);

        if config.token.is_none() {
            tracing::warn!("no inference API token configured; calls may fail for protected models");
        }

        Ok(Self {
            client,
            endpoint,
            token: config.token.clone(),
            work_dir: work_dir.to_path_buf(),
        })
    }

    /// Generate one image and persist it under the working directory
    ///
    /// Exactly one network attempt is made; there is no retry or
    /// backoff. On success the decoded image is written once to a
    /// fresh `flux_image_<hex>.png` path.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedImage> {
        request.validate()?;

        let payload = InferencePayload {
            inputs: &request.prompt,
            parameters: InferenceParameters {
                width: request.width,
                height: request.height,
                num_inference_steps: request.steps,
                seed: (!request.randomize_seed).then_some(request.seed),
            },
        };

        tracing::debug!(
            endpoint = %self.endpoint,
            width = request.width,
            height = request.height,
            steps = request.steps,
            "sending image generation request"
        );

        let mut http = self.client.post(&self.endpoint).json(&payload);
        if let Some(ref token) = self.token {
            http = http.header("Authorization", format!("Bearer {}", token.expose_secret()));
        }

        let response = http.send().await.map_err(|e| {
            tracing::error!(error = %e, "image generation request failed");
            ImageGenError::Transient(format!("failed to reach inference API: {e}"))
        })?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "unknown error".to_string());

            tracing::error!(status = %status, "inference API error");

            return Err(match status.as_u16() {
                401 => ImageGenError::Unauthorized(
                    "invalid or missing inference API token; check the configured bearer token"
                        .to_string(),
                ),
                code => ImageGenError::RemoteFailure { status: code, body },
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ImageGenError::Transient(format!("failed to read response body: {e}")))?;

        let image = image::load_from_memory(&bytes).map_err(|e| {
            ImageGenError::Transient(format!("response body was not a decodable image: {e}"))
        })?;

        let id = uuid::Uuid::new_v4().simple().to_string();
        let file_path = self.work_dir.join(format!("flux_image_{id}.png"));

        image
            .save_with_format(&file_path, image::ImageFormat::Png)
            .map_err(|e| match e {
                image::ImageError::IoError(io) => ImageGenError::Io(io),
                other => ImageGenError::Transient(format!("failed to write image: {other}")),
            })?;

        tracing::info!(
            path = %file_path.display(),
            width = image.width(),
            height = image.height(),
            "image generated"
        );

        Ok(GeneratedImage {
            id,
            file_path,
            width: image.width(),
            height: image.height(),
            prompt: request.prompt.clone(),
        })
    }

    /// Directory generated images are written to
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }
}
