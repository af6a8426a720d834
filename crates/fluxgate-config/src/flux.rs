use secrecy::SecretString;
use serde::Deserialize;

/// Default Hugging Face Inference API base URL
fn default_api_base() -> String {
    "https://api-inference.huggingface.co".to_string()
}

/// Default model identifier
fn default_model() -> String {
    "black-forest-labs/FLUX.1-schnell".to_string()
}

/// Default request timeout in seconds
fn default_timeout_secs() -> u64 {
    120
}

/// Default transport payload budget in text-encoded bytes
///
/// Leaves headroom below a ~1 MB transport ceiling given the ~33%
/// size overhead of base64 encoding.
fn default_payload_budget_bytes() -> usize {
    750_000
}

/// Flux inference backend configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FluxConfig {
    /// Inference API base URL
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Model identifier appended to the `/models/` path
    #[serde(default = "default_model")]
    pub model: String,
    /// Bearer token for the inference API
    #[serde(default)]
    pub token: Option<SecretString>,
    /// Outbound request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Maximum text-encoded size of a single image payload
    #[serde(default = "default_payload_budget_bytes")]
    pub payload_budget_bytes: usize,
}

impl Default for FluxConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            model: default_model(),
            token: None,
            timeout_secs: default_timeout_secs(),
            payload_budget_bytes: default_payload_budget_bytes(),
        }
    }
}
