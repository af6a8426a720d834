use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use fluxgate_commands::{CommandRegistry, CommandResult};
use fluxgate_imagegen::{EncodedPayload, codec};
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, ServerCapabilities, ServerInfo};
use rmcp::{ErrorData as McpError, ServerHandler, schemars, tool, tool_handler, tool_router};
use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::python;

/// Guidance surfaced to MCP clients through the handshake
const INSTRUCTIONS: &str = "Fluxgate bridges a small tool surface to a text-to-image backend. \
Get host facts with get_system_info(), echo messages with echo_message(message=...), check \
Python source with execute_python_code(code=...) (checking only; nothing is executed), and \
render images with generate_image(prompt=...). Generated images are returned inline and \
persisted under the server's working directory.";

// --- Request types ---

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct EchoRequest {
    /// The message to echo back
    pub message: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ExecutePythonRequest {
    /// Python source to syntax-check (never executed)
    pub code: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GenerateImageRequest {
    /// Text prompt describing the desired image
    pub prompt: String,
    /// Output width in pixels (default 1024)
    pub width: Option<u32>,
    /// Output height in pixels (default 1024)
    pub height: Option<u32>,
    /// Number of diffusion steps (default 4)
    pub num_inference_steps: Option<u32>,
    /// Seed to pin generation to (default 0; only sent when randomize_seed is false)
    pub seed: Option<u64>,
    /// Let the backend pick a fresh seed per request (default true)
    pub randomize_seed: Option<bool>,
}

// --- Server ---

/// Protocol-facing tool gateway
///
/// Every tool converts internal faults into error content items;
/// nothing propagates to the transport as an unhandled fault.
pub struct FluxgateServer {
    registry: Arc<CommandRegistry>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl FluxgateServer {
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self {
            registry,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "Echo a message back to the caller")]
    async fn echo_message(
        &self,
        Parameters(req): Parameters<EchoRequest>,
    ) -> Result<CallToolResult, McpError> {
        let mut params = Map::new();
        if let Some(message) = req.message {
            params.insert("message".to_string(), json!(message));
        }

        Ok(render_json(self.registry.dispatch("echo", params).await))
    }

    #[tool(description = "Get information about the host system")]
    async fn get_system_info(&self) -> Result<CallToolResult, McpError> {
        Ok(render_json(self.registry.dispatch("system_info", Map::new()).await))
    }

    #[tool(
        description = "Check Python source for syntax errors. Execution is disabled: the code is parsed, never run."
    )]
    fn execute_python_code(
        &self,
        Parameters(req): Parameters<ExecutePythonRequest>,
    ) -> Result<CallToolResult, McpError> {
        match python::check_syntax(&req.code) {
            Ok(()) => {
                let output = json!({
                    "output": "Code execution is not implemented for security reasons"
                });
                Ok(CallToolResult::success(vec![Content::text(
                    serde_json::to_string_pretty(&output).unwrap_or_default(),
                )]))
            }
            Err(e) => Ok(CallToolResult::error(vec![Content::text(e)])),
        }
    }

    #[tool(
        description = "Generate an image from a text prompt via FLUX.1-schnell and return it inline. Large results are scaled down to fit the transport payload budget."
    )]
    async fn generate_image(
        &self,
        Parameters(req): Parameters<GenerateImageRequest>,
    ) -> Result<CallToolResult, McpError> {
        let mut params = Map::new();
        params.insert("prompt".to_string(), json!(req.prompt));
        if let Some(width) = req.width {
            params.insert("width".to_string(), json!(width));
        }
        if let Some(height) = req.height {
            params.insert("height".to_string(), json!(height));
        }
        if let Some(steps) = req.num_inference_steps {
            params.insert("num_inference_steps".to_string(), json!(steps));
        }
        if let Some(seed) = req.seed {
            params.insert("seed".to_string(), json!(seed));
        }
        if let Some(randomize) = req.randomize_seed {
            params.insert("randomize_seed".to_string(), json!(randomize));
        }

        let generated = match self.registry.dispatch("flux_generate_image", params).await {
            CommandResult::Success(data) => data,
            CommandResult::Failure(message) => {
                return Ok(CallToolResult::error(vec![Content::text(message)]));
            }
        };

        let Some(image_path) = generated.get("image_path").and_then(Value::as_str) else {
            return Ok(CallToolResult::error(vec![Content::text(
                "generation result is missing image_path",
            )]));
        };

        let mut fetch = Map::new();
        fetch.insert("image_path".to_string(), json!(image_path));

        let encoded = match self.registry.dispatch("flux_get_image", fetch).await {
            CommandResult::Success(data) => data,
            CommandResult::Failure(message) => {
                return Ok(CallToolResult::error(vec![Content::text(message)]));
            }
        };

        let Some(data) = encoded.get("data").and_then(Value::as_str) else {
            return Ok(CallToolResult::error(vec![Content::text(
                "image result is missing encoded data",
            )]));
        };

        let bytes = match STANDARD.decode(data) {
            Ok(bytes) => bytes,
            Err(e) => {
                return Ok(CallToolResult::error(vec![Content::text(format!(
                    "image payload was not valid base64: {e}"
                ))]));
            }
        };

        let budget = self.registry.context().payload_budget_bytes;
        let fitted = match codec::fit_to_budget(EncodedPayload::from_png_bytes(bytes), budget) {
            Ok(payload) => payload,
            Err(e) => {
                return Ok(CallToolResult::error(vec![Content::text(format!(
                    "failed to size image payload: {e}"
                ))]));
            }
        };

        tracing::debug!(
            size_bytes = fitted.size_bytes(),
            encoded_size = fitted.encoded_size(),
            "returning image content"
        );

        Ok(CallToolResult::success(vec![Content::image(
            fitted.to_base64(),
            fitted.mime_type().to_string(),
        )]))
    }
}

#[tool_handler]
impl ServerHandler for FluxgateServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

/// Convert a command result into a protocol content item
fn render_json(result: CommandResult) -> CallToolResult {
    match result {
        CommandResult::Success(data) => {
            let text = serde_json::to_string_pretty(&Value::Object(data)).unwrap_or_default();
            CallToolResult::success(vec![Content::text(text)])
        }
        CommandResult::Failure(message) => CallToolResult::error(vec![Content::text(message)]),
    }
}

#[cfg(test)]
mod tests {
    use fluxgate_commands::CommandContext;
    use fluxgate_config::FluxConfig;
    use fluxgate_imagegen::FluxClient;

    use super::*;

    fn test_server() -> (FluxgateServer, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let flux = FluxClient::new(&FluxConfig::default(), dir.path()).unwrap();
        let context = Arc::new(CommandContext {
            work_dir: dir.path().to_path_buf(),
            flux,
            payload_budget_bytes: codec::DEFAULT_PAYLOAD_BUDGET,
        });
        let registry = Arc::new(CommandRegistry::with_builtins(context));
        (FluxgateServer::new(registry), dir)
    }

    #[test]
    fn python_tool_never_executes_input() {
        let (server, dir) = test_server();
        let marker = dir.path().join("side_effect.txt");
        let code = format!("open({:?}, \"w\").write(\"executed\")\n", marker.display());

        let result = server
            .execute_python_code(Parameters(ExecutePythonRequest { code }))
            .unwrap();

        // Syntactically valid code gets the fixed disabled-execution
        // result, and the side effect must not have happened.
        assert_ne!(result.is_error, Some(true));
        assert!(!marker.exists());
    }

    #[test]
    fn python_tool_reports_syntax_errors() {
        let (server, _dir) = test_server();
        let result = server
            .execute_python_code(Parameters(ExecutePythonRequest {
                code: "def broken(:\n".to_string(),
            }))
            .unwrap();

        assert_eq!(result.is_error, Some(true));
    }

    #[tokio::test]
    async fn echo_tool_round_trips_message() {
        let (server, _dir) = test_server();
        let result = server
            .echo_message(Parameters(EchoRequest {
                message: Some("ping".to_string()),
            }))
            .await
            .unwrap();

        assert_ne!(result.is_error, Some(true));
    }

    #[tokio::test]
    async fn generate_image_surfaces_validation_failure() {
        let (server, _dir) = test_server();
        let result = server
            .generate_image(Parameters(GenerateImageRequest {
                prompt: "   ".to_string(),
                width: None,
                height: None,
                num_inference_steps: None,
                seed: None,
                randomize_seed: None,
            }))
            .await
            .unwrap();

        assert_eq!(result.is_error, Some(true));
    }
}
