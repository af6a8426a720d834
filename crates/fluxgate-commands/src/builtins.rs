//! Built-in command handlers

use std::path::Path;
use std::sync::Arc;

use fluxgate_imagegen::{GenerationRequest, codec};
use serde_json::{Map, Value, json};

use crate::{CommandContext, CommandRegistry, CommandResult};

/// Greeting returned by `echo` when no message is supplied
const DEFAULT_GREETING: &str = "Hello from Fluxgate!";

/// Register every built-in command
pub(crate) fn register_builtins(registry: &mut CommandRegistry) {
    registry.register("echo", |_ctx, params| {
        Box::pin(async move { echo(&params) })
    });
    registry.register("system_info", |ctx, _params| {
        Box::pin(async move { system_info(&ctx) })
    });
    registry.register("flux_generate_image", |ctx, params| {
        Box::pin(async move { generate_image(&ctx, params).await })
    });
    registry.register("flux_get_image", |_ctx, params| {
        Box::pin(async move { get_image(&params) })
    });
}

/// Echo the provided message, or a fixed greeting without one
fn echo(params: &Map<String, Value>) -> CommandResult {
    let message = params
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_GREETING);

    CommandResult::success([("message", json!(message))])
}

/// Static host facts plus the configured working directory
fn system_info(context: &CommandContext) -> CommandResult {
    CommandResult::success([
        ("platform", json!(std::env::consts::OS)),
        ("arch", json!(std::env::consts::ARCH)),
        ("server_version", json!(env!("CARGO_PKG_VERSION"))),
        ("work_dir", json!(context.work_dir.display().to_string())),
    ])
}

/// Generate an image via the inference client
async fn generate_image(context: &CommandContext, params: Map<String, Value>) -> CommandResult {
    let request: GenerationRequest = match serde_json::from_value(Value::Object(params)) {
        Ok(request) => request,
        Err(e) => return CommandResult::failure(format!("invalid generation parameters: {e}")),
    };

    match context.flux.generate(&request).await {
        Ok(image) => CommandResult::success([
            ("message", json!("Image generated successfully")),
            ("image_path", json!(image.file_path.display().to_string())),
            ("image_id", json!(image.id)),
            ("prompt", json!(image.prompt)),
            ("width", json!(image.width)),
            ("height", json!(image.height)),
        ]),
        Err(e) => {
            tracing::warn!(kind = e.kind(), error = %e, "image generation failed");
            CommandResult::failure(e.to_string())
        }
    }
}

/// Read a previously generated image and encode it for transport
fn get_image(params: &Map<String, Value>) -> CommandResult {
    let Some(path) = params.get("image_path").and_then(Value::as_str) else {
        return CommandResult::failure("image_path parameter is required");
    };

    match codec::read_and_encode(Path::new(path)) {
        Ok(payload) => CommandResult::success([
            ("image_path", json!(path)),
            ("mime_type", json!(payload.mime_type())),
            ("size_bytes", json!(payload.size_bytes())),
            ("data", json!(payload.to_base64())),
        ]),
        Err(e) => {
            tracing::warn!(kind = e.kind(), error = %e, "image read failed");
            CommandResult::failure(e.to_string())
        }
    }
}
