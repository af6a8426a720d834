//! Mock Hugging Face inference backend for integration tests
//!
//! Serves `POST /models/{model}` with either canned PNG bytes or a
//! canned error, counting requests so tests can assert on network
//! activity.

use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::{Router, routing};
use tokio_util::sync::CancellationToken;

/// What the mock returns for every generation request
enum Behavior {
    /// A freshly encoded PNG of the given dimensions
    Png { width: u32, height: u32 },
    /// A fixed error status and body
    Error { status: u16, body: String },
}

struct MockFluxState {
    request_count: AtomicU32,
    last_body: Mutex<Option<serde_json::Value>>,
    behavior: Behavior,
}

/// Mock inference backend that returns predictable responses
pub struct MockFlux {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockFluxState>,
}

impl MockFlux {
    /// Start a mock that answers every request with a PNG of the
    /// given dimensions
    pub async fn start_png(width: u32, height: u32) -> anyhow::Result<Self> {
        Self::start_inner(Behavior::Png { width, height }).await
    }

    /// Start a mock that answers every request with an error
    pub async fn start_error(status: u16, body: &str) -> anyhow::Result<Self> {
        Self::start_inner(Behavior::Error {
            status,
            body: body.to_owned(),
        })
        .await
    }

    async fn start_inner(behavior: Behavior) -> anyhow::Result<Self> {
        let state = Arc::new(MockFluxState {
            request_count: AtomicU32::new(0),
            last_body: Mutex::new(None),
            behavior,
        });

        let app = Router::new()
            .route("/models/{*model}", routing::post(handle_generate))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL to configure as `flux.api_base`
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of generation requests received
    pub fn request_count(&self) -> u32 {
        self.state.request_count.load(Ordering::SeqCst)
    }

    /// JSON body of the most recent request
    pub fn last_request_body(&self) -> Option<serde_json::Value> {
        self.state.last_body.lock().unwrap().clone()
    }
}

impl Drop for MockFlux {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle_generate(
    State(state): State<Arc<MockFluxState>>,
    body: Bytes,
) -> impl IntoResponse {
    state.request_count.fetch_add(1, Ordering::SeqCst);

    if let Ok(json) = serde_json::from_slice::<serde_json::Value>(&body) {
        *state.last_body.lock().unwrap() = Some(json);
    }

    match &state.behavior {
        Behavior::Png { width, height } => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "image/png")],
            png_bytes(*width, *height),
        )
            .into_response(),
        Behavior::Error { status, body } => (
            StatusCode::from_u16(*status).expect("valid status code"),
            body.clone(),
        )
            .into_response(),
    }
}

/// Encode a deterministic per-pixel-noise PNG so payloads do not
/// compress away in sizing tests
fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut img = image::RgbImage::new(width, height);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let r = (x.wrapping_mul(89) ^ y.wrapping_mul(41)) as u8;
        let g = (x.wrapping_mul(19) ^ y.wrapping_mul(157)) as u8;
        let b = (x.wrapping_add(y).wrapping_mul(101)) as u8;
        *pixel = image::Rgb([r, g, b]);
    }

    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .expect("in-memory PNG encode");
    bytes
}
