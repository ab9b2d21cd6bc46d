//! HTTP transport server using Axum.
//!
//! Every POST body is handed to the [`RequestHandler`] on tokio's blocking
//! pool, so a batch that waits on its deadline ties up a dedicated thread
//! rather than an async worker. JSON-RPC errors travel in the body; the
//! HTTP status is always `200 OK`.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::header,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use jrpc_protocol::RpcError;
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Implemented by the dispatcher to turn a request body into a response body.
pub trait RequestHandler: Send + Sync + 'static {
    /// Handle one raw body. May block for as long as a batch takes.
    /// An empty return value means "send no body".
    fn handle_body(&self, body: &[u8]) -> Vec<u8>;

    /// `Content-Type` header value for response bodies.
    fn content_type(&self) -> String;

    /// Extra fields for the health endpoint.
    fn status(&self) -> Value {
        json!({})
    }
}

/// Transport server configuration.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Port to listen on (0 for OS-assigned)
    pub port: u16,
    /// Hostname to bind to
    pub hostname: String,
    /// Largest accepted request body
    pub max_body_bytes: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            port: 7080,
            hostname: "127.0.0.1".into(),
            max_body_bytes: 2 * 1024 * 1024,
        }
    }
}

/// Shared state for the transport server.
struct AppState<H: RequestHandler> {
    handler: Arc<H>,
}

/// The transport server: accepts HTTP calls and routes bodies to the handler.
pub struct TransportServer {
    /// Shutdown signal
    shutdown_tx: Option<mpsc::Sender<()>>,
    /// Server task handle
    handle: Option<tokio::task::JoinHandle<()>>,
    /// Actual bound port
    port: u16,
}

impl TransportServer {
    /// Start the transport server with the given request handler.
    pub async fn start<H: RequestHandler>(
        config: TransportConfig,
        handler: H,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        Self::start_shared(config, Arc::new(handler)).await
    }

    /// Start with a handler that is also used elsewhere.
    pub async fn start_shared<H: RequestHandler>(
        config: TransportConfig,
        handler: Arc<H>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);

        let app = router(handler, &config);

        let addr: SocketAddr = format!("{}:{}", config.hostname, config.port).parse()?;
        let listener = tokio::net::TcpListener::bind(addr).await?;
        let actual_port = listener.local_addr()?.port();

        info!("JSON-RPC transport listening on http://{}:{}/", config.hostname, actual_port);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.recv().await;
                })
                .await
                .ok();
        });

        Ok(Self {
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
            port: actual_port,
        })
    }

    /// Get the actual bound port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Gracefully stop the server.
    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(()).await;
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
        info!("JSON-RPC transport server stopped");
    }
}

/// Build the HTTP routes for a handler.
pub fn router<H: RequestHandler>(handler: Arc<H>, config: &TransportConfig) -> Router {
    let state = Arc::new(AppState { handler });

    Router::new()
        .route("/health", get(health_handler::<H>))
        .route("/", post(rpc_handler::<H>))
        .route("/{*path}", post(rpc_handler::<H>))
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ─────────────────────────────────────────────────────────────────────────────
// HTTP Handlers
// ─────────────────────────────────────────────────────────────────────────────

async fn rpc_handler<H: RequestHandler>(
    State(state): State<Arc<AppState<H>>>,
    body: Bytes,
) -> Response {
    let handler = state.handler.clone();
    let content_type = handler.content_type();

    let body = match tokio::task::spawn_blocking(move || handler.handle_body(&body)).await {
        Ok(body) => body,
        Err(e) => {
            error!("Request task failed: {e}");
            RpcError::internal(format!("Task join error: {e}"))
                .as_response()
                .to_string()
                .into_bytes()
        }
    };

    ([(header::CONTENT_TYPE, content_type)], body).into_response()
}

async fn health_handler<H: RequestHandler>(
    State(state): State<Arc<AppState<H>>>,
) -> impl IntoResponse {
    let mut health = json!({ "status": "ok" });
    if let (Some(obj), Value::Object(extra)) = (health.as_object_mut(), state.handler.status()) {
        obj.extend(extra);
    }
    Json(health)
}
