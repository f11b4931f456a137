//! HTTP server startup with lifecycle management and graceful shutdown.

mod error;
mod http_server;
mod lifecycle;
mod shutdown;

use axum::Router;
pub use error::{ServerError, ServerResult};
use http_server::serve_http;
use tokio_util::sync::CancellationToken;

use crate::config::ServerConfig;

/// Serves `app` until a shutdown signal arrives or `shutdown` is cancelled.
///
/// The token is cancelled when a signal is received, so other background
/// tasks can stop together with the server.
///
/// # Errors
///
/// Returns an error if:
/// - Cannot bind to the specified address/port
/// - Server encounters a fatal error during operation
pub async fn serve(
    app: Router,
    config: ServerConfig,
    shutdown: CancellationToken,
) -> ServerResult<()> {
    serve_http(app, config, shutdown).await
}
