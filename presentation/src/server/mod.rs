//! HTTP API
//!
//! ```text
//! GET  /                    index.html from the static dir, or an API banner
//! GET  /health              liveness probe
//! POST /api/review/upload   multipart `file`
//! POST /api/review/github   form `repo_url`, `selected_files`
//! GET  /api/files/list      `?repo_url=`
//! GET  /static/*            static assets
//! ```

pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::create_router;
pub use state::{AppState, ServerSettings};

use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(router: Router, addr: &str) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down");
    }
}
