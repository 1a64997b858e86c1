//! Router construction

use super::handlers;
use super::state::AppState;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Multipart framing on top of the largest accepted file
const MULTIPART_OVERHEAD: usize = 64 * 1024;

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.iter().any(|o| o.trim() == "*") {
        return layer.allow_origin(Any);
    }

    let values: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(values))
}

/// Create the complete router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    let settings = state.settings.clone();

    let api_routes = Router::new()
        .route("/review/upload", post(handlers::review_upload))
        .route("/review/github", post(handlers::review_github))
        .route("/files/list", get(handlers::list_files));

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .nest("/api", api_routes)
        .nest_service("/static", ServeDir::new(&settings.static_dir))
        .with_state(state)
        .layer(DefaultBodyLimit::max(
            settings.body_limit.saturating_add(MULTIPART_OVERHEAD),
        ))
        .layer(cors_layer(&settings.cors_origins))
        .layer(TraceLayer::new_for_http())
}
