//! Shared server state

use crew_application::{LlmGateway, ReviewSourceUseCase};
use std::path::PathBuf;

/// Settings the router needs beyond the use case itself
#[derive(Debug, Clone)]
pub struct ServerSettings {
    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,
    /// Directory holding `index.html` and assets served under `/static`
    pub static_dir: PathBuf,
    /// Largest accepted request body in bytes
    pub body_limit: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            cors_origins: vec!["*".to_string()],
            static_dir: PathBuf::from("static"),
            body_limit: 10 * 1024 * 1024,
        }
    }
}

pub struct AppState {
    pub review: ReviewSourceUseCase<dyn LlmGateway>,
    pub settings: ServerSettings,
}

impl AppState {
    pub fn new(review: ReviewSourceUseCase<dyn LlmGateway>, settings: ServerSettings) -> Self {
        Self { review, settings }
    }
}
