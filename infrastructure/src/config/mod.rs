//! Configuration file loading for review-crew
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. Environment: `REVIEW_CREW_<SECTION>__<KEY>` and legacy names (`LLM_MODEL`, `PORT`, ...)
//! 2. `--config <path>` specified file
//! 3. Project root: `./review-crew.toml` or `./.review-crew.toml`
//! 4. Global: `$XDG_CONFIG_HOME/review-crew/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    FileAnthropicConfig, FileConfig, FileGithubConfig, FileLlmConfig, FileLoggingConfig,
    FileOpenAiConfig, FileOutputConfig, FileProvidersConfig, FileReviewConfig, FileServerConfig,
    KNOWN_PROVIDERS,
};
pub use loader::{ConfigLoadError, ConfigLoader};
