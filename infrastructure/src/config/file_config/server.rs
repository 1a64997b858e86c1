//! HTTP server configuration from TOML (`[server]` section)

use super::string_or_list;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileServerConfig {
    /// Bind address (env: `HOST`)
    pub host: String,
    /// Bind port (env: `PORT`)
    pub port: u16,
    /// Allowed CORS origins; `*` allows any (env: `CORS_ORIGINS`, comma-separated)
    #[serde(deserialize_with = "string_or_list")]
    pub cors_origins: Vec<String>,
    /// Directory holding `index.html` and other static assets
    pub static_dir: PathBuf,
}

impl Default for FileServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["*".to_string()],
            static_dir: PathBuf::from("static"),
        }
    }
}

impl FileServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|o| o.trim() == "*")
    }
}
