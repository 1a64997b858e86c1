//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use crew_domain::{ConfigIssue, Severity};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Project-level config file names, checked in order
const PROJECT_FILES: &[&str] = &["review-crew.toml", ".review-crew.toml"];

/// Prefix for structured environment overrides, e.g. `REVIEW_CREW_LLM__MODEL`
const ENV_PREFIX: &str = "REVIEW_CREW_";

/// Unprefixed environment variables kept for compatibility with existing
/// deployments, and the config keys they map to.
const LEGACY_ENV: &[(&str, &str)] = &[
    ("LLM_PROVIDER", "llm.provider"),
    ("LLM_MODEL", "llm.model"),
    ("HOST", "server.host"),
    ("PORT", "server.port"),
    ("CORS_ORIGINS", "server.cors_origins"),
    ("MAX_UPLOAD_SIZE", "review.max_upload_size"),
    ("ALLOWED_EXTENSIONS", "review.allowed_extensions"),
    ("GITHUB_MAX_FILES", "github.max_files"),
    ("GITHUB_DEFAULT_FILES", "github.default_files"),
];

/// Configuration could not be loaded or is unusable
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read configuration: {0}")]
    Extract(#[from] Box<figment::Error>),

    #[error("invalid configuration:\n{}", format_issues(.0))]
    Invalid(Vec<ConfigIssue>),
}

fn format_issues(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .filter(|i| i.severity == Severity::Error)
        .map(|i| format!("  - {}", i.message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Environment (`REVIEW_CREW_<SECTION>__<KEY>`, then legacy names)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./review-crew.toml` or `./.review-crew.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/review-crew/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        Self::figment(config_path).extract().map_err(Box::new)
    }

    /// Load, then reject configurations with Error-severity issues.
    ///
    /// Warnings are returned alongside the config for the caller to report.
    pub fn load_validated(
        config_path: Option<&PathBuf>,
    ) -> Result<(FileConfig, Vec<ConfigIssue>), ConfigLoadError> {
        let config = Self::load(config_path)?;
        let issues = config.validate();
        Self::check(config, issues)
    }

    /// Split issues into fatal and non-fatal.
    pub fn check(
        config: FileConfig,
        issues: Vec<ConfigIssue>,
    ) -> Result<(FileConfig, Vec<ConfigIssue>), ConfigLoadError> {
        if ConfigIssue::has_errors(&issues) {
            return Err(ConfigLoadError::Invalid(issues));
        }
        Ok((config, issues))
    }

    fn figment(config_path: Option<&PathBuf>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        // Add global config (XDG or fallback)
        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(&global_path));
        }

        // Add project-level config file (first name found)
        if let Some(path) = Self::project_config_path() {
            figment = figment.merge(Toml::file(&path));
        }

        // Add explicit config path (highest priority for files)
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .merge(Self::legacy_env())
    }

    fn legacy_env() -> Env {
        let names: Vec<&str> = LEGACY_ENV.iter().map(|(name, _)| *name).collect();
        Env::raw().only(&names).map(|key| {
            LEGACY_ENV
                .iter()
                .find(|(name, _)| key == *name)
                .map(|(_, target)| (*target).into())
                .unwrap_or_else(|| key.as_str().to_string().into())
        })
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Get the global config file path
    ///
    /// Returns XDG_CONFIG_HOME/review-crew/config.toml if set,
    /// otherwise the platform config directory.
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("review-crew").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        Self::project_config_in(Path::new("."))
    }

    fn project_config_in(dir: &Path) -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources(config_path: Option<&PathBuf>) {
        println!("Configuration sources (in priority order):");

        println!("  [ENV  ] {}<SECTION>__<KEY>, LLM_PROVIDER, LLM_MODEL, HOST, PORT", ENV_PREFIX);

        if let Some(path) = config_path {
            let mark = if path.exists() { "FOUND" } else { "MISSING" };
            println!("  [{:<5}] Explicit: {}", mark, path.display());
        }

        // Project config
        if let Some(path) = Self::project_config_path() {
            println!("  [FOUND] Project: {}", path.display());
        } else {
            println!("  [     ] Project: ./review-crew.toml or ./.review-crew.toml");
        }

        // Global config
        if let Some(path) = Self::global_config_path() {
            if path.exists() {
                println!("  [FOUND] Global:  {}", path.display());
            } else {
                println!("  [     ] Global:  {}", path.display());
            }
        }

        println!("  [     ] Default: built-in defaults");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crew_domain::ConfigIssueCode;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.llm.model, "gpt-5-nano");
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_global_config_path_returns_some() {
        // Should return a path (even if file doesn't exist)
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("review-crew"));
    }

    #[test]
    fn test_explicit_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "[llm]\nmodel = \"gpt-4o\"\n\n[github]\ndefault_files = 2\n",
        )
        .unwrap();

        let config: FileConfig = Figment::new()
            .merge(Serialized::defaults(FileConfig::default()))
            .merge(Toml::file(&path))
            .extract()
            .unwrap();
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.github.default_files, 2);
        assert_eq!(config.github.max_files, 50);
    }

    #[test]
    fn test_project_config_lookup_order() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ConfigLoader::project_config_in(dir.path()).is_none());

        std::fs::write(dir.path().join(".review-crew.toml"), "").unwrap();
        assert_eq!(
            ConfigLoader::project_config_in(dir.path()).unwrap(),
            dir.path().join(".review-crew.toml")
        );

        std::fs::write(dir.path().join("review-crew.toml"), "").unwrap();
        assert_eq!(
            ConfigLoader::project_config_in(dir.path()).unwrap(),
            dir.path().join("review-crew.toml")
        );
    }

    #[test]
    fn test_check_rejects_errors_and_keeps_warnings() {
        let config = FileConfig::default();
        let warning = ConfigIssue::warning(
            ConfigIssueCode::InvalidValue {
                field: "x".to_string(),
            },
            "just a warning",
        );
        let (_, issues) = ConfigLoader::check(config.clone(), vec![warning]).unwrap();
        assert_eq!(issues.len(), 1);

        let error = ConfigIssue::error(
            ConfigIssueCode::EmptyField {
                field: "llm.model".to_string(),
            },
            "llm.model cannot be empty",
        );
        let err = ConfigLoader::check(config, vec![error]).unwrap_err();
        assert!(err.to_string().contains("llm.model cannot be empty"));
    }
}
