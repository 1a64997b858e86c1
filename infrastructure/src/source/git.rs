//! Repository source backed by `git clone --depth 1`.
//!
//! Every call clones into a fresh temporary directory that is removed when
//! the call returns, so nothing is cached between requests.

use async_trait::async_trait;
use crew_application::ports::source_loader::IngestionError;
use crew_application::ports::source_repository::SourceRepository;
use crew_domain::{SourceDocument, SourceFile, SourcePolicy};
use glob::{MatchOptions, Pattern};
use std::path::{Component, Path};
use std::process::Stdio;
use std::time::Duration;
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, info, warn};
use url::Url;

pub struct GitSourceRepository {
    policy: SourcePolicy,
    max_files: usize,
    default_files: usize,
    clone_timeout: Duration,
}

impl GitSourceRepository {
    pub fn new(policy: SourcePolicy, max_files: usize, default_files: usize) -> Self {
        Self {
            policy,
            max_files,
            default_files,
            clone_timeout: Duration::from_secs(120),
        }
    }

    pub fn with_clone_timeout(mut self, timeout: Duration) -> Self {
        self.clone_timeout = timeout;
        self
    }

    async fn checkout(&self, url: &Url) -> Result<TempDir, IngestionError> {
        if which::which("git").is_err() {
            return Err(IngestionError::GitUnavailable);
        }

        let dir = tempfile::Builder::new()
            .prefix("review-crew-")
            .tempdir()
            .map_err(|e| IngestionError::Io(e.to_string()))?;

        info!("Cloning {}", url);
        let mut cmd = Command::new("git");
        cmd.arg("clone")
            .arg("--depth")
            .arg("1")
            .arg("--quiet")
            .arg(url.as_str())
            .arg(dir.path())
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.clone_timeout, cmd.output())
            .await
            .map_err(|_| IngestionError::CloneFailed {
                url: url.to_string(),
                message: format!("timed out after {}s", self.clone_timeout.as_secs()),
            })?
            .map_err(|e| IngestionError::CloneFailed {
                url: url.to_string(),
                message: format!("failed to execute git: {}", e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(IngestionError::CloneFailed {
                url: url.to_string(),
                message: stderr.trim().to_string(),
            });
        }

        Ok(dir)
    }

    /// Resolve the files to review: the first `default_files` discovered
    /// files when nothing was selected, otherwise the selection as given.
    fn resolve_selection(
        &self,
        discovered: &[SourceFile],
        selected: &[String],
    ) -> Result<Vec<String>, IngestionError> {
        if selected.is_empty() {
            return Ok(discovered
                .iter()
                .take(self.default_files)
                .map(|f| f.path.clone())
                .collect());
        }
        if selected.len() > self.max_files {
            return Err(IngestionError::TooManyFiles {
                selected: selected.len(),
                max: self.max_files,
            });
        }
        Ok(selected.to_vec())
    }

    /// Read selected files from a checkout, skipping any that cannot be used.
    async fn read_selected(&self, root: &Path, paths: &[String]) -> Vec<(String, String)> {
        let mut files = Vec::with_capacity(paths.len());
        for rel in paths {
            let Some(full) = contained_path(root, rel) else {
                warn!("Skipping {}: not a file inside the repository", rel);
                continue;
            };
            if !self.policy.allows(rel) {
                warn!("Skipping {}: extension not allowed", rel);
                continue;
            }
            let bytes = match tokio::fs::read(&full).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!("Skipping {}: {}", rel, e);
                    continue;
                }
            };
            if let Err(e) = self.policy.check_size(rel, bytes.len() as u64) {
                warn!("Skipping {}: {}", rel, e);
                continue;
            }
            match String::from_utf8(bytes) {
                Ok(text) => files.push((rel.clone(), text)),
                Err(_) => warn!("Skipping {}: not valid UTF-8", rel),
            }
        }
        files
    }
}

#[async_trait]
impl SourceRepository for GitSourceRepository {
    async fn list_files(&self, repo_url: &str) -> Result<Vec<SourceFile>, IngestionError> {
        let url = parse_repo_url(repo_url)?;
        let checkout = self.checkout(&url).await?;
        discover_files(checkout.path(), &self.policy)
    }

    async fn fetch(
        &self,
        repo_url: &str,
        selected: &[String],
    ) -> Result<SourceDocument, IngestionError> {
        let url = parse_repo_url(repo_url)?;
        if selected.len() > self.max_files {
            return Err(IngestionError::TooManyFiles {
                selected: selected.len(),
                max: self.max_files,
            });
        }

        let checkout = self.checkout(&url).await?;
        let discovered = discover_files(checkout.path(), &self.policy)?;
        if discovered.is_empty() {
            return Err(IngestionError::NoMatchingFiles(repo_url.to_string()));
        }

        let paths = self.resolve_selection(&discovered, selected)?;
        let files = self.read_selected(checkout.path(), &paths).await;
        if files.is_empty() {
            return Err(IngestionError::NoMatchingFiles(repo_url.to_string()));
        }

        debug!("Combining {} files from {}", files.len(), url);
        Ok(SourceDocument::combine_repository(
            &repo_name(&url),
            repo_url,
            files,
        )?)
    }
}

/// Accept only `http(s)` URLs with a host.
pub fn parse_repo_url(raw: &str) -> Result<Url, IngestionError> {
    let invalid = |reason: &str| IngestionError::InvalidRepositoryUrl {
        url: raw.to_string(),
        reason: reason.to_string(),
    };

    let url = Url::parse(raw.trim()).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(invalid("missing host"));
    }
    Ok(url)
}

/// Last path segment of the URL without a `.git` suffix.
pub fn repo_name(url: &Url) -> String {
    let segment = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .unwrap_or("repository");
    segment.strip_suffix(".git").unwrap_or(segment).to_string()
}

/// Files under `root` with an allowed extension, sorted by relative path.
///
/// Hidden entries (including `.git`) are skipped.
pub fn discover_files(root: &Path, policy: &SourcePolicy) -> Result<Vec<SourceFile>, IngestionError> {
    let pattern = format!("{}/**/*", Pattern::escape(&root.to_string_lossy()));
    let options = MatchOptions {
        require_literal_leading_dot: true,
        ..MatchOptions::new()
    };
    let entries =
        glob::glob_with(&pattern, options).map_err(|e| IngestionError::Io(e.to_string()))?;

    let mut files = Vec::new();
    for path in entries.flatten() {
        if !path.is_file() {
            continue;
        }
        let Ok(rel) = path.strip_prefix(root) else {
            continue;
        };
        let parts: Vec<_> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect();
        if parts.iter().any(|p| p.starts_with('.')) {
            continue;
        }
        let rel = parts.join("/");
        if !policy.allows(&rel) {
            continue;
        }
        let size = path.metadata().map(|m| m.len()).unwrap_or(0);
        files.push(SourceFile::new(rel, size));
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

/// Join a user-supplied relative path onto `root`, refusing anything that
/// could leave it.
fn contained_path(root: &Path, rel: &str) -> Option<std::path::PathBuf> {
    let rel_path = Path::new(rel);
    if rel.is_empty()
        || rel_path
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return None;
    }

    let full = root.join(rel_path);
    let canonical_root = root.canonicalize().ok()?;
    let canonical = full.canonicalize().ok()?;
    canonical.starts_with(&canonical_root).then_some(canonical)
}
