//! Local file system source loader

use async_trait::async_trait;
use crew_application::ports::source_loader::{IngestionError, SourceLoader};
use crew_domain::{DomainError, SourceDocument, SourcePolicy};
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// Reads a single source file, applying the upload policy to it.
#[derive(Debug, Clone, Default)]
pub struct LocalSourceLoader {
    policy: SourcePolicy,
}

impl LocalSourceLoader {
    pub fn new(policy: SourcePolicy) -> Self {
        Self { policy }
    }
}

#[async_trait]
impl SourceLoader for LocalSourceLoader {
    async fn load_path(&self, path: &Path) -> Result<SourceDocument, IngestionError> {
        let metadata = tokio::fs::metadata(path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => IngestionError::NotFound(path.to_path_buf()),
            _ => IngestionError::Unreadable {
                path: path.to_path_buf(),
                source: e,
            },
        })?;

        if !metadata.is_file() {
            return Err(IngestionError::NotAFile(path.to_path_buf()));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        self.policy.check_name(&name)?;
        self.policy.check_size(&name, metadata.len())?;

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| IngestionError::Unreadable {
                path: path.to_path_buf(),
                source: e,
            })?;
        let content = String::from_utf8(bytes).map_err(|_| DomainError::NotUtf8(name.clone()))?;

        debug!("Loaded {} ({} bytes)", path.display(), content.len());
        Ok(SourceDocument::try_new(
            name,
            path.display().to_string(),
            content,
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn loader() -> LocalSourceLoader {
        LocalSourceLoader::new(SourcePolicy::default())
    }

    #[tokio::test]
    async fn test_loads_python_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calc.py");
        fs::write(&path, "def divide(a, b):\n    return a / b\n").unwrap();

        let doc = loader().load_path(&path).await.unwrap();
        assert_eq!(doc.name, "calc.py");
        assert_eq!(doc.location, path.display().to_string());
        assert_eq!(doc.line_count(), 2);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = loader()
            .load_path(&dir.path().join("nope.py"))
            .await
            .unwrap_err();
        assert!(matches!(err, IngestionError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = loader().load_path(dir.path()).await.unwrap_err();
        assert!(matches!(err, IngestionError::NotAFile(_)));
    }

    #[tokio::test]
    async fn test_blank_file_is_empty_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.py");
        fs::write(&path, "  \n\n").unwrap();

        let err = loader().load_path(&path).await.unwrap_err();
        assert!(matches!(
            err,
            IngestionError::Invalid(DomainError::EmptySource(ref name)) if name == "blank.py"
        ));
    }

    #[tokio::test]
    async fn test_wrong_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "hello").unwrap();

        let err = loader().load_path(&path).await.unwrap_err();
        assert!(matches!(
            err,
            IngestionError::Invalid(DomainError::UnsupportedExtension { .. })
        ));
    }

    #[tokio::test]
    async fn test_size_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.py");
        fs::write(&path, "x = 1\n".repeat(10)).unwrap();

        let loader = LocalSourceLoader::new(SourcePolicy::new(vec![".py".to_string()], 16));
        let err = loader.load_path(&path).await.unwrap_err();
        assert!(matches!(
            err,
            IngestionError::Invalid(DomainError::SourceTooLarge { size: 60, limit: 16, .. })
        ));
    }

    #[tokio::test]
    async fn test_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bin.py");
        fs::write(&path, [0xff, 0xfe, 0x00, 0x41]).unwrap();

        let err = loader().load_path(&path).await.unwrap_err();
        assert!(matches!(err, IngestionError::Invalid(DomainError::NotUtf8(_))));
    }
}
