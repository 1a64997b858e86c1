//! Source documents handed to the review pipeline

use super::policy::SourcePolicy;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// A file entry from a repository listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    /// Path relative to the repository root, `/`-separated
    pub path: String,
    pub size: u64,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, size: u64) -> Self {
        Self {
            path: path.into(),
            size,
        }
    }
}

/// The text under review (Value Object).
///
/// Either a single file or several repository files concatenated with
/// `=== FILE: <path> ===` separators. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDocument {
    /// Display name, used for report file names and `{code_file_name}`
    pub name: String,
    /// Path or repository URL, used for `{code_file_path}`
    pub location: String,
    pub content: String,
    /// Files the content was built from
    pub files: Vec<String>,
}

impl SourceDocument {
    /// Build a single-file document, rejecting blank content.
    pub fn try_new(
        name: impl Into<String>,
        location: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        let content = content.into();
        if content.trim().is_empty() {
            return Err(DomainError::EmptySource(name));
        }
        Ok(Self {
            files: vec![name.clone()],
            name,
            location: location.into(),
            content,
        })
    }

    /// Validate uploaded bytes against `policy` and decode them.
    pub fn from_upload(
        filename: &str,
        bytes: &[u8],
        policy: &SourcePolicy,
    ) -> Result<Self, DomainError> {
        let name = base_name(filename);
        if name.is_empty() {
            return Err(DomainError::EmptySource(filename.to_string()));
        }
        policy.check_name(&name)?;
        policy.check_size(&name, bytes.len() as u64)?;
        let text = std::str::from_utf8(bytes).map_err(|_| DomainError::NotUtf8(name.clone()))?;
        Self::try_new(name.clone(), name, text)
    }

    /// Concatenate repository files into one document.
    ///
    /// `files` are `(relative path, content)` pairs in review order.
    pub fn combine_repository(
        repo_name: &str,
        repo_url: &str,
        files: Vec<(String, String)>,
    ) -> Result<Self, DomainError> {
        let mut content = String::new();
        let mut paths = Vec::with_capacity(files.len());
        for (path, text) in files {
            content.push_str(&format!("\n\n=== FILE: {} ===\n{}\n", path, text));
            paths.push(path);
        }

        let mut doc = Self::try_new(repo_name, repo_url, content)?;
        doc.files = paths;
        Ok(doc)
    }

    /// Number of lines in the content.
    pub fn line_count(&self) -> usize {
        self.content.lines().count()
    }

    pub fn is_multi_file(&self) -> bool {
        self.files.len() > 1
    }

    /// Extension of the display name without the dot, e.g. `py`
    pub fn language_hint(&self) -> &str {
        match self.name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !self.is_multi_file() => ext,
            _ => "",
        }
    }
}

/// Final path component of an uploaded filename; clients may send full paths.
fn base_name(filename: &str) -> String {
    filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_content_rejected() {
        assert_eq!(
            SourceDocument::try_new("a.py", "/tmp/a.py", "  \n\t\n"),
            Err(DomainError::EmptySource("a.py".to_string()))
        );
    }

    #[test]
    fn test_line_count() {
        let doc = SourceDocument::try_new("a.py", "a.py", "x = 1\ny = 2\n").unwrap();
        assert_eq!(doc.line_count(), 2);
        assert_eq!(doc.language_hint(), "py");
        assert_eq!(doc.files, vec!["a.py"]);
    }

    #[test]
    fn test_from_upload_strips_client_path() {
        let policy = SourcePolicy::default();
        let doc = SourceDocument::from_upload("C:\\work\\calc.py", b"print(1)\n", &policy).unwrap();
        assert_eq!(doc.name, "calc.py");
    }

    #[test]
    fn test_from_upload_rejects_extension() {
        let policy = SourcePolicy::default();
        let err = SourceDocument::from_upload("readme.md", b"# hi", &policy).unwrap_err();
        assert!(matches!(err, DomainError::UnsupportedExtension { .. }));
    }

    #[test]
    fn test_from_upload_rejects_invalid_utf8() {
        let policy = SourcePolicy::default();
        let err = SourceDocument::from_upload("bin.py", &[0xff, 0xfe, 0x00], &policy).unwrap_err();
        assert_eq!(err, DomainError::NotUtf8("bin.py".to_string()));
    }

    #[test]
    fn test_from_upload_rejects_oversize() {
        let policy = SourcePolicy::new(vec![".py".to_string()], 4);
        let err = SourceDocument::from_upload("a.py", b"print(1)", &policy).unwrap_err();
        assert!(matches!(err, DomainError::SourceTooLarge { size: 8, .. }));
    }

    #[test]
    fn test_combine_repository_format() {
        let doc = SourceDocument::combine_repository(
            "demo",
            "https://github.com/acme/demo",
            vec![
                ("a.py".to_string(), "x = 1".to_string()),
                ("pkg/b.py".to_string(), "y = 2".to_string()),
            ],
        )
        .unwrap();

        assert_eq!(
            doc.content,
            "\n\n=== FILE: a.py ===\nx = 1\n\n\n=== FILE: pkg/b.py ===\ny = 2\n"
        );
        assert_eq!(doc.files, vec!["a.py", "pkg/b.py"]);
        assert!(doc.is_multi_file());
        assert_eq!(doc.language_hint(), "");
    }

    #[test]
    fn test_combine_repository_requires_files() {
        let err = SourceDocument::combine_repository("demo", "u", Vec::new()).unwrap_err();
        assert_eq!(err, DomainError::EmptySource("demo".to_string()));
    }
}
