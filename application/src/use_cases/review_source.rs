//! Review Source use case
//!
//! Ingest → run the pipeline → compose the report → persist it.

use super::run_review::{RunReviewError, RunReviewUseCase};
use crate::ports::llm_gateway::LlmGateway;
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::ports::report_store::{ReportStore, ReportStoreError, SavedReport};
use crate::ports::source_loader::{IngestionError, SourceLoader};
use crate::ports::source_repository::SourceRepository;
use chrono::Local;
use crew_domain::{
    Report, ReviewRequest, ReviewResult, SourceDocument, SourceFile, SourceOrigin, SourcePolicy,
};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Everything that can go wrong while serving a review request
#[derive(Error, Debug)]
pub enum ReviewError {
    #[error(transparent)]
    Ingestion(#[from] IngestionError),

    #[error(transparent)]
    Pipeline(#[from] RunReviewError),

    #[error(transparent)]
    Write(#[from] ReportStoreError),
}

/// Result of a successful review
#[derive(Debug, Clone)]
pub struct ReviewOutcome {
    /// Display name of the reviewed source
    pub source_name: String,
    /// Files that went into the review
    pub files: Vec<String>,
    pub result: ReviewResult,
    pub report: Report,
    pub saved: SavedReport,
}

/// Use case serving one review request end to end
pub struct ReviewSourceUseCase<G: LlmGateway + ?Sized + 'static> {
    runner: RunReviewUseCase<G>,
    loader: Arc<dyn SourceLoader>,
    repository: Arc<dyn SourceRepository>,
    store: Arc<dyn ReportStore>,
    policy: SourcePolicy,
}

impl<G: LlmGateway + ?Sized + 'static> ReviewSourceUseCase<G> {
    pub fn new(
        runner: RunReviewUseCase<G>,
        loader: Arc<dyn SourceLoader>,
        repository: Arc<dyn SourceRepository>,
        store: Arc<dyn ReportStore>,
        policy: SourcePolicy,
    ) -> Self {
        Self {
            runner,
            loader,
            repository,
            store,
            policy,
        }
    }

    pub fn runner(&self) -> &RunReviewUseCase<G> {
        &self.runner
    }

    pub fn policy(&self) -> &SourcePolicy {
        &self.policy
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(&self, request: ReviewRequest) -> Result<ReviewOutcome, ReviewError> {
        self.execute_with_progress(request, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        request: ReviewRequest,
        progress: &dyn ProgressNotifier,
    ) -> Result<ReviewOutcome, ReviewError> {
        info!("Review requested for {}", request.origin.describe());

        let source = self.ingest(&request.origin).await?;
        let result = self.runner.execute_with_progress(&source, progress).await?;

        let report = Report::compose(&result.source_name, result.final_output(), Local::now());
        let (report, saved) = self.save(report, request.output_dir).await?;
        info!(
            "Report saved to {} ({})",
            saved.markdown_path.display(),
            report.summary
        );

        Ok(ReviewOutcome {
            source_name: source.name,
            files: source.files,
            result,
            report,
            saved,
        })
    }

    /// Reviewable files in a repository, sorted by path
    pub async fn list_repository_files(
        &self,
        repo_url: &str,
    ) -> Result<Vec<SourceFile>, IngestionError> {
        self.repository.list_files(repo_url).await
    }

    /// Persist off the async workers; the store does blocking file I/O.
    async fn save(
        &self,
        report: Report,
        output_dir: Option<PathBuf>,
    ) -> Result<(Report, SavedReport), ReportStoreError> {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || {
            let saved = store.save(&report, output_dir.as_deref())?;
            Ok((report, saved))
        })
        .await
        .map_err(|e| ReportStoreError::Task(e.to_string()))?
    }

    async fn ingest(&self, origin: &SourceOrigin) -> Result<SourceDocument, IngestionError> {
        match origin {
            SourceOrigin::LocalPath(path) => self.loader.load_path(path).await,
            SourceOrigin::Upload { filename, bytes } => {
                Ok(SourceDocument::from_upload(filename, bytes, &self.policy)?)
            }
            SourceOrigin::Repository {
                repo_url,
                selected_files,
            } => self.repository.fetch(repo_url, selected_files).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReviewParams;
    use crate::ports::llm_gateway::GatewayError;
    use crate::use_cases::testing::{ScriptedGateway, sample_crew};
    use async_trait::async_trait;
    use crew_domain::{DomainError, FindingSeverity, StageId};
    use std::path::Path;
    use std::sync::Mutex;

    const DIVIDE: &str = "def average(values):\n    total = sum(values)\n    return total / len(values)\n";
    const DIVIDE_INLINE: &str = "def divide(a,b): return a/b\n\nprint(divide(10,0))\n";
    const SQL: &str = "def find_user(cursor, name):\n    query = \"SELECT * FROM users WHERE name = '\" + name + \"'\"\n    cursor.execute(query)\n";

    /// Loader serving fixed files from memory
    struct MemoryLoader {
        files: Vec<(&'static str, &'static str)>,
    }

    #[async_trait]
    impl SourceLoader for MemoryLoader {
        async fn load_path(&self, path: &Path) -> Result<SourceDocument, IngestionError> {
            let name = path.to_string_lossy().to_string();
            let (_, content) = self
                .files
                .iter()
                .find(|(n, _)| *n == name)
                .ok_or_else(|| IngestionError::NotFound(path.to_path_buf()))?;
            Ok(SourceDocument::try_new(name.clone(), name, *content)?)
        }
    }

    struct MemoryRepository {
        files: Vec<(&'static str, &'static str)>,
    }

    #[async_trait]
    impl SourceRepository for MemoryRepository {
        async fn list_files(&self, _repo_url: &str) -> Result<Vec<SourceFile>, IngestionError> {
            Ok(self
                .files
                .iter()
                .map(|(p, c)| SourceFile::new(*p, c.len() as u64))
                .collect())
        }

        async fn fetch(
            &self,
            repo_url: &str,
            selected: &[String],
        ) -> Result<SourceDocument, IngestionError> {
            let picked: Vec<(String, String)> = self
                .files
                .iter()
                .filter(|(p, _)| selected.is_empty() || selected.iter().any(|s| s == p))
                .map(|(p, c)| (p.to_string(), c.to_string()))
                .collect();
            if picked.is_empty() {
                return Err(IngestionError::NoMatchingFiles(repo_url.to_string()));
            }
            Ok(SourceDocument::combine_repository("repo", repo_url, picked)?)
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        saved: Mutex<Vec<Report>>,
    }

    impl ReportStore for MemoryStore {
        fn save(
            &self,
            report: &Report,
            output_dir: Option<&Path>,
        ) -> Result<SavedReport, ReportStoreError> {
            let dir = output_dir.unwrap_or(Path::new("reports"));
            let mut saved = self.saved.lock().unwrap();
            saved.push(report.clone());
            let attempt = (saved.len() - 1) as u32;
            Ok(SavedReport {
                markdown_path: dir.join(report.markdown_file_name(attempt)),
                raw_path: dir.join(report.raw_file_name(attempt)),
            })
        }
    }

    /// One-based line number of the first source line containing `needle`
    fn line_of(source: &str, needle: &str) -> usize {
        source.lines().position(|l| l.contains(needle)).unwrap() + 1
    }

    /// Fake reviewer that reacts to what it sees in the prompt
    fn heuristic_gateway() -> ScriptedGateway {
        ScriptedGateway::new(|_, system, prompt| {
            let mut notes = Vec::new();
            if system.contains("Bug Detection") && prompt.contains("/ len(values)") {
                notes.push(format!(
                    "- **CRITICAL** (line {}): division by zero when `values` is empty; add a zero check",
                    line_of(DIVIDE, "/ len(values)")
                ));
            }
            if system.contains("Bug Detection")
                && prompt.contains("return a/b")
                && prompt.contains("divide(10,0)")
            {
                notes.push(format!(
                    "- **CRITICAL** (line {}): `a/b` raises ZeroDivisionError for `divide(10,0)` on line {}; add a zero check on `b`",
                    line_of(DIVIDE_INLINE, "return a/b"),
                    line_of(DIVIDE_INLINE, "divide(10,0)")
                ));
            }
            if system.contains("Security Analysis") && prompt.contains("\" + name + \"") {
                notes.push(format!(
                    "- **HIGH** (line {}): SQL injection via string concatenation; use parameterized queries",
                    line_of(SQL, "SELECT")
                ));
            }
            if system.contains("Documentation Review") {
                // Final report carries forward every earlier finding
                for line in prompt.lines() {
                    if line.contains("**CRITICAL**") || line.contains("**HIGH**") {
                        notes.push(line.to_string());
                    }
                }
                notes.push("- LOW: functions lack docstrings".to_string());
            }
            if notes.is_empty() {
                notes.push("- INFO: nothing notable".to_string());
            }
            Ok(notes.join("\n"))
        })
    }

    fn use_case(gateway: Arc<ScriptedGateway>) -> (ReviewSourceUseCase<ScriptedGateway>, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::default());
        let runner = RunReviewUseCase::new(gateway, sample_crew(), ReviewParams::default());
        let use_case = ReviewSourceUseCase::new(
            runner,
            Arc::new(MemoryLoader {
                files: vec![
                    ("divide.py", DIVIDE),
                    ("inline.py", DIVIDE_INLINE),
                    ("query.py", SQL),
                    ("blank.py", "   \n"),
                ],
            }),
            Arc::new(MemoryRepository {
                files: vec![("a.py", DIVIDE), ("b.py", SQL)],
            }),
            store.clone(),
            SourcePolicy::default(),
        );
        (use_case, store)
    }

    #[tokio::test]
    async fn test_divide_by_zero_is_flagged_with_line() {
        let gateway = Arc::new(heuristic_gateway());
        let (use_case, _) = use_case(gateway.clone());

        let outcome = use_case.execute(ReviewRequest::local("divide.py")).await.unwrap();

        let bug_output = outcome.result.output_of(StageId::BugDetector).unwrap();
        assert!(bug_output.to_lowercase().contains("zero check"));

        let severe: Vec<_> = outcome
            .report
            .findings
            .iter()
            .filter(|f| f.severity.is_severe())
            .collect();
        assert!(!severe.is_empty());
        assert!(severe.iter().all(|f| f.line.is_some()));
        assert_eq!(severe[0].line, Some(3));
        assert!(outcome.report.markdown.starts_with("# Code Review Report"));
        assert_eq!(
            outcome.saved.markdown_path,
            Path::new("reports").join(outcome.report.markdown_file_name(0))
        );
        assert!(outcome.report.markdown_file_name(0).starts_with("divide_review_"));
    }

    #[tokio::test]
    async fn test_one_line_divide_called_with_zero_is_flagged() {
        let gateway = Arc::new(heuristic_gateway());
        let (use_case, _) = use_case(gateway.clone());

        let outcome = use_case.execute(ReviewRequest::local("inline.py")).await.unwrap();

        let bug_output = outcome.result.output_of(StageId::BugDetector).unwrap();
        assert!(bug_output.contains("divide(10,0)"));
        assert!(bug_output.to_lowercase().contains("zero check"));

        let severe: Vec<_> = outcome
            .report
            .findings
            .iter()
            .filter(|f| f.severity.is_severe())
            .collect();
        assert!(!severe.is_empty());
        assert_eq!(severe[0].severity, FindingSeverity::Critical);
        assert_eq!(severe[0].line, Some(1));
        assert_eq!(
            outcome.report.summary.highest(),
            Some(FindingSeverity::Critical)
        );
    }

    #[tokio::test]
    async fn test_sql_concatenation_flagged_by_security_stage() {
        let gateway = Arc::new(heuristic_gateway());
        let (use_case, _) = use_case(gateway);

        let outcome = use_case.execute(ReviewRequest::local("query.py")).await.unwrap();

        let security = outcome.result.output_of(StageId::SecurityAnalyzer).unwrap();
        assert!(security.contains("SQL injection"));
        assert_eq!(
            outcome.report.summary.highest(),
            Some(FindingSeverity::High)
        );
    }

    #[tokio::test]
    async fn test_final_report_derives_from_last_stage() {
        let gateway = Arc::new(ScriptedGateway::numbered());
        let (use_case, store) = use_case(gateway);

        let outcome = use_case.execute(ReviewRequest::local("divide.py")).await.unwrap();

        assert_eq!(outcome.report.raw, "O4\n");
        assert!(outcome.report.markdown.ends_with("---\n\nO4\n"));
        assert_eq!(store.saved.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_blank_file_fails_before_any_llm_call() {
        let gateway = Arc::new(ScriptedGateway::numbered());
        let (use_case, store) = use_case(gateway.clone());

        let err = use_case.execute(ReviewRequest::local("blank.py")).await.unwrap_err();

        assert!(matches!(
            err,
            ReviewError::Ingestion(IngestionError::Invalid(DomainError::EmptySource(_)))
        ));
        assert_eq!(gateway.call_count(), 0);
        assert!(store.saved.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_file_fails_before_any_llm_call() {
        let gateway = Arc::new(ScriptedGateway::numbered());
        let (use_case, _) = use_case(gateway.clone());

        let err = use_case.execute(ReviewRequest::local("nope.py")).await.unwrap_err();
        assert!(matches!(err, ReviewError::Ingestion(IngestionError::NotFound(_))));
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn test_upload_with_wrong_extension_is_rejected() {
        let gateway = Arc::new(ScriptedGateway::numbered());
        let (use_case, _) = use_case(gateway.clone());

        let err = use_case
            .execute(ReviewRequest::upload("notes.txt", b"hello".to_vec()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ReviewError::Ingestion(IngestionError::Invalid(DomainError::UnsupportedExtension { .. }))
        ));
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn test_pipeline_failure_writes_nothing() {
        let gateway = Arc::new(ScriptedGateway::new(|idx, _, _| {
            if idx == 3 {
                Err(GatewayError::Timeout)
            } else {
                Ok("partial".to_string())
            }
        }));
        let (use_case, store) = use_case(gateway);

        let err = use_case
            .execute(ReviewRequest::upload("calc.py", DIVIDE.as_bytes().to_vec()))
            .await
            .unwrap_err();
        assert!(matches!(err, ReviewError::Pipeline(_)));
        assert!(store.saved.lock().unwrap().is_empty());
    }

    struct ExhaustedStore;

    impl ReportStore for ExhaustedStore {
        fn save(
            &self,
            report: &Report,
            _output_dir: Option<&Path>,
        ) -> Result<SavedReport, ReportStoreError> {
            Err(ReportStoreError::NamesExhausted(report.base_name.clone(), 100))
        }
    }

    #[tokio::test]
    async fn test_store_failure_is_write_error() {
        let runner = RunReviewUseCase::new(
            Arc::new(ScriptedGateway::numbered()),
            sample_crew(),
            ReviewParams::default(),
        );
        let use_case = ReviewSourceUseCase::new(
            runner,
            Arc::new(MemoryLoader {
                files: vec![("divide.py", DIVIDE)],
            }),
            Arc::new(MemoryRepository { files: vec![] }),
            Arc::new(ExhaustedStore),
            SourcePolicy::default(),
        );

        let err = use_case.execute(ReviewRequest::local("divide.py")).await.unwrap_err();
        assert!(matches!(
            err,
            ReviewError::Write(ReportStoreError::NamesExhausted(ref name, 100)) if name.starts_with("divide")
        ));
    }

    #[tokio::test]
    async fn test_repository_review_and_listing() {
        let gateway = Arc::new(ScriptedGateway::numbered());
        let (use_case, _) = use_case(gateway.clone());

        let files = use_case.list_repository_files("https://github.com/acme/repo").await.unwrap();
        assert_eq!(files.len(), 2);

        let outcome = use_case
            .execute(
                ReviewRequest::repository("https://github.com/acme/repo", vec!["b.py".to_string()])
                    .with_output_dir("out"),
            )
            .await
            .unwrap();
        assert_eq!(outcome.files, vec!["b.py"]);
        assert!(outcome.saved.markdown_path.starts_with("out"));
        assert!(gateway.calls()[0].prompt.contains("=== FILE: b.py ==="));
    }
}
