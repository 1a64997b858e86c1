//! Progress notification port
//!
//! Defines the interface for reporting progress during a review run.

use crew_domain::{SourceDocument, StageId};

/// Callback for progress updates during a review
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (spinner, plain log lines, nothing).
pub trait ProgressNotifier: Send + Sync {
    /// Called once the source is loaded, before the first stage
    fn on_review_start(&self, source: &SourceDocument, total_stages: usize);

    /// Called when a stage is about to query its agent
    fn on_stage_start(&self, stage: StageId, role: &str);

    /// Called when a stage finishes, successfully or not
    fn on_stage_complete(&self, stage: StageId, success: bool);

    /// Called when the whole pipeline finishes
    fn on_review_complete(&self, _success: bool) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_review_start(&self, _source: &SourceDocument, _total_stages: usize) {}
    fn on_stage_start(&self, _stage: StageId, _role: &str) {}
    fn on_stage_complete(&self, _stage: StageId, _success: bool) {}
}
