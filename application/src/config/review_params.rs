//! Review parameters: pipeline run control.
//!
//! [`ReviewParams`] groups the static parameters that control how
//! [`RunReviewUseCase`](crate::use_cases::run_review::RunReviewUseCase)
//! queries its gateway. These are application-layer concerns, not domain policy.

use crew_domain::Model;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Pipeline run parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewParams {
    /// Model every stage is sent to.
    pub model: Model,
    /// Upper bound for a single stage's completion; `None` waits forever.
    pub stage_timeout: Option<Duration>,
}

impl Default for ReviewParams {
    fn default() -> Self {
        Self {
            model: Model::default(),
            stage_timeout: Some(Duration::from_secs(300)),
        }
    }
}

impl ReviewParams {
    pub fn with_model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    pub fn with_stage_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.stage_timeout = timeout;
        self
    }

    /// `0` disables the timeout.
    pub fn with_timeout_seconds(self, seconds: u64) -> Self {
        let timeout = (seconds > 0).then(|| Duration::from_secs(seconds));
        self.with_stage_timeout(timeout)
    }
}
