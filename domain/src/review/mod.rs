//! Review outcomes: stage results, findings and the persisted report.

pub mod findings;
pub mod report;
pub mod result;
