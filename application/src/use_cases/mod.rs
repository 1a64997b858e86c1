//! Use cases (application services)

pub mod review_source;
pub mod run_review;

#[cfg(test)]
pub(crate) mod testing;
