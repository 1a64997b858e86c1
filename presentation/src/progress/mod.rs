//! Progress display during a review

pub mod reporter;
