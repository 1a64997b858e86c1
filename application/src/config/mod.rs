//! Application-level configuration.
//!
//! - [`ReviewParams`]: model selection and per-stage timeout

pub mod review_params;

pub use review_params::ReviewParams;
