//! Core domain concepts shared across all subdomains.
//!
//! - [`model::Model`]: LLM models a review can run against
//! - [`error::DomainError`]: domain-level errors

pub mod error;
pub mod model;
pub mod string;
