//! Source ingestion adapters
//!
//! - [`LocalSourceLoader`]: single files from the local file system
//! - [`GitSourceRepository`]: files from a shallow clone of a remote repository

pub mod git;
pub mod local;

pub use git::GitSourceRepository;
pub use local::LocalSourceLoader;
