//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod conversation_logger;
pub mod llm_gateway;
pub mod progress;
pub mod report_store;
pub mod source_loader;
pub mod source_repository;
