//! Source ingestion types: documents, policies and requests.

pub mod document;
pub mod policy;
pub mod request;
