//! Prompt domain
//!
//! Turns agent personas, task templates and prior stage outputs into the
//! prompts sent to each stage.

pub mod template;

pub use template::{KNOWN_PLACEHOLDERS, PromptTemplate, PromptVars, placeholders_in};
