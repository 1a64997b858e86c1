//! Console output for review results

pub mod console;
pub mod formatter;
