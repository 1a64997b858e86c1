//! Crew definition loading

mod loader;

pub use loader::{CrewLoadError, CrewLoader, LoadedCrew};
