//! Crew subdomain: the agents, tasks and stage order of a review pipeline.
//!
//! - [`stage::StageId`]: typed stage identifiers in execution order
//! - [`agent::AgentSpec`] / [`task::TaskSpec`]: immutable definitions
//! - [`definition::CrewDefinition`]: validated set of both
//! - [`validation`]: structured configuration issues

pub mod agent;
pub mod definition;
pub mod stage;
pub mod task;
pub mod validation;
