//! Disaster SNAP eligibility rules engine and its service scaffolding.

pub mod config;
pub mod eligibility;
pub mod error;
pub mod import;
pub mod telemetry;
