//! Dormitory application intake: a sectioned form wizard with validation
//! gating, create/update submission reconciliation, and timed notifications.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
