//! Single-shot facility issue report: one section, one gate, one submit.

pub mod domain;
mod report;
pub mod schema;


pub use domain::{FacilityRequest, ReportField, ReporterContact, RequestStatus};
pub use report::{ReportOutcome, SingleShotReport};
