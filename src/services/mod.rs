//! Service layer for qscale
//!
//! The review and patch pipelines. CLI commands validate arguments, build the
//! HTTP clients and call into these functions; tests call them directly with a
//! stub model.

pub mod patch_service;
pub mod review_service;

pub use patch_service::{generate_patch, PatchOutcome};
pub use review_service::{
    generate_reports, prepare, select_rules, ReviewOptions, ReviewPlan, RuleSelection,
    SelectedRule,
};
