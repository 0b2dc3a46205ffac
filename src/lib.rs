// Qscale - Home Assistant Integration Quality Scale checker
// Reviews integration code against quality scale rules with Gemini and drafts patches

pub mod cli;
pub mod context;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod parser;
pub mod services;

pub use anyhow::{Context, Result};
pub use colored::Colorize;

// Re-export commonly used types
pub use context::IntegrationContext;
pub use error::QscaleError;
pub use models::{QscaleConfig, QualityTier, RuleStatus, RuleTaxonomy, RulesReport};
