pub mod config;
pub mod manifest;
pub mod scale;
pub mod status;

pub use config::{DocsConfig, GeminiConfig, QscaleConfig};
pub use manifest::{IntegrationManifest, ManifestScale};
pub use scale::{QualityTier, RuleTaxonomy};
pub use status::{RuleInfo, RuleStatus, RulesReport};
