use std::path::PathBuf;

/// Failures the user can act on. Everything else travels as `anyhow::Error`.
#[derive(Debug, thiserror::Error)]
pub enum QscaleError {
    #[error("Core path {0} does not exist.")]
    CorePathMissing(PathBuf),

    #[error("Integration path {0} does not exist.")]
    IntegrationPathMissing(PathBuf),

    #[error("Rules file {0} does not exist.")]
    RulesFileMissing(PathBuf),

    #[error("Report path {0} does not exist.")]
    ReportMissing(PathBuf),

    #[error("Manifest {path} is invalid: {reason}")]
    InvalidManifest { path: PathBuf, reason: String },

    #[error("Integration quality scale {0} is not supported.")]
    UnsupportedScale(String),

    #[error("Rule '{rule}' has unknown quality tier '{tier}'")]
    UnknownTier { rule: String, tier: String },

    #[error("No token file found. Please create a .token file with your API key.")]
    MissingApiKey,

    #[error("Gemini API error ({status}): {message}")]
    Api { status: u16, message: String },
}
