use crate::error::QscaleError;
use crate::models::QualityTier;
use crate::Result;
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// Quality scale declared by an integration manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestScale {
    Tier(QualityTier),
    Legacy,
    Unknown,
}

impl ManifestScale {
    /// Parse the manifest value; anything other than a tier, `legacy` or `unknown` is rejected
    pub fn parse(value: &str) -> std::result::Result<Self, QscaleError> {
        let upper = value.to_uppercase();
        match upper.as_str() {
            "LEGACY" => Ok(ManifestScale::Legacy),
            "UNKNOWN" => Ok(ManifestScale::Unknown),
            other => QualityTier::from_name(other)
                .map(ManifestScale::Tier)
                .ok_or(QscaleError::UnsupportedScale(upper)),
        }
    }
}

impl fmt::Display for ManifestScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestScale::Tier(tier) => write!(f, "{}", tier),
            ManifestScale::Legacy => write!(f, "legacy"),
            ManifestScale::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawManifest {
    domain: Option<String>,
    name: Option<String>,
    quality_scale: Option<String>,
}

/// The parts of `manifest.json` this tool cares about
#[derive(Debug, Clone)]
pub struct IntegrationManifest {
    pub domain: Option<String>,
    pub name: Option<String>,
    pub quality_scale: ManifestScale,
}

impl IntegrationManifest {
    /// Load `manifest.json` from an integration directory
    pub fn load(integration_path: &Path) -> Result<Self> {
        let path = integration_path.join("manifest.json");
        let content = std::fs::read_to_string(&path).map_err(|e| QscaleError::InvalidManifest {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        let raw: RawManifest =
            serde_json::from_str(&content).map_err(|e| QscaleError::InvalidManifest {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        let quality_scale = match raw.quality_scale.as_deref() {
            Some(value) => ManifestScale::parse(value)?,
            None => ManifestScale::Unknown,
        };

        Ok(Self {
            domain: raw.domain,
            name: raw.name,
            quality_scale,
        })
    }

    /// Human-readable name, e.g. `Demo (demo)`; falls back to the directory name
    pub fn display_name(&self, integration: &str) -> String {
        match self.name.as_deref() {
            Some(name) if name != integration => format!("{} ({})", name, integration),
            _ => integration.to_string(),
        }
    }
}
