use crate::error::QscaleError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "qscale.toml";

/// Environment variable used when no token file exists
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

// =============================================================================
// Model Configuration
// =============================================================================

/// Gemini API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// REST base URL (default: "https://generativelanguage.googleapis.com/v1beta")
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
    /// Model used with --free-model
    #[serde(default = "default_free_model")]
    pub free_model: String,
    /// Model used for reviews by default
    #[serde(default = "default_paid_model")]
    pub paid_model: String,
    /// Model used to generate patches
    #[serde(default = "default_patch_model")]
    pub patch_model: String,
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_free_model() -> String {
    "gemini-2.5-flash-preview-04-17".to_string()
}

fn default_paid_model() -> String {
    "gemini-2.5-pro-preview-05-06".to_string()
}

fn default_patch_model() -> String {
    "gemini-2.5-pro-exp-03-25".to_string()
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: default_gemini_base_url(),
            free_model: default_free_model(),
            paid_model: default_paid_model(),
            patch_model: default_patch_model(),
        }
    }
}

// =============================================================================
// Documentation URLs
// =============================================================================

/// URL patterns; `{rule}` and `{integration}` are substituted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocsConfig {
    /// Raw Markdown of a rule, fetched into the prompt
    #[serde(default = "default_rule_raw_url")]
    pub rule_raw_url: String,
    /// Rule page linked from reports
    #[serde(default = "default_rule_docs_url")]
    pub rule_docs_url: String,
    /// Integration page linked from reports
    #[serde(default = "default_integration_docs_url")]
    pub integration_docs_url: String,
}

fn default_rule_raw_url() -> String {
    "https://raw.githubusercontent.com/home-assistant/developers.home-assistant/refs/heads/master/docs/core/integration-quality-scale/rules/{rule}.md".to_string()
}

fn default_rule_docs_url() -> String {
    "https://developers.home-assistant.io/docs/core/integration-quality-scale/rules/{rule}"
        .to_string()
}

fn default_integration_docs_url() -> String {
    "https://www.home-assistant.io/integrations/{integration}/".to_string()
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            rule_raw_url: default_rule_raw_url(),
            rule_docs_url: default_rule_docs_url(),
            integration_docs_url: default_integration_docs_url(),
        }
    }
}

impl DocsConfig {
    pub fn rule_raw_url(&self, rule: &str) -> String {
        self.rule_raw_url.replace("{rule}", rule)
    }

    pub fn rule_docs_url(&self, rule: &str) -> String {
        self.rule_docs_url.replace("{rule}", rule)
    }

    pub fn integration_docs_url(&self, integration: &str) -> String {
        self.integration_docs_url.replace("{integration}", integration)
    }
}

// =============================================================================
// Qscale Configuration
// =============================================================================

/// Tool configuration, loaded from `qscale.toml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QscaleConfig {
    /// Home Assistant core checkout
    #[serde(default = "default_core_path")]
    pub core_path: PathBuf,

    /// Where reports and patches are written
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// File holding the Gemini API key
    #[serde(default = "default_token_file")]
    pub token_file: PathBuf,

    /// Integration files above this size are left out of prompts
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,

    /// Rule-name prefixes that cannot be judged from integration code alone
    #[serde(default = "default_ignored_rules")]
    pub ignored_rules: Vec<String>,

    #[serde(default)]
    pub gemini: GeminiConfig,

    #[serde(default)]
    pub docs: DocsConfig,
}

fn default_core_path() -> PathBuf {
    PathBuf::from("../core")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("generated")
}

fn default_token_file() -> PathBuf {
    PathBuf::from(".token")
}

fn default_max_file_bytes() -> u64 {
    100_000
}

fn default_ignored_rules() -> Vec<String> {
    vec![
        // Has to verify docs repo
        "docs-".to_string(),
        // Has to verify brands repo
        "brands".to_string(),
        // Has to verify PyPI
        "dependency-transparency".to_string(),
        // Has to verify tests
        "config-flow-test-coverage".to_string(),
        "test-coverage".to_string(),
    ]
}

impl Default for QscaleConfig {
    fn default() -> Self {
        Self {
            core_path: default_core_path(),
            output_dir: default_output_dir(),
            token_file: default_token_file(),
            max_file_bytes: default_max_file_bytes(),
            ignored_rules: default_ignored_rules(),
            gemini: GeminiConfig::default(),
            docs: DocsConfig::default(),
        }
    }
}

impl QscaleConfig {
    /// Load config from a TOML file; a missing file yields defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: QscaleConfig = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Read the Gemini API key from the token file, falling back to `GEMINI_API_KEY`
    pub fn load_api_key(&self) -> anyhow::Result<String> {
        read_api_key(&self.token_file, std::env::var(API_KEY_ENV).ok())
    }

    /// Whether a rule is skipped because it needs data outside the integration
    pub fn is_ignored(&self, rule: &str) -> bool {
        self.ignored_rules
            .iter()
            .any(|prefix| rule.starts_with(prefix.as_str()))
    }
}

fn read_api_key(token_file: &Path, env_value: Option<String>) -> anyhow::Result<String> {
    if token_file.exists() {
        let token = std::fs::read_to_string(token_file)?.trim().to_string();
        if !token.is_empty() {
            return Ok(token);
        }
        tracing::warn!(path = %token_file.display(), "token file is empty");
    }

    env_value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| QscaleError::MissingApiKey.into())
}
