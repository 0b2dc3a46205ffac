use crate::models::RuleTaxonomy;
use crate::Result;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// File name of the per-integration status file
pub const STATUS_FILE_NAME: &str = "quality_scale.yaml";

/// Review status of a single rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleStatus {
    /// Rule applies and is not followed yet
    #[default]
    Todo,
    /// Rule applies and is followed
    Done,
    /// Rule does not apply
    Exempt,
}

impl fmt::Display for RuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleStatus::Todo => write!(f, "todo"),
            RuleStatus::Done => write!(f, "done"),
            RuleStatus::Exempt => write!(f, "exempt"),
        }
    }
}

/// Status entry as written in `quality_scale.yaml`
///
/// Accepts both `rule: done` and `rule: {status: exempt, comment: ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "RawRuleInfo")]
pub struct RuleInfo {
    pub status: RuleStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRuleInfo {
    Bare(RuleStatus),
    Detailed {
        status: RuleStatus,
        #[serde(default)]
        comment: Option<String>,
    },
}

impl From<RawRuleInfo> for RuleInfo {
    fn from(raw: RawRuleInfo) -> Self {
        match raw {
            RawRuleInfo::Bare(status) => RuleInfo {
                status,
                comment: None,
            },
            RawRuleInfo::Detailed { status, comment } => RuleInfo { status, comment },
        }
    }
}

#[derive(Debug, Deserialize)]
struct StatusFile {
    #[serde(default)]
    rules: BTreeMap<String, RuleInfo>,
}

/// Rule statuses for one integration
#[derive(Debug, Clone, Default)]
pub struct RulesReport {
    entries: BTreeMap<String, RuleInfo>,
    source: Option<PathBuf>,
}

impl RulesReport {
    /// Seed every taxonomy rule with `todo`, then overlay `quality_scale.yaml` if present
    pub fn load(integration_path: &Path, taxonomy: &RuleTaxonomy) -> Result<Self> {
        let mut entries: BTreeMap<String, RuleInfo> = taxonomy
            .all_rules()
            .map(|rule| (rule.to_string(), RuleInfo::default()))
            .collect();

        let path = integration_path.join(STATUS_FILE_NAME);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no status file, all rules default to todo");
            return Ok(Self {
                entries,
                source: None,
            });
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let file = Self::parse(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        tracing::debug!(path = %path.display(), rules = file.rules.len(), "loaded status file");
        entries.extend(file.rules);

        Ok(Self {
            entries,
            source: Some(path),
        })
    }

    fn parse(content: &str) -> Result<StatusFile> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Status of a rule; rules never seen are `todo`
    pub fn status_of(&self, rule: &str) -> RuleStatus {
        self.entries
            .get(rule)
            .map(|info| info.status)
            .unwrap_or_default()
    }

    pub fn info(&self, rule: &str) -> Option<&RuleInfo> {
        self.entries.get(rule)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RuleInfo)> {
        self.entries.iter().map(|(rule, info)| (rule.as_str(), info))
    }

    /// Path of the status file the report was read from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}
