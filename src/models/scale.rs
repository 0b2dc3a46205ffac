use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// Quality Tiers
// =============================================================================

/// Tier of the Integration Quality Scale, ordered from lowest to highest
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl QualityTier {
    pub const ALL: [QualityTier; 4] = [
        QualityTier::Bronze,
        QualityTier::Silver,
        QualityTier::Gold,
        QualityTier::Platinum,
    ];

    /// Parse from string (case-insensitive), accepts both `gold` and `GOLD`
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "bronze" => Some(QualityTier::Bronze),
            "silver" => Some(QualityTier::Silver),
            "gold" => Some(QualityTier::Gold),
            "platinum" => Some(QualityTier::Platinum),
            _ => None,
        }
    }

    /// Upper-case name as used by hassfest and manifest files
    pub fn as_upper(&self) -> &'static str {
        match self {
            QualityTier::Bronze => "BRONZE",
            QualityTier::Silver => "SILVER",
            QualityTier::Gold => "GOLD",
            QualityTier::Platinum => "PLATINUM",
        }
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QualityTier::Bronze => "bronze",
            QualityTier::Silver => "silver",
            QualityTier::Gold => "gold",
            QualityTier::Platinum => "platinum",
        };
        write!(f, "{}", name)
    }
}

// =============================================================================
// Rule Taxonomy
// =============================================================================

/// Rules grouped by tier. All four tiers are always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleTaxonomy {
    tiers: BTreeMap<QualityTier, Vec<String>>,
}

impl RuleTaxonomy {
    pub fn new() -> Self {
        let tiers = QualityTier::ALL
            .iter()
            .map(|tier| (*tier, Vec::new()))
            .collect();
        Self { tiers }
    }

    pub fn push(&mut self, tier: QualityTier, rule: impl Into<String>) {
        self.tiers.entry(tier).or_default().push(rule.into());
    }

    /// Rules of a single tier, in source order
    pub fn rules(&self, tier: QualityTier) -> &[String] {
        self.tiers.get(&tier).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterate tiers from bronze to platinum
    pub fn iter(&self) -> impl Iterator<Item = (QualityTier, &[String])> {
        self.tiers.iter().map(|(tier, rules)| (*tier, rules.as_slice()))
    }

    pub fn all_rules(&self) -> impl Iterator<Item = &str> {
        self.tiers.values().flatten().map(String::as_str)
    }

    pub fn tier_of(&self, rule: &str) -> Option<QualityTier> {
        self.tiers
            .iter()
            .find(|(_, rules)| rules.iter().any(|r| r == rule))
            .map(|(tier, _)| *tier)
    }

    pub fn contains(&self, rule: &str) -> bool {
        self.tier_of(rule).is_some()
    }

    pub fn len(&self) -> usize {
        self.tiers.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for RuleTaxonomy {
    fn default() -> Self {
        Self::new()
    }
}
