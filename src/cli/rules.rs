use crate::context::IntegrationContext;
use crate::models::{QscaleConfig, QualityTier, RuleStatus, RuleTaxonomy, RulesReport};
use crate::parser::load_rules;
use crate::Result;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

/// Arguments of `qscale rules`
#[derive(Debug, Clone, clap::Args)]
pub struct RulesArgs {
    /// Show statuses for this integration
    pub integration: Option<String>,

    /// Path to Home Assistant core
    #[arg(long)]
    pub core_path: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// One row of the listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleRow {
    pub rule: String,
    /// `None` for status-file entries outside the taxonomy
    pub tier: Option<QualityTier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RuleStatus>,
    pub ignored: bool,
}

/// Flatten the taxonomy into rows, tier by tier
///
/// Status-file entries for rules the taxonomy does not know come last, without a tier.
pub fn rule_rows(
    taxonomy: &RuleTaxonomy,
    report: Option<&RulesReport>,
    config: &QscaleConfig,
) -> Vec<RuleRow> {
    let mut rows: Vec<RuleRow> = taxonomy
        .iter()
        .flat_map(|(tier, rules)| {
            rules.iter().map(move |rule| RuleRow {
                rule: rule.clone(),
                tier: Some(tier),
                status: report.map(|r| r.status_of(rule)),
                ignored: config.is_ignored(rule),
            })
        })
        .collect();

    if let Some(report) = report {
        rows.extend(
            report
                .iter()
                .filter(|(rule, _)| !taxonomy.contains(rule))
                .map(|(rule, info)| RuleRow {
                    rule: rule.to_string(),
                    tier: None,
                    status: Some(info.status),
                    ignored: config.is_ignored(rule),
                }),
        );
    }

    rows
}

fn print_rows<'a>(heading: &str, rows: impl Iterator<Item = &'a RuleRow>) {
    println!("{}", heading.bold());
    for row in rows {
        let status = match row.status {
            Some(RuleStatus::Todo) => "todo".yellow(),
            Some(RuleStatus::Done) => "done".green(),
            Some(RuleStatus::Exempt) => "exempt".blue(),
            None => "".normal(),
        };
        let marker = if row.ignored {
            " (ignored)".bright_black()
        } else {
            "".normal()
        };
        println!("  {:<40} {}{}", row.rule, status, marker);
    }
    println!();
}

pub async fn run(args: &RulesArgs, config: &QscaleConfig) -> Result<()> {
    let (taxonomy, report) = match &args.integration {
        Some(integration) => {
            let context = IntegrationContext::resolve(&config.core_path, integration)?;
            let taxonomy = load_rules(&context.core_path)?;
            let report = RulesReport::load(&context.path, &taxonomy)?;
            (taxonomy, Some(report))
        }
        None => (load_rules(&config.core_path)?, None),
    };

    let rows = rule_rows(&taxonomy, report.as_ref(), config);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    for tier in QualityTier::ALL {
        print_rows(
            tier.as_upper(),
            rows.iter().filter(|row| row.tier == Some(tier)),
        );
    }
    if rows.iter().any(|row| row.tier.is_none()) {
        print_rows("UNKNOWN", rows.iter().filter(|row| row.tier.is_none()));
    }

    println!("{} rules", taxonomy.len());
    Ok(())
}
