//! Rule review pipeline
//!
//! Decides which rules need a report, then asks the model for one report per
//! rule. Selection is pure; generation is sequential with no retry.

use crate::context::IntegrationContext;
use crate::models::{
    IntegrationManifest, QscaleConfig, QualityTier, RuleStatus, RuleTaxonomy, RulesReport,
};
use crate::orchestrator::{
    estimate_tokens, prompts, ContentGenerator, ModelSelector, ModelTask, RuleDocs,
};
use crate::parser::load_rules;
use crate::Result;
use anyhow::Context;
use colored::Colorize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Flags of the check command
#[derive(Debug, Clone, Default)]
pub struct ReviewOptions {
    /// Process tiers up to and including this one
    pub target_scale: Option<QualityTier>,
    /// Regenerate reports that already exist
    pub force_update: bool,
    /// Build the prompt and estimate tokens, write nothing
    pub dry_run: bool,
    /// Use the cheaper model
    pub free_model: bool,
    /// Also review rules marked done or exempt
    pub include_done: bool,
    /// Stop after the first selected rule
    pub single_rule: bool,
}

/// A rule picked for review
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedRule {
    pub rule: String,
    pub tier: QualityTier,
    pub report_path: PathBuf,
}

/// Outcome of rule selection
#[derive(Debug, Clone, Default)]
pub struct RuleSelection {
    pub selected: Vec<SelectedRule>,
    /// Rules skipped because a report already exists
    pub existing: Vec<String>,
}

impl RuleSelection {
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Rule whose prompt a dry run estimates: the last one listed
    pub fn dry_run_rule(&self) -> Option<&SelectedRule> {
        self.selected.last()
    }

    /// Rules that will actually be sent to the model
    pub fn to_generate(&self, single_rule: bool) -> &[SelectedRule] {
        if single_rule && !self.selected.is_empty() {
            &self.selected[..1]
        } else {
            &self.selected
        }
    }
}

/// Everything the check command needs once inputs are validated
#[derive(Debug)]
pub struct ReviewPlan {
    pub context: IntegrationContext,
    pub manifest: IntegrationManifest,
    pub selection: RuleSelection,
    pub report_dir: PathBuf,
}

/// Where reports for an integration live
pub fn report_dir(output_dir: &Path, integration: &str) -> PathBuf {
    output_dir.join(integration)
}

/// Pick the rules to review
///
/// Walks tiers from bronze upwards. With a target scale, stops after that tier;
/// without one, stops at the first tier that selected anything.
pub fn select_rules(
    taxonomy: &RuleTaxonomy,
    report: &RulesReport,
    config: &QscaleConfig,
    options: &ReviewOptions,
    report_dir: &Path,
) -> RuleSelection {
    let mut selection = RuleSelection::default();

    for (tier, rules) in taxonomy.iter() {
        for rule in rules {
            if config.is_ignored(rule) {
                continue;
            }

            if report.status_of(rule) != RuleStatus::Todo && !options.include_done {
                continue;
            }

            let report_path = report_dir.join(format!("{}.md", rule));
            if report_path.exists() && !options.force_update {
                selection.existing.push(rule.clone());
                continue;
            }

            selection.selected.push(SelectedRule {
                rule: rule.clone(),
                tier,
                report_path,
            });
        }

        match options.target_scale {
            Some(target) if tier == target => break,
            Some(_) => {}
            None if !selection.selected.is_empty() => break,
            None => {}
        }
    }

    selection
}

/// Validate inputs and select rules for an integration
pub fn prepare(
    core_path: &Path,
    integration: &str,
    config: &QscaleConfig,
    options: &ReviewOptions,
) -> Result<ReviewPlan> {
    let context = IntegrationContext::resolve(core_path, integration)?;
    let taxonomy = load_rules(&context.core_path)?;
    let manifest = IntegrationManifest::load(&context.path)?;
    tracing::debug!(integration, scale = %manifest.quality_scale, "loaded manifest");
    if let Some(domain) = manifest.domain.as_deref().filter(|d| *d != integration) {
        tracing::warn!(integration, domain, "manifest domain differs from directory name");
    }

    let report = RulesReport::load(&context.path, &taxonomy)?;
    let report_dir = report_dir(&config.output_dir, integration);
    let selection = select_rules(&taxonomy, &report, config, options, &report_dir);

    Ok(ReviewPlan {
        context,
        manifest,
        selection,
        report_dir,
    })
}

/// Write skipped and selected rules
pub fn write_selection(
    out: &mut impl Write,
    selection: &RuleSelection,
    single_rule: bool,
) -> io::Result<()> {
    for rule in &selection.existing {
        writeln!(
            out,
            "{}",
            format!("Report for {} already exists. Skipping.", rule).bright_black()
        )?;
    }
    if !selection.existing.is_empty() {
        writeln!(out)?;
    }

    writeln!(out, "{}", "Generating report for rules:".cyan())?;
    for (idx, selected) in selection.selected.iter().enumerate() {
        writeln!(out, "  {}", selected.rule)?;
        if idx == 0 && single_rule {
            writeln!(out)?;
            writeln!(
                out,
                "{}",
                "Ignoring next rules due to --single-rule flag:".yellow()
            )?;
        }
    }
    writeln!(out)
}

/// Print skipped and selected rules to stdout
pub fn print_selection(selection: &RuleSelection, single_rule: bool) -> Result<()> {
    let stdout = io::stdout();
    write_selection(&mut stdout.lock(), selection, single_rule)?;
    Ok(())
}

/// Build the review prompt for one rule, fetching its description
pub async fn build_review_prompt(
    integration: &str,
    rule: &str,
    files: &str,
    docs: &RuleDocs,
) -> Result<String> {
    let rule_content = docs.fetch(rule).await?;
    Ok(prompts::rule_review_prompt(
        integration,
        rule,
        &docs.integration_url(integration),
        &docs.rule_url(rule),
        &rule_content,
        files,
    ))
}

/// Build the prompt for the last selected rule and estimate its size
///
/// Returns `None` when nothing was selected.
pub async fn dry_run(plan: &ReviewPlan, config: &QscaleConfig, docs: &RuleDocs) -> Result<Option<usize>> {
    let Some(rule) = plan.selection.dry_run_rule() else {
        println!("{}", "No rules to check.".yellow());
        return Ok(None);
    };

    let files = plan.context.bundle(config.max_file_bytes)?;
    let prompt = build_review_prompt(&plan.context.name, &rule.rule, &files, docs).await?;
    let tokens = estimate_tokens(&prompt)?;

    println!("{}", "Dry run enabled. Not generating reports.".yellow());
    println!("Prompt token estimate: {}", tokens);
    Ok(Some(tokens))
}

/// Generate and write reports for the selected rules
///
/// Returns the paths written, in order.
pub async fn generate_reports(
    plan: &ReviewPlan,
    options: &ReviewOptions,
    config: &QscaleConfig,
    docs: &RuleDocs,
    generator: &dyn ContentGenerator,
) -> Result<Vec<PathBuf>> {
    let rules = plan.selection.to_generate(options.single_rule);
    if rules.is_empty() {
        println!("{}", "No rules to check.".yellow());
        return Ok(Vec::new());
    }

    let files = plan.context.bundle(config.max_file_bytes)?;
    std::fs::create_dir_all(&plan.report_dir)
        .with_context(|| format!("Failed to create {}", plan.report_dir.display()))?;

    let model = ModelSelector::new(&config.gemini).select(ModelTask::Review {
        free: options.free_model,
    });

    let mut written = Vec::with_capacity(rules.len());
    for selected in rules {
        let start = Instant::now();
        tracing::info!(rule = %selected.rule, tier = %selected.tier, model, "reviewing rule");

        let prompt = build_review_prompt(&plan.context.name, &selected.rule, &files, docs).await?;
        let generation = generator.generate(model, &prompt).await?;

        let created_at = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let mut report = generation.text;
        report.push_str(&prompts::report_footer(&created_at, &generation.usage));

        std::fs::write(&selected.report_path, report)
            .with_context(|| format!("Failed to write {}", selected.report_path.display()))?;

        println!(
            "{}",
            format!(
                "Report for {} generated at {} (took {:.1}s)",
                selected.rule,
                selected.report_path.display(),
                start.elapsed().as_secs_f64()
            )
            .green()
        );
        println!();

        written.push(selected.report_path.clone());
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn taxonomy() -> RuleTaxonomy {
        let mut taxonomy = RuleTaxonomy::new();
        taxonomy.push(QualityTier::Bronze, "config-flow");
        taxonomy.push(QualityTier::Bronze, "docs-actions");
        taxonomy.push(QualityTier::Bronze, "runtime-data");
        taxonomy.push(QualityTier::Silver, "parallel-updates");
        taxonomy.push(QualityTier::Silver, "test-coverage");
        taxonomy.push(QualityTier::Gold, "diagnostics");
        taxonomy.push(QualityTier::Platinum, "strict-typing");
        taxonomy
    }

    fn report_with(dir: &Path, yaml: &str) -> RulesReport {
        fs::write(dir.join("quality_scale.yaml"), yaml).unwrap();
        RulesReport::load(dir, &taxonomy()).unwrap()
    }

    fn names(selection: &RuleSelection) -> Vec<&str> {
        selection.selected.iter().map(|s| s.rule.as_str()).collect()
    }

    #[test]
    fn test_stops_at_first_tier_with_work() {
        let temp_dir = TempDir::new().unwrap();
        let report = RulesReport::load(temp_dir.path(), &taxonomy()).unwrap();

        let selection = select_rules(
            &taxonomy(),
            &report,
            &QscaleConfig::default(),
            &ReviewOptions::default(),
            temp_dir.path(),
        );

        // docs-actions is ignored
        assert_eq!(names(&selection), vec!["config-flow", "runtime-data"]);
        assert_eq!(selection.selected[0].tier, QualityTier::Bronze);
        assert_eq!(
            selection.selected[0].report_path,
            temp_dir.path().join("config-flow.md")
        );
    }

    #[test]
    fn test_done_tiers_are_passed_over() {
        let temp_dir = TempDir::new().unwrap();
        let report = report_with(
            temp_dir.path(),
            "rules:\n  config-flow: done\n  runtime-data:\n    status: exempt\n    comment: n/a\n",
        );

        let selection = select_rules(
            &taxonomy(),
            &report,
            &QscaleConfig::default(),
            &ReviewOptions::default(),
            temp_dir.path(),
        );

        assert_eq!(names(&selection), vec!["parallel-updates"]);
    }

    #[test]
    fn test_include_done() {
        let temp_dir = TempDir::new().unwrap();
        let report = report_with(temp_dir.path(), "rules:\n  config-flow: done\n");

        let options = ReviewOptions {
            include_done: true,
            ..Default::default()
        };
        let selection = select_rules(
            &taxonomy(),
            &report,
            &QscaleConfig::default(),
            &options,
            temp_dir.path(),
        );

        assert_eq!(names(&selection), vec!["config-flow", "runtime-data"]);
    }

    #[test]
    fn test_target_scale_collects_up_to_tier() {
        let temp_dir = TempDir::new().unwrap();
        let report = RulesReport::load(temp_dir.path(), &taxonomy()).unwrap();

        let options = ReviewOptions {
            target_scale: Some(QualityTier::Gold),
            ..Default::default()
        };
        let selection = select_rules(
            &taxonomy(),
            &report,
            &QscaleConfig::default(),
            &options,
            temp_dir.path(),
        );

        assert_eq!(
            names(&selection),
            vec!["config-flow", "runtime-data", "parallel-updates", "diagnostics"]
        );
    }

    #[test]
    fn test_existing_reports_skipped_unless_forced() {
        let temp_dir = TempDir::new().unwrap();
        let report = RulesReport::load(temp_dir.path(), &taxonomy()).unwrap();
        fs::write(temp_dir.path().join("config-flow.md"), "old report").unwrap();

        let selection = select_rules(
            &taxonomy(),
            &report,
            &QscaleConfig::default(),
            &ReviewOptions::default(),
            temp_dir.path(),
        );
        assert_eq!(selection.existing, vec!["config-flow".to_string()]);
        assert_eq!(names(&selection), vec!["runtime-data"]);

        let forced = ReviewOptions {
            force_update: true,
            ..Default::default()
        };
        let selection = select_rules(
            &taxonomy(),
            &report,
            &QscaleConfig::default(),
            &forced,
            temp_dir.path(),
        );
        assert!(selection.existing.is_empty());
        assert_eq!(names(&selection), vec!["config-flow", "runtime-data"]);
    }

    #[test]
    fn test_existing_reports_do_not_stop_tier_walk() {
        let temp_dir = TempDir::new().unwrap();
        let report = RulesReport::load(temp_dir.path(), &taxonomy()).unwrap();
        fs::write(temp_dir.path().join("config-flow.md"), "").unwrap();
        fs::write(temp_dir.path().join("runtime-data.md"), "").unwrap();

        let selection = select_rules(
            &taxonomy(),
            &report,
            &QscaleConfig::default(),
            &ReviewOptions::default(),
            temp_dir.path(),
        );

        assert_eq!(selection.existing.len(), 2);
        assert_eq!(names(&selection), vec!["parallel-updates"]);
    }

    #[test]
    fn test_single_rule_limits_generation() {
        let temp_dir = TempDir::new().unwrap();
        let report = RulesReport::load(temp_dir.path(), &taxonomy()).unwrap();
        let selection = select_rules(
            &taxonomy(),
            &report,
            &QscaleConfig::default(),
            &ReviewOptions::default(),
            temp_dir.path(),
        );

        assert_eq!(selection.to_generate(true).len(), 1);
        assert_eq!(selection.to_generate(false).len(), 2);
        assert!(RuleSelection::default().to_generate(true).is_empty());
    }

    fn render(selection: &RuleSelection, single_rule: bool) -> String {
        colored::control::set_override(false);
        let mut out = Vec::new();
        write_selection(&mut out, selection, single_rule).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn selection_of(existing: &[&str], selected: &[&str]) -> RuleSelection {
        RuleSelection {
            selected: selected
                .iter()
                .map(|rule| SelectedRule {
                    rule: rule.to_string(),
                    tier: QualityTier::Bronze,
                    report_path: PathBuf::from(format!("generated/demo/{}.md", rule)),
                })
                .collect(),
            existing: existing.iter().map(|rule| rule.to_string()).collect(),
        }
    }

    #[test]
    fn test_write_selection_plain() {
        let output = render(&selection_of(&[], &["config-flow", "runtime-data"]), false);
        assert_eq!(
            output,
            "Generating report for rules:\n  config-flow\n  runtime-data\n\n"
        );
    }

    #[test]
    fn test_write_selection_lists_existing_first() {
        let output = render(&selection_of(&["config-flow"], &["runtime-data"]), false);
        assert_eq!(
            output,
            "Report for config-flow already exists. Skipping.\n\n\
             Generating report for rules:\n  runtime-data\n\n"
        );
    }

    #[test]
    fn test_write_selection_single_rule_note() {
        let output = render(&selection_of(&[], &["config-flow", "runtime-data"]), true);
        assert_eq!(
            output,
            "Generating report for rules:\n  config-flow\n\n\
             Ignoring next rules due to --single-rule flag:\n  runtime-data\n\n"
        );

        let output = render(&selection_of(&[], &["config-flow"]), true);
        assert_eq!(
            output,
            "Generating report for rules:\n  config-flow\n\n\
             Ignoring next rules due to --single-rule flag:\n\n"
        );
    }

    #[test]
    fn test_dry_run_uses_last_selected_rule() {
        let selection = selection_of(&[], &["config-flow", "runtime-data"]);
        assert_eq!(selection.dry_run_rule().unwrap().rule, "runtime-data");
        assert!(RuleSelection::default().dry_run_rule().is_none());
    }
}
