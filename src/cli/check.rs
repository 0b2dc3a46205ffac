use crate::models::{ManifestScale, QscaleConfig, QualityTier};
use crate::orchestrator::{GeminiClient, RuleDocs};
use crate::services::review_service::{self, ReviewOptions};
use crate::Result;
use colored::Colorize;

/// Arguments of `qscale check`
#[derive(Debug, Clone, clap::Args)]
pub struct CheckArgs {
    /// The integration to check
    pub integration: String,

    /// Path to Home Assistant core
    #[arg(long)]
    pub core_path: Option<std::path::PathBuf>,

    /// Quality scale to target
    #[arg(long, value_enum)]
    pub target_scale: Option<QualityTier>,

    /// Will also update existing reports
    #[arg(long)]
    pub force_update: bool,

    /// Do not generate reports
    #[arg(long)]
    pub dry_run: bool,

    /// Use less powered but free model
    #[arg(long)]
    pub free_model: bool,

    /// Generate reports for rules marked done or exempt
    #[arg(long)]
    pub include_done: bool,

    /// Only run the first applicable rule
    #[arg(long)]
    pub single_rule: bool,
}

impl CheckArgs {
    pub fn options(&self) -> ReviewOptions {
        ReviewOptions {
            target_scale: self.target_scale,
            force_update: self.force_update,
            dry_run: self.dry_run,
            free_model: self.free_model,
            include_done: self.include_done,
            single_rule: self.single_rule,
        }
    }
}

/// Review an integration against the quality scale
///
/// # Workflow
/// 1. Resolve the integration and extract the rule taxonomy
/// 2. Validate the manifest's quality scale and load rule statuses
/// 3. Select rules and print the plan
/// 4. Dry run: estimate prompt tokens. Otherwise: one report per rule
pub async fn run(args: &CheckArgs, config: &QscaleConfig) -> Result<()> {
    let options = args.options();
    let plan = review_service::prepare(&config.core_path, &args.integration, config, &options)?;

    println!(
        "{}",
        format!("Integration: {}", plan.manifest.display_name(&plan.context.name))
            .cyan()
            .bold()
    );
    let scale = match plan.manifest.quality_scale {
        ManifestScale::Tier(tier) => tier.as_upper().to_string(),
        other => other.to_string(),
    };
    println!(
        "{}",
        format!("Declared quality scale: {}", scale).bright_black()
    );
    println!();

    review_service::print_selection(&plan.selection, options.single_rule)?;

    let docs = RuleDocs::new(config.docs.clone());

    if options.dry_run {
        review_service::dry_run(&plan, config, &docs).await?;
        return Ok(());
    }

    if plan.selection.is_empty() {
        println!("{}", "No rules to check.".yellow());
        return Ok(());
    }

    let api_key = config.load_api_key()?;
    let client = GeminiClient::new(&config.gemini.base_url, api_key).with_progress(true);

    let written =
        review_service::generate_reports(&plan, &options, config, &docs, &client).await?;
    tracing::debug!(reports = written.len(), "check finished");

    Ok(())
}
