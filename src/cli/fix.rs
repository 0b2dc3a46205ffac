use crate::context::IntegrationContext;
use crate::models::QscaleConfig;
use crate::orchestrator::{prompts, GeminiClient, RuleDocs};
use crate::services::patch_service;
use crate::Result;
use colored::Colorize;

/// Arguments of `qscale fix`
#[derive(Debug, Clone, clap::Args)]
pub struct FixArgs {
    /// The integration to fix
    pub integration: String,

    /// The rule whose report the patch addresses
    pub rule: String,

    /// Path to Home Assistant core
    #[arg(long)]
    pub core_path: Option<std::path::PathBuf>,
}

pub async fn run(args: &FixArgs, config: &QscaleConfig) -> Result<()> {
    let context = IntegrationContext::resolve(&config.core_path, &args.integration)?;
    let api_key = config.load_api_key()?;

    println!(
        "{}",
        format!("Generating patch for {} ({})", context.name, args.rule).cyan()
    );

    let client = GeminiClient::new(&config.gemini.base_url, api_key).with_progress(true);
    let docs = RuleDocs::new(config.docs.clone());

    let outcome =
        patch_service::generate_patch(&context, &args.rule, config, &docs, &client).await?;

    println!(
        "{}",
        format!("Diff file written to {}", outcome.diff_path.display()).green()
    );
    println!("{}", prompts::usage_line(&outcome.usage));

    Ok(())
}
