//! Patch generation from an existing rule report

use crate::context::IntegrationContext;
use crate::error::QscaleError;
use crate::models::QscaleConfig;
use crate::orchestrator::{prompts, ContentGenerator, ModelSelector, ModelTask, RuleDocs, UsageMetrics};
use crate::parser::strip_code_fence;
use crate::services::review_service::report_dir;
use crate::Result;
use anyhow::Context;
use std::path::{Path, PathBuf};

/// Result of a patch run
#[derive(Debug, Clone)]
pub struct PatchOutcome {
    pub diff_path: PathBuf,
    pub usage: UsageMetrics,
}

/// Path of the review report a patch is generated from
pub fn report_path(output_dir: &Path, integration: &str, rule: &str) -> PathBuf {
    report_dir(output_dir, integration).join(format!("{}.md", rule))
}

/// Path the patch is written to
pub fn diff_path(output_dir: &Path, integration: &str, rule: &str) -> PathBuf {
    report_dir(output_dir, integration).join(format!("{}.diff", rule))
}

/// Generate a unified diff addressing the report for `rule`
pub async fn generate_patch(
    context: &IntegrationContext,
    rule: &str,
    config: &QscaleConfig,
    docs: &RuleDocs,
    generator: &dyn ContentGenerator,
) -> Result<PatchOutcome> {
    let report_path = report_path(&config.output_dir, &context.name, rule);
    if !report_path.is_file() {
        return Err(QscaleError::ReportMissing(report_path).into());
    }

    let report_content = std::fs::read_to_string(&report_path)
        .with_context(|| format!("Failed to read {}", report_path.display()))?;
    let files = context.bundle(config.max_file_bytes)?;
    let rule_content = docs.fetch(rule).await?;

    let prompt = prompts::patch_prompt(&context.name, rule, &rule_content, &report_content, &files);

    let model = ModelSelector::new(&config.gemini).select(ModelTask::Patch);
    tracing::info!(rule, model, "generating patch");
    let generation = generator.generate(model, &prompt).await?;

    let diff_path = diff_path(&config.output_dir, &context.name, rule);
    std::fs::write(&diff_path, strip_code_fence(&generation.text))
        .with_context(|| format!("Failed to write {}", diff_path.display()))?;

    Ok(PatchOutcome {
        diff_path,
        usage: generation.usage,
    })
}
