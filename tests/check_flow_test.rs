//! Integration tests for the check pipeline
//!
//! Runs rule selection and report generation against a fake core tree, with
//! rule descriptions served by a mock HTTP server and a scripted model.

mod common;

use common::{bronze_manifest, config_for, create_core, start_docs_server, ScriptedModel};
use qscale::models::QualityTier;
use qscale::orchestrator::RuleDocs;
use qscale::services::review_service::{self, ReviewOptions};
use qscale::QscaleError;
use std::fs;
use tempfile::TempDir;

#[tokio::test]
async fn test_check_writes_reports_for_first_open_tier() {
    let temp_dir = TempDir::new().unwrap();
    let core = create_core(temp_dir.path(), bronze_manifest());
    let output = temp_dir.path().join("generated");
    let server = start_docs_server().await;
    let config = config_for(&core, &output, &server);
    let docs = RuleDocs::new(config.docs.clone());
    let model = ScriptedModel::new("# Review\n\nLooks fine.");

    let options = ReviewOptions::default();
    let plan = review_service::prepare(&core, "demo", &config, &options).unwrap();
    let written = review_service::generate_reports(&plan, &options, &config, &docs, &model)
        .await
        .unwrap();

    assert_eq!(
        written,
        vec![output.join("demo/config-flow.md"), output.join("demo/runtime-data.md")]
    );

    let report = fs::read_to_string(&written[0]).unwrap();
    assert!(report.starts_with("# Review\n\nLooks fine."));
    assert!(report.contains("Prompt tokens: 120, Output tokens: 30, Total tokens: 150_"));

    let calls = model.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].0, "gemini-2.5-pro-preview-05-06");

    let prompt = &calls[0].1;
    assert!(prompt.contains("# Rule description"));
    assert!(prompt.contains("--- FILE: homeassistant/components/demo/manifest.json ---"));
    assert!(prompt.contains("PARALLEL_UPDATES = 0"));
    assert!(!prompt.contains("cpython"));

    let manifest_at = prompt.find("demo/manifest.json").unwrap();
    let init_at = prompt.find("demo/__init__.py").unwrap();
    let strings_at = prompt.find("demo/strings.json").unwrap();
    assert!(manifest_at < init_at && init_at < strings_at);
}

#[tokio::test]
async fn test_check_skips_existing_and_honors_single_rule() {
    let temp_dir = TempDir::new().unwrap();
    let core = create_core(temp_dir.path(), bronze_manifest());
    let output = temp_dir.path().join("generated");
    fs::create_dir_all(output.join("demo")).unwrap();
    fs::write(output.join("demo/config-flow.md"), "kept").unwrap();

    let server = start_docs_server().await;
    let config = config_for(&core, &output, &server);
    let docs = RuleDocs::new(config.docs.clone());
    let model = ScriptedModel::new("report");

    let options = ReviewOptions {
        target_scale: Some(QualityTier::Silver),
        free_model: true,
        single_rule: true,
        ..Default::default()
    };
    let plan = review_service::prepare(&core, "demo", &config, &options).unwrap();
    assert_eq!(plan.selection.existing, vec!["config-flow".to_string()]);
    assert_eq!(plan.selection.selected.len(), 2);

    let written = review_service::generate_reports(&plan, &options, &config, &docs, &model)
        .await
        .unwrap();

    assert_eq!(written, vec![output.join("demo/runtime-data.md")]);
    assert_eq!(fs::read_to_string(output.join("demo/config-flow.md")).unwrap(), "kept");
    assert_eq!(model.calls()[0].0, "gemini-2.5-flash-preview-04-17");
}

#[tokio::test]
async fn test_dry_run_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let core = create_core(temp_dir.path(), bronze_manifest());
    let output = temp_dir.path().join("generated");
    let server = start_docs_server().await;
    let config = config_for(&core, &output, &server);
    let docs = RuleDocs::new(config.docs.clone());

    let options = ReviewOptions {
        dry_run: true,
        ..Default::default()
    };
    let plan = review_service::prepare(&core, "demo", &config, &options).unwrap();
    let tokens = review_service::dry_run(&plan, &config, &docs).await.unwrap();

    assert!(tokens.unwrap() > 0);
    assert!(!output.exists());
}

#[tokio::test]
async fn test_status_file_moves_selection_to_next_tier() {
    let temp_dir = TempDir::new().unwrap();
    let core = create_core(temp_dir.path(), bronze_manifest());
    fs::write(
        core.join("homeassistant/components/demo/quality_scale.yaml"),
        "rules:\n  config-flow: done\n  runtime-data:\n    status: exempt\n    comment: No coordinator.\n",
    )
    .unwrap();

    let server = start_docs_server().await;
    let config = config_for(&core, &temp_dir.path().join("generated"), &server);

    let plan = review_service::prepare(&core, "demo", &config, &ReviewOptions::default()).unwrap();
    let selected: Vec<_> = plan.selection.selected.iter().map(|s| s.rule.as_str()).collect();
    assert_eq!(selected, vec!["parallel-updates"]);
}

#[test]
fn test_unsupported_manifest_scale_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let core = create_core(
        temp_dir.path(),
        r#"{"domain": "demo", "quality_scale": "internal"}"#,
    );
    let config = qscale::models::QscaleConfig {
        core_path: core.clone(),
        ..Default::default()
    };

    let err = review_service::prepare(&core, "demo", &config, &ReviewOptions::default())
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<QscaleError>(),
        Some(QscaleError::UnsupportedScale(scale)) if scale == "INTERNAL"
    ));
}

#[test]
fn test_missing_integration_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let core = create_core(temp_dir.path(), bronze_manifest());
    let config = qscale::models::QscaleConfig::default();

    let err = review_service::prepare(&core, "nope", &config, &ReviewOptions::default())
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<QscaleError>(),
        Some(QscaleError::IntegrationPathMissing(_))
    ));

    let err = review_service::prepare(
        &temp_dir.path().join("missing"),
        "demo",
        &config,
        &ReviewOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<QscaleError>(),
        Some(QscaleError::CorePathMissing(_))
    ));
}
