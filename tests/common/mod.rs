//! Shared fixtures: a fake Home Assistant core tree and a scripted model

#![allow(dead_code)]

use async_trait::async_trait;
use qscale::models::{DocsConfig, QscaleConfig};
use qscale::orchestrator::{ContentGenerator, Generation, UsageMetrics};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use wiremock::matchers::{method, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const QUALITY_SCALE_PY: &str = r#"
ALL_RULES = [
    Rule("config-flow", ScaledQualityScaleTiers.BRONZE, config_flow),
    Rule("docs-actions", ScaledQualityScaleTiers.BRONZE),
    Rule("runtime-data", ScaledQualityScaleTiers.BRONZE, runtime_data),
    Rule("parallel-updates", ScaledQualityScaleTiers.SILVER),
    Rule("diagnostics", ScaledQualityScaleTiers.GOLD, diagnostics),
    Rule("strict-typing", ScaledQualityScaleTiers.PLATINUM, strict_typing),
]
"#;

/// Create `<root>/core` with one integration named `demo`
pub fn create_core(root: &Path, manifest: &str) -> PathBuf {
    let core = root.join("core");
    let hassfest = core.join("script").join("hassfest");
    fs::create_dir_all(&hassfest).unwrap();
    fs::write(hassfest.join("quality_scale.py"), QUALITY_SCALE_PY).unwrap();

    let integration = core.join("homeassistant").join("components").join("demo");
    fs::create_dir_all(integration.join("__pycache__")).unwrap();
    fs::write(integration.join("manifest.json"), manifest).unwrap();
    fs::write(integration.join("__init__.py"), "\"\"\"The demo integration.\"\"\"\n").unwrap();
    fs::write(integration.join("sensor.py"), "PARALLEL_UPDATES = 0\n").unwrap();
    fs::write(integration.join("strings.json"), "{}\n").unwrap();
    fs::write(integration.join("__pycache__").join("sensor.cpython-313.pyc"), "junk").unwrap();

    core
}

pub fn bronze_manifest() -> &'static str {
    r#"{"domain": "demo", "name": "Demo", "quality_scale": "bronze"}"#
}

/// Serve `# <rule>` for every rule description
pub async fn start_docs_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/rules/[a-z-]+\.md$"))
        .respond_with(ResponseTemplate::new(200).set_body_string("# Rule description\n"))
        .mount(&server)
        .await;
    server
}

pub fn config_for(core: &Path, output_dir: &Path, docs_server: &MockServer) -> QscaleConfig {
    QscaleConfig {
        core_path: core.to_path_buf(),
        output_dir: output_dir.to_path_buf(),
        docs: DocsConfig {
            rule_raw_url: format!("{}/rules/{{rule}}.md", docs_server.uri()),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Model stand-in that returns a fixed answer and records every call
pub struct ScriptedModel {
    answer: String,
    pub calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedModel {
    pub fn new(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentGenerator for ScriptedModel {
    async fn generate(&self, model: &str, prompt: &str) -> qscale::Result<Generation> {
        self.calls
            .lock()
            .unwrap()
            .push((model.to_string(), prompt.to_string()));
        Ok(Generation {
            text: self.answer.clone(),
            usage: UsageMetrics {
                prompt_tokens: 120,
                output_tokens: 30,
                total_tokens: 150,
            },
        })
    }
}
