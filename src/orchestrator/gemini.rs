use super::{Generation, UsageMetrics};
use crate::error::QscaleError;
use crate::Result;
use anyhow::Context;
use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Something that turns a prompt into model output
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(&self, model: &str, prompt: &str) -> Result<Generation>;
}

// =========================================================================
// Wire types (generateContent)
// =========================================================================

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
    /// Set on thinking parts, which are not part of the answer
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
    #[serde(default)]
    total_token_count: u64,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: u16,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

// =========================================================================
// Client
// =========================================================================

/// Gemini REST client (API key auth, single request per prompt, no retry)
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    show_progress: bool,
}

impl GeminiClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            show_progress: false,
        }
    }

    /// Show a spinner while waiting for the response
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    fn spinner(&self, model: &str) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style.tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "));
        }
        pb.set_message(format!("Waiting for {}...", model));
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    }

    async fn send(&self, model: &str, prompt: &str) -> Result<Generation> {
        let body = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        tracing::debug!(model, prompt_bytes = prompt.len(), "sending generateContent request");

        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Failed to reach Gemini API for model {}", model))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .context("Failed to read Gemini API response")?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            return Err(QscaleError::Api {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&text).context("Failed to parse Gemini API response")?;
        parse_generation(parsed)
    }
}

#[async_trait]
impl ContentGenerator for GeminiClient {
    async fn generate(&self, model: &str, prompt: &str) -> Result<Generation> {
        let progress = self.spinner(model);
        let result = self.send(model, prompt).await;
        if let Some(pb) = progress {
            pb.finish_and_clear();
        }
        result
    }
}

fn parse_generation(response: GenerateContentResponse) -> Result<Generation> {
    if let Some(error) = response.error {
        return Err(QscaleError::Api {
            status: error.code,
            message: error.message,
        }
        .into());
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .context("Gemini API returned no candidates")?;

    if let Some(reason) = candidate.finish_reason.as_deref() {
        if reason != "STOP" {
            tracing::warn!(finish_reason = reason, "model stopped early");
        }
    }

    let text: String = candidate
        .content
        .map(|content| content.parts)
        .unwrap_or_default()
        .into_iter()
        .filter(|part| !part.thought)
        .filter_map(|part| part.text)
        .collect();

    let usage = response
        .usage_metadata
        .map(|u| UsageMetrics {
            prompt_tokens: u.prompt_token_count,
            output_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        })
        .unwrap_or_default();

    Ok(Generation { text, usage })
}
