pub mod gemini;
pub mod model_selector;
pub mod prompts;
pub mod rule_docs;
pub mod tokens;

pub use gemini::{ContentGenerator, GeminiClient};
pub use model_selector::{ModelSelector, ModelTask};
pub use rule_docs::RuleDocs;
pub use tokens::estimate_tokens;

/// Token usage reported by the model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageMetrics {
    pub prompt_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
}

/// Text produced by one model call
#[derive(Debug, Clone, Default)]
pub struct Generation {
    pub text: String,
    pub usage: UsageMetrics,
}
