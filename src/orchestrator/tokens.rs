use crate::Result;
use anyhow::Context;
use tiktoken_rs::cl100k_base;

/// Estimate the prompt size in tokens with the GPT-4 (`cl100k_base`) encoding
///
/// Gemini tokenizes differently; the number is only a ballpark for dry runs.
pub fn estimate_tokens(prompt: &str) -> Result<usize> {
    let bpe = cl100k_base().context("Failed to load cl100k_base encoding")?;
    Ok(bpe.encode_with_special_tokens(prompt).len())
}
