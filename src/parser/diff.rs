use regex::Regex;
use std::sync::OnceLock;

fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?s)\A\s*```[A-Za-z0-9_-]*[ \t]*\r?\n(.*?)\r?\n?```\s*\z")
            .expect("fence regex is valid")
    })
}

/// Strip a single Markdown code fence wrapping the whole model answer
///
/// Models asked for a raw diff regularly answer with ```` ```diff ... ``` ````.
/// Output that is not entirely one fenced block is returned unchanged.
pub fn strip_code_fence(output: &str) -> String {
    match fence_regex().captures(output) {
        Some(captures) => {
            let mut body = captures[1].to_string();
            if !body.ends_with('\n') {
                body.push('\n');
            }
            body
        }
        None => output.to_string(),
    }
}
