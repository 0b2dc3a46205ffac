pub mod diff;
pub mod rules;

pub use diff::strip_code_fence;
pub use rules::{extract_rules, load_rules, rules_file};
