//! Rule Taxonomy Extraction
//!
//! Reads hassfest's `quality_scale.py` with tree-sitter and collects the
//! `Rule(...)` entries of the module-level `ALL_RULES` list, grouped by tier.
//! Only the single assignment is inspected; nothing is evaluated.

use crate::error::QscaleError;
use crate::models::{QualityTier, RuleTaxonomy};
use crate::Result;
use anyhow::Context;
use std::path::{Path, PathBuf};
use tree_sitter::{Node, Parser};

/// Name of the module-level list holding every rule
const RULES_VARIABLE: &str = "ALL_RULES";

/// Callee of each rule entry
const RULE_CONSTRUCTOR: &str = "Rule";

/// Location of the rules module inside a core checkout
pub fn rules_file(core_path: &Path) -> PathBuf {
    core_path
        .join("script")
        .join("hassfest")
        .join("quality_scale.py")
}

/// Load and extract the rule taxonomy from a core checkout
pub fn load_rules(core_path: &Path) -> Result<RuleTaxonomy> {
    let path = rules_file(core_path);
    if !path.is_file() {
        return Err(QscaleError::RulesFileMissing(path).into());
    }

    let source = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let taxonomy = extract_rules(&source)
        .with_context(|| format!("Failed to extract rules from {}", path.display()))?;

    tracing::debug!(path = %path.display(), rules = taxonomy.len(), "extracted rule taxonomy");
    Ok(taxonomy)
}

/// Extract the rule taxonomy from Python source
///
/// Returns an empty taxonomy (all four tiers, no rules) when the module has no
/// `ALL_RULES` assignment.
pub fn extract_rules(source: &str) -> Result<RuleTaxonomy> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .context("Failed to load the Python grammar")?;

    let tree = parser
        .parse(source, None)
        .context("Failed to parse Python source")?;

    let mut taxonomy = RuleTaxonomy::new();

    let Some(rules_list) = find_rules_list(tree.root_node(), source) else {
        tracing::warn!("no {} assignment found", RULES_VARIABLE);
        return Ok(taxonomy);
    };

    let mut cursor = rules_list.walk();
    for element in rules_list.named_children(&mut cursor) {
        if element.kind() != "call" {
            continue;
        }

        let is_rule_call = element
            .child_by_field_name("function")
            .is_some_and(|f| f.kind() == "identifier" && node_text(&f, source) == RULE_CONSTRUCTOR);
        if !is_rule_call {
            continue;
        }

        let Some(arguments) = element.child_by_field_name("arguments") else {
            continue;
        };
        let positional = positional_arguments(&arguments);

        let Some(name) = positional.first().and_then(|n| string_value(n, source)) else {
            tracing::warn!(
                line = element.start_position().row + 1,
                "skipping Rule(...) without a string name"
            );
            continue;
        };

        let Some(tier_attr) = positional.get(1).and_then(|n| attribute_name(n, source)) else {
            tracing::warn!(rule = %name, "skipping Rule(...) without a tier attribute");
            continue;
        };

        let tier = QualityTier::from_name(tier_attr).ok_or_else(|| QscaleError::UnknownTier {
            rule: name.clone(),
            tier: tier_attr.to_string(),
        })?;

        taxonomy.push(tier, name);
    }

    Ok(taxonomy)
}

/// Find the right-hand list of the first module-level `ALL_RULES = [...]`
fn find_rules_list<'t>(root: Node<'t>, source: &str) -> Option<Node<'t>> {
    let mut cursor = root.walk();
    for statement in root.named_children(&mut cursor) {
        if statement.kind() != "expression_statement" {
            continue;
        }

        let Some(assignment) = statement.named_child(0) else {
            continue;
        };
        if assignment.kind() != "assignment" {
            continue;
        }

        let targets_rules = assignment
            .child_by_field_name("left")
            .is_some_and(|left| {
                left.kind() == "identifier" && node_text(&left, source) == RULES_VARIABLE
            });
        if !targets_rules {
            continue;
        }

        // Only the first assignment counts, whatever its value
        return assignment
            .child_by_field_name("right")
            .filter(|right| right.kind() == "list");
    }
    None
}

/// Positional arguments of a call, in order
fn positional_arguments<'t>(arguments: &Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = arguments.walk();
    arguments
        .named_children(&mut cursor)
        .filter(|arg| {
            !matches!(
                arg.kind(),
                "keyword_argument" | "comment" | "list_splat" | "dictionary_splat"
            )
        })
        .collect()
}

/// Value of a plain string literal
fn string_value(node: &Node, source: &str) -> Option<String> {
    if node.kind() != "string" {
        return None;
    }

    let mut cursor = node.walk();
    let content: String = node
        .named_children(&mut cursor)
        .filter(|child| child.kind() == "string_content")
        .map(|child| node_text(&child, source))
        .collect();

    if !content.is_empty() {
        return Some(content);
    }

    // Empty literal, or a grammar without string_content nodes
    let text = node_text(node, source);
    Some(
        text.trim_start_matches(|c: char| c.is_ascii_alphabetic())
            .trim_matches(|c| c == '"' || c == '\'')
            .to_string(),
    )
}

/// Attribute name of `Object.ATTR`
fn attribute_name<'s>(node: &Node, source: &'s str) -> Option<&'s str> {
    if node.kind() != "attribute" {
        return None;
    }
    node.child_by_field_name("attribute")
        .map(|attr| node_text(&attr, source))
}

fn node_text<'s>(node: &Node, source: &'s str) -> &'s str {
    &source[node.start_byte()..node.end_byte()]
}
