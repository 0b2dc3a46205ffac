//! Prompt templates for quality scale reviews and patches
//!
//! Every template is a plain `format!` over named arguments: each value is
//! substituted exactly once and no placeholder survives into the prompt.

use super::UsageMetrics;

/// Generate the rule review prompt
pub fn rule_review_prompt(
    integration: &str,
    rule: &str,
    integration_url: &str,
    rule_url: &str,
    rule_content: &str,
    files: &str,
) -> String {
    format!(
        r#"You are an expert Home Assistant code reviewer specializing in the Integration Quality Scale. Your task is to meticulously analyze a given Home Assistant integration's code against a specific quality scale rule.

**Goal:**
Generate a Markdown report assessing if the `{integration}` follows the rule `{rule}`.

**Input You Will Receive:**
1.  The name of the integration: {integration}.
2.  The name of the rule being checked: {rule}.
3.  The full text and requirements of the rule.
4.  The code for the integration

**Output Requirements:**

The report must be in Markdown format and determine one of three statuses:
*   **"todo"**: The rule applies to this integration, AND the integration currently does NOT follow it.
*   **"done"**: The rule applies to this integration, AND the integration fully follows it.
*   **"exempt"**: The rule does NOT apply to this integration.

**Report Structure:**

1.  **Title:**
    ```markdown
    # {integration}: {rule}
    ```

2.  **Information Table:**
    ```markdown
    | Info   | Value                                                                    |
    |--------|--------------------------------------------------------------------------|
    | Name   | [{integration}]({integration_url}) |
    | Rule   | [{rule}]({rule_url})                                                     |
    | Status | **todo** OR **done** OR **exempt**                                       |
    | Reason | (Only include if Status is "exempt". Explain why the rule does not apply.) |
    ```

3.  **Overview Section:**
    *   **Heading:** `## Overview`
    *   **Content:**
        *   Start by clearly stating if the rule applies to the integration and why.
        *   If it applies, explain in detail whether the integration follows the rule or not.
        *   **Crucially, reference specific parts of the provided code or identify missing components/patterns to justify your assessment.**
        *   If the rule does not apply (status "exempt"), expand on the "Reason" from the table, providing more context if necessary.

4.  **Suggestions Section (Conditional):**
    *   **Heading:** `## Suggestions`
    *   **Content:**
        *   **Only include this section if the Status is "todo".**
        *   Provide clear, actionable, and specific steps the developer can take to make the integration compliant with the rule.
        *   If possible, include examples of code changes or additions.
        *   Explain *why* these changes would satisfy the rule.
        *   If Status is "done" or "exempt", omit this entire section or state "No suggestions needed."

**Analysis Process for You (the AI):**

1.  **Understand the Rule:** Carefully read and interpret rule content to understand its purpose, requirements, and scope.
2.  **Applicability Check:** Based on rule content and your knowledge of Home Assistant integrations, determine if this specific rule is relevant and applicable to the provided `{integration}` code.
3.  **Code Review (if applicable):** If the rule applies, thoroughly examine the provided integration code.
    *   Look for specific patterns, functions, configurations, or architectural choices mentioned or implied by the rule.
    *   Identify if the integration implements these requirements correctly.
    *   Note any deviations, omissions, or incorrect implementations.
4.  **Determine Status:** Based on your analysis, assign "todo", "done", or "exempt".
5.  **Formulate Report:** Construct the report according to the specified structure, ensuring your reasoning is clear, evidence-based (referencing code), and constructive.

--- START OF ATTACHED FILES ---

--- FILE: rule-{rule}-description.md ---
{rule_content}
--- END FILE ---

{files}

--- END OF ATTACHED FILES ---"#,
        integration = integration,
        rule = rule,
        integration_url = integration_url,
        rule_url = rule_url,
        rule_content = rule_content,
        files = files
    )
}

/// Generate the unified-diff patch prompt
pub fn patch_prompt(
    integration: &str,
    rule: &str,
    rule_content: &str,
    report_content: &str,
    files: &str,
) -> String {
    format!(
        r#"You are an expert Home Assistant Python code assistant. Your primary function is to generate code patches based on quality rule violations.

**Objective:**
Generate a patch file to address specific issues found in the Home Assistant integration "{integration}". These issues are violations of the quality scale rule {rule}.

**Instructions:**
1.  Analyze the provided **Rule Definition** and the **Violation Report**.
2.  Identify the exact changes needed in the **Integration Code Files** to comply with the rule and resolve the reported issues.
3.  Generate a patch reflecting these changes.
4.  The patch **MUST** be in the **unified diff format** (e.g., the output of `diff -u old_file new_file`).
5.  The patch should **ONLY** contain the necessary code modifications. Do **NOT** include any explanatory text, comments, or conversational filler before or after the diff block. Your entire output should be the raw diff.
6.  Focus on making the minimum necessary changes to achieve compliance.
7.  If multiple files are provided, ensure the diff correctly indicates changes for each respective file.

**Input Details:**

**1. The integration:**
{integration}

**2. The Rule Name/ID:**
{rule}

--- START OF ATTACHED FILES ---

--- FILE: rule-{rule}-description.md ---
{rule_content}
--- END FILE ---

--- FILE: rule-{rule}-report.md ---
{report_content}
--- END FILE ---

{files}

--- END OF ATTACHED FILES ---"#,
        integration = integration,
        rule = rule,
        rule_content = rule_content,
        report_content = report_content,
        files = files
    )
}

/// Footer appended to every generated report
pub fn report_footer(created_at: &str, usage: &UsageMetrics) -> String {
    format!(
        "\n\n_Created at {created_at}. {usage}_\n",
        created_at = created_at,
        usage = usage_line(usage)
    )
}

/// One-line token usage summary
pub fn usage_line(usage: &UsageMetrics) -> String {
    format!(
        "Prompt tokens: {}, Output tokens: {}, Total tokens: {}",
        usage.prompt_tokens, usage.output_tokens, usage.total_tokens
    )
}
