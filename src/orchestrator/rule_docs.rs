use crate::models::DocsConfig;
use crate::Result;
use anyhow::Context;

/// Fetches rule descriptions from the developer documentation
pub struct RuleDocs {
    client: reqwest::Client,
    docs: DocsConfig,
}

impl RuleDocs {
    pub fn new(docs: DocsConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            docs,
        }
    }

    /// Raw Markdown text of a rule
    pub async fn fetch(&self, rule: &str) -> Result<String> {
        let url = self.docs.rule_raw_url(rule);
        tracing::debug!(rule, url = %url, "fetching rule description");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch rule '{}' from {}", rule, url))?
            .error_for_status()
            .with_context(|| format!("Rule '{}' could not be fetched from {}", rule, url))?;

        response
            .text()
            .await
            .with_context(|| format!("Failed to read rule '{}' body", rule))
    }

    /// Page linked from reports for a rule
    pub fn rule_url(&self, rule: &str) -> String {
        self.docs.rule_docs_url(rule)
    }

    /// Page linked from reports for an integration
    pub fn integration_url(&self, integration: &str) -> String {
        self.docs.integration_docs_url(integration)
    }
}
