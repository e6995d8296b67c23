//! site_audit tool implementation.
//!
//! Runs the full audit pipeline for one URL and returns the rendered document.

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sitebrief_client::{AuditOptions, AuditPipeline, CachePolicy};
use sitebrief_core::{Error, TemplateKind};

/// Input parameters for the site_audit tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SiteAuditParams {
    /// The website to audit. A bare host such as "example.com" is accepted.
    pub url: String,

    /// Output template: "strategic" (default) or "builder_prompt".
    #[serde(default)]
    pub template: Option<String>,

    /// Also return the merged site profile as JSON.
    #[serde(default)]
    pub include_profile: bool,

    /// Ignore cached performance reports and pages for this run.
    #[serde(default)]
    pub refresh: bool,
}

impl SiteAuditParams {
    fn options(&self) -> Result<AuditOptions, Error> {
        let template = match self.template.as_deref() {
            Some(name) => name.parse::<TemplateKind>()?,
            None => TemplateKind::StrategicDocument,
        };
        let cache_policy = if self.refresh { CachePolicy::Refresh } else { CachePolicy::Use };

        Ok(AuditOptions { template, cache_policy, ..Default::default() })
    }
}

/// Implementation of the site_audit tool.
pub async fn audit_impl(pipeline: &AuditPipeline, params: SiteAuditParams) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(Error::InvalidInput("url cannot be empty".into()).into());
    }

    let options = params.options()?;
    let report = pipeline.run(&params.url, &options).await?;

    let mut content = vec![Content::text(report.document.text)];
    if params.include_profile {
        let profile = serde_json::to_string_pretty(&report.profile)
            .map_err(|e| Error::InvalidInput(format!("Failed to serialize profile: {e}")))?;
        content.push(Content::text(profile));
    }

    Ok(CallToolResult::success(content))
}
