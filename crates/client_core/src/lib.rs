use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::RawFields,
    error::MSG_UNEXPECTED,
    protocol::{BlogListing, BlogQuery, SubmissionResult},
};
use tracing::{error, info};

mod lifecycle;

pub use lifecycle::{
    Lifecycle, LifecycleState, SubmissionController, SubmitOutcome, DEFAULT_DISMISS_GRACE,
};

/// Anything that can carry an idea submission to the gateway.
///
/// Implementations report every failure as a `SubmissionResult`; they never
/// return an error to the lifecycle controller.
#[async_trait]
pub trait IdeaGateway: Send + Sync {
    async fn submit(&self, fields: RawFields) -> SubmissionResult;
}

/// HTTP client for the site server.
pub struct SiteClient {
    http: Client,
    server_url: String,
}

impl SiteClient {
    pub fn new(server_url: impl Into<String>) -> Self {
        let server_url: String = server_url.into();
        Self {
            http: Client::new(),
            server_url: server_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    async fn post_idea(&self, fields: &RawFields) -> Result<SubmissionResult> {
        let res = self
            .http
            .post(format!("{}/ideas", self.server_url))
            .form(fields)
            .send()
            .await?;
        let status = res.status();
        // the body carries a SubmissionResult for rejections too
        res.json()
            .await
            .with_context(|| format!("unreadable idea submission response (HTTP {status})"))
    }

    pub async fn blog(&self, query: &BlogQuery) -> Result<BlogListing> {
        let listing = self
            .http
            .get(format!("{}/blog", self.server_url))
            .query(query)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(listing)
    }
}

#[async_trait]
impl IdeaGateway for SiteClient {
    async fn submit(&self, fields: RawFields) -> SubmissionResult {
        match self.post_idea(&fields).await {
            Ok(result) => {
                info!(success = result.is_success(), "idea submission answered");
                result
            }
            Err(err) => {
                error!(error = %format!("{err:#}"), server_url = %self.server_url, "idea submission request failed");
                SubmissionResult::rejected(MSG_UNEXPECTED)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
