use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::domain::{BlogPost, IdeaPayload};
use thiserror::Error;

mod airtable;

pub use airtable::{AirtableConfig, AirtableStore};

/// Structured answer from the record store for a create call.
///
/// `error` is meant for end users; `detail` only ever goes to logs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRecordResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl CreateRecordResponse {
    pub fn created() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    pub fn failed(error: Option<String>, detail: Option<String>) -> Self {
        Self {
            success: false,
            error,
            detail,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record store request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid record store url: {0}")]
    Url(String),
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn create_idea_record(
        &self,
        payload: &IdeaPayload,
    ) -> Result<CreateRecordResponse, StoreError>;

    async fn list_blog_posts(&self) -> Result<Vec<BlogPost>, StoreError>;
}
