use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use shared::domain::{BlogPost, IdeaPayload};
use tracing::{debug, warn};
use url::Url;

use crate::{CreateRecordResponse, RecordStore, StoreError};

pub const DEFAULT_API_URL: &str = "https://api.airtable.com/v0";

const MSG_NOT_CONFIGURED: &str = "Idea submissions are not configured yet.";
const MSG_UNAVAILABLE: &str = "Idea submissions are temporarily unavailable.";
const MSG_FIELDS_REJECTED: &str =
    "Some fields were rejected. Please review your submission and try again.";
const MSG_RATE_LIMITED: &str = "Too many submissions right now. Please try again shortly.";
const MAX_DETAIL_CHARS: usize = 512;

#[derive(Debug, Clone)]
pub struct AirtableConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub base_id: Option<String>,
    pub ideas_table: String,
    pub blog_table: String,
    pub timeout: Duration,
}

impl Default for AirtableConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            api_key: None,
            base_id: None,
            ideas_table: "Ideas".into(),
            blog_table: "Blog".into(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Record store backed by the Airtable REST API.
pub struct AirtableStore {
    client: Client,
    config: AirtableConfig,
}

#[derive(Debug, Serialize)]
struct IdeaFields<'a> {
    #[serde(rename = "Title")]
    title: &'a str,
    #[serde(rename = "Problem")]
    problem: &'a str,
    #[serde(rename = "Solution")]
    solution: &'a str,
    #[serde(rename = "Resources")]
    resources: &'a str,
    #[serde(rename = "Category")]
    category: &'a str,
}

impl<'a> From<&'a IdeaPayload> for IdeaFields<'a> {
    fn from(payload: &'a IdeaPayload) -> Self {
        Self {
            title: &payload.title,
            problem: &payload.problem,
            solution: &payload.solution,
            resources: &payload.resources,
            category: &payload.category,
        }
    }
}

#[derive(Debug, Serialize)]
struct CreateRecordRequest<'a> {
    fields: IdeaFields<'a>,
    typecast: bool,
}

#[derive(Debug, Deserialize)]
struct CreatedRecord {
    id: String,
}

#[derive(Debug, Deserialize)]
struct RecordList<T> {
    #[serde(default)]
    records: Vec<Record<T>>,
}

#[derive(Debug, Deserialize)]
struct Record<T> {
    id: String,
    fields: T,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BlogFields {
    #[serde(rename = "Title")]
    title: Option<String>,
    #[serde(rename = "Slug")]
    slug: Option<String>,
    #[serde(rename = "Excerpt")]
    excerpt: Option<String>,
    #[serde(rename = "Category")]
    category: Option<String>,
    #[serde(rename = "Date")]
    date: Option<NaiveDate>,
}

impl AirtableStore {
    pub fn new(config: AirtableConfig) -> Result<Self, StoreError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    fn credentials(&self) -> Option<(&str, &str)> {
        let api_key = self.config.api_key.as_deref().filter(|v| !v.is_empty())?;
        let base_id = self.config.base_id.as_deref().filter(|v| !v.is_empty())?;
        Some((api_key, base_id))
    }

    fn table_url(&self, base_id: &str, table: &str) -> Result<Url, StoreError> {
        let mut url = Url::parse(&self.config.api_url)
            .map_err(|e| StoreError::Url(format!("{}: {e}", self.config.api_url)))?;
        url.path_segments_mut()
            .map_err(|_| StoreError::Url(format!("{} cannot be a base", self.config.api_url)))?
            .pop_if_empty()
            .push(base_id)
            .push(table);
        Ok(url)
    }
}

#[async_trait]
impl RecordStore for AirtableStore {
    async fn create_idea_record(
        &self,
        payload: &IdeaPayload,
    ) -> Result<CreateRecordResponse, StoreError> {
        let Some((api_key, base_id)) = self.credentials() else {
            warn!("airtable api key or base id missing; idea not forwarded");
            return Ok(CreateRecordResponse::failed(
                Some(MSG_NOT_CONFIGURED.into()),
                Some("airtable api key or base id missing".into()),
            ));
        };

        let url = self.table_url(base_id, &self.config.ideas_table)?;
        let response = self
            .client
            .post(url)
            .bearer_auth(api_key)
            .json(&CreateRecordRequest {
                fields: IdeaFields::from(payload),
                typecast: true,
            })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let created: CreatedRecord = response.json().await?;
            debug!(record_id = %created.id, "idea record created");
            return Ok(CreateRecordResponse::created());
        }

        let detail = match response.text().await {
            Ok(body) => format!("HTTP {status}: {}", truncate(&body)),
            Err(err) => {
                debug!(error = %err, "failed to read airtable rejection body");
                format!("HTTP {status}: body unreadable: {err}")
            }
        };
        Ok(CreateRecordResponse::failed(
            rejection_message(status).map(str::to_string),
            Some(detail),
        ))
    }

    async fn list_blog_posts(&self) -> Result<Vec<BlogPost>, StoreError> {
        let Some((api_key, base_id)) = self.credentials() else {
            warn!("airtable api key or base id missing; blog index is empty");
            return Ok(Vec::new());
        };

        let url = self.table_url(base_id, &self.config.blog_table)?;
        let list: RecordList<BlogFields> = self
            .client
            .get(url)
            .bearer_auth(api_key)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(list
            .records
            .into_iter()
            .filter_map(|record| {
                let Some(title) = record.fields.title.filter(|t| !t.is_empty()) else {
                    debug!(record_id = %record.id, "skipping blog record without title");
                    return None;
                };
                Some(BlogPost {
                    title,
                    slug: record.fields.slug.unwrap_or(record.id),
                    excerpt: record.fields.excerpt,
                    category: record.fields.category,
                    published_on: record.fields.date,
                })
            })
            .collect())
    }
}

/// User-presentable text for an HTTP rejection; raw bodies stay in logs.
fn rejection_message(status: StatusCode) -> Option<&'static str> {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
            Some(MSG_UNAVAILABLE)
        }
        StatusCode::UNPROCESSABLE_ENTITY => Some(MSG_FIELDS_REJECTED),
        StatusCode::TOO_MANY_REQUESTS => Some(MSG_RATE_LIMITED),
        _ => None,
    }
}

fn truncate(body: &str) -> &str {
    match body.char_indices().nth(MAX_DETAIL_CHARS) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[cfg(test)]
#[path = "tests/airtable_tests.rs"]
mod tests;
