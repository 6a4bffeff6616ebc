use std::{any::Any, panic::AssertUnwindSafe, sync::Arc};

use futures::FutureExt;
use record_store::RecordStore;
use shared::{
    domain::{
        IdeaPayload, RawFields, FIELD_CATEGORY, FIELD_PROBLEM, FIELD_RESOURCES, FIELD_SOLUTION,
        FIELD_TITLE,
    },
    error::{ApiError, ErrorCode, SubmissionError},
    listing::build_listing,
    protocol::{BlogListing, BlogQuery, SubmissionResult},
};
use tracing::{debug, error, info, warn};

#[derive(Clone)]
pub struct ApiContext {
    pub store: Arc<dyn RecordStore>,
}

impl ApiContext {
    pub fn new(store: impl RecordStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

pub fn ideas_route() -> &'static str {
    "/ideas"
}

pub fn blog_route() -> &'static str {
    "/blog"
}

/// Presence check over the required fields, then the normalized payload.
pub fn validate_fields(fields: &RawFields) -> Result<IdeaPayload, SubmissionError> {
    let missing = fields.missing_required();
    if !missing.is_empty() {
        return Err(SubmissionError::Validation { missing });
    }

    let field = |name: &str| fields.get(name).unwrap_or_default().to_string();
    Ok(IdeaPayload {
        title: field(FIELD_TITLE),
        problem: field(FIELD_PROBLEM),
        solution: field(FIELD_SOLUTION),
        resources: field(FIELD_RESOURCES),
        category: field(FIELD_CATEGORY),
    })
}

/// Validates and forwards one idea, reporting failures as typed errors.
///
/// Makes at most one store call. A panic inside the store client is caught and
/// reported as a transport fault.
pub async fn try_submit_idea(ctx: &ApiContext, fields: &RawFields) -> Result<(), SubmissionError> {
    let payload = validate_fields(fields)?;

    let response = match AssertUnwindSafe(ctx.store.create_idea_record(&payload))
        .catch_unwind()
        .await
    {
        Ok(Ok(response)) => response,
        Ok(Err(err)) => return Err(SubmissionError::TransportFault(err.to_string())),
        Err(panic) => return Err(SubmissionError::TransportFault(panic_message(panic))),
    };

    if response.success {
        Ok(())
    } else {
        Err(SubmissionError::StoreRejection {
            message: response.error,
            detail: response.detail,
        })
    }
}

/// Logs a submission outcome and turns it into the value shown to the user.
pub fn settle_submission(outcome: Result<(), SubmissionError>) -> SubmissionResult {
    match outcome {
        Ok(()) => {
            info!("idea submitted");
            SubmissionResult::Accepted
        }
        Err(err) => {
            match &err {
                SubmissionError::Validation { missing } => {
                    debug!(?missing, "idea submission incomplete");
                }
                SubmissionError::StoreRejection { message, detail } => {
                    warn!(
                        error = message.as_deref().unwrap_or("-"),
                        detail = detail.as_deref().unwrap_or("-"),
                        "idea submission rejected by record store"
                    );
                }
                SubmissionError::TransportFault(fault) => {
                    error!(%fault, "unexpected error while submitting idea");
                }
            }
            SubmissionResult::from(err)
        }
    }
}

pub async fn submit_idea(ctx: &ApiContext, fields: &RawFields) -> SubmissionResult {
    settle_submission(try_submit_idea(ctx, fields).await)
}

pub async fn list_blog(ctx: &ApiContext, query: &BlogQuery) -> Result<BlogListing, ApiError> {
    let posts = ctx.store.list_blog_posts().await.map_err(|err| {
        error!(error = %err, "failed to load blog posts");
        ApiError::new(ErrorCode::Upstream, "blog posts are unavailable")
    })?;
    Ok(build_listing(posts, query))
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("record store client panicked: {message}")
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("record store client panicked: {message}")
    } else {
        "record store client panicked".to_string()
    }
}
