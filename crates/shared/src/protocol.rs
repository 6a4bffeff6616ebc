use serde::{Deserialize, Serialize};

use crate::{
    domain::BlogPost,
    error::{SubmissionError, MSG_SUBMIT_FAILED},
};

/// Outcome of one idea submission, as seen by a front end.
///
/// On the wire this is `{"success":true}` or `{"success":false,"message":"..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SubmissionResultWire", into = "SubmissionResultWire")]
pub enum SubmissionResult {
    Accepted,
    Rejected { message: String },
}

impl SubmissionResult {
    /// Builds a rejection, substituting the generic fallback for an empty message.
    pub fn rejected(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.is_empty() {
            return Self::Rejected {
                message: MSG_SUBMIT_FAILED.to_string(),
            };
        }
        Self::Rejected { message }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionResult::Accepted)
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            SubmissionResult::Accepted => None,
            SubmissionResult::Rejected { message } => Some(message),
        }
    }
}

impl From<SubmissionError> for SubmissionResult {
    fn from(err: SubmissionError) -> Self {
        Self::rejected(err.user_message())
    }
}

#[derive(Serialize, Deserialize)]
struct SubmissionResultWire {
    success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl From<SubmissionResultWire> for SubmissionResult {
    fn from(wire: SubmissionResultWire) -> Self {
        if wire.success {
            SubmissionResult::Accepted
        } else {
            SubmissionResult::rejected(wire.message.unwrap_or_default())
        }
    }
}

impl From<SubmissionResult> for SubmissionResultWire {
    fn from(result: SubmissionResult) -> Self {
        match result {
            SubmissionResult::Accepted => Self {
                success: true,
                message: None,
            },
            SubmissionResult::Rejected { message } => Self {
                success: false,
                message: Some(message),
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, rename = "q", skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogListing {
    pub categories: Vec<String>,
    pub posts: Vec<BlogPost>,
}
