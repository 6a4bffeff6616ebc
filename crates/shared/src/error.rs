use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MSG_REQUIRED_FIELDS: &str = "Please fill in all required fields.";
pub const MSG_SUBMIT_FAILED: &str = "Failed to submit. Please try again.";
pub const MSG_UNEXPECTED: &str = "An unexpected error occurred.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Validation,
    Upstream,
    Internal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Every way an idea submission can fail before it becomes a user-facing result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("missing required fields: {}", missing.join(", "))]
    Validation { missing: Vec<&'static str> },
    #[error("record store rejected the submission: {}", detail.as_deref().or(message.as_deref()).unwrap_or("no reason given"))]
    StoreRejection {
        message: Option<String>,
        detail: Option<String>,
    },
    #[error("record store call failed: {0}")]
    TransportFault(String),
}

impl SubmissionError {
    pub fn code(&self) -> ErrorCode {
        match self {
            SubmissionError::Validation { .. } => ErrorCode::Validation,
            SubmissionError::StoreRejection { .. } => ErrorCode::Upstream,
            SubmissionError::TransportFault(_) => ErrorCode::Internal,
        }
    }

    /// Text that is safe to show to the person who filled in the form.
    ///
    /// Transport detail never reaches this string.
    pub fn user_message(&self) -> String {
        match self {
            SubmissionError::Validation { .. } => MSG_REQUIRED_FIELDS.to_string(),
            SubmissionError::StoreRejection { message, .. } => message
                .as_deref()
                .filter(|message| !message.is_empty())
                .unwrap_or(MSG_SUBMIT_FAILED)
                .to_string(),
            SubmissionError::TransportFault(_) => MSG_UNEXPECTED.to_string(),
        }
    }
}
