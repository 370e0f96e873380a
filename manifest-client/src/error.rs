//! Client error types

use shared::error::AppError;
use shared::models::RecordId;
use thiserror::Error;

/// Local validation failure; no network call is made when one is reported
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationIssue {
    #[error("nothing selected")]
    NothingSelected,

    #[error("manifest has no records")]
    EmptyDraft,

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("no acting user or branch for this session")]
    MissingOperator,

    #[error("record {0} is not in the draft")]
    NotInDraft(RecordId),
}

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Authentication required
    #[error("Authentication required")]
    Unauthorized,

    /// Request rejected locally before reaching the server
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationIssue),

    /// Server reported a structured error
    #[error("Server error: {0}")]
    Server(#[from] AppError),

    /// A commit is already waiting for its response
    #[error("A manifest submission is already in flight")]
    SubmissionInFlight,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// Whether the operator may simply retry the same action
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::Server(e) => e.is_transient(),
            _ => false,
        }
    }

    /// The validation issue, if this is a local validation failure
    pub fn validation_issue(&self) -> Option<&ValidationIssue> {
        match self {
            Self::Validation(issue) => Some(issue),
            _ => None,
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
