use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Business failures the ledger reports for an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// A precondition on the request failed, e.g. no unpassed test to deliver.
    Validation,
    /// The group, item or user does not exist.
    NotFound,
    /// An exam set could not be generated.
    Generation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Validation,
    NotFound,
    Generation,
    Internal,
}

impl ErrorCode {
    pub fn failure_kind(self) -> Option<FailureKind> {
        match self {
            Self::Validation => Some(FailureKind::Validation),
            Self::NotFound => Some(FailureKind::NotFound),
            Self::Generation => Some(FailureKind::Generation),
            Self::Internal => None,
        }
    }
}

impl From<FailureKind> for ErrorCode {
    fn from(kind: FailureKind) -> Self {
        match kind {
            FailureKind::Validation => Self::Validation,
            FailureKind::NotFound => Self::NotFound,
            FailureKind::Generation => Self::Generation,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Error)]
#[error("{code:?}: {message}")]
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

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }
}
