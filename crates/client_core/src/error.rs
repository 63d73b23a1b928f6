use shared::{command::EncodeError, error::FailureKind, protocol::Operation};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The ledger answered with one of the operation's failure sentinels.
    #[error("{operation} rejected: {sentinel}")]
    Rejected {
        operation: Operation,
        kind: FailureKind,
        sentinel: &'static str,
    },
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error("invalid server url: {0}")]
    InvalidServerUrl(String),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{operation} answered {status}: {message}")]
    Status {
        operation: Operation,
        status: u16,
        message: String,
    },
    #[error("unexpected {operation} response: {source}")]
    Decode {
        operation: Operation,
        source: serde_json::Error,
    },
}

impl ClientError {
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Rejected { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidServerUrl(err.to_string())
    }
}
