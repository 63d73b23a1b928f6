//! Maps raw ledger bodies onto results, once, at the client boundary.
//!
//! Sentinel detection runs first and exits early; only a body that is not a
//! sentinel is ever parsed as a payload.

use serde_json::Value;
use shared::{
    domain::{LedgerEntry, Payload},
    protocol::Operation,
};
use tracing::warn;

use crate::error::ClientError;

pub fn reject_sentinel(operation: Operation, body: &str) -> Result<(), ClientError> {
    match operation
        .sentinels()
        .iter()
        .find(|sentinel| sentinel.body == body)
    {
        Some(sentinel) => {
            warn!(%operation, sentinel = sentinel.body, "ledger rejected request");
            Err(ClientError::Rejected {
                operation,
                kind: sentinel.kind,
                sentinel: sentinel.body,
            })
        }
        None => Ok(()),
    }
}

/// Anything that is not a sentinel is a success. Bodies that are not JSON are
/// kept as a JSON string.
pub fn classify_status(operation: Operation, body: &str) -> Result<Payload, ClientError> {
    reject_sentinel(operation, body)?;
    Ok(serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string())))
}

pub fn classify_listing(operation: Operation, body: &str) -> Result<Vec<LedgerEntry>, ClientError> {
    reject_sentinel(operation, body)?;
    serde_json::from_str(body).map_err(|source| ClientError::Decode { operation, source })
}

#[cfg(test)]
#[path = "tests/classify_tests.rs"]
mod tests;
