//! The ledger the route layer dispatches to, and an in-memory implementation
//! of its group, student and exam-item rules.

use async_trait::async_trait;
use shared::{
    command::{AddGroup, AddUser, DeliveryItem, GenerateSet, PrepareDelivery},
    domain::{LedgerEntry, Record},
    error::FailureKind,
};
use thiserror::Error;

mod memory;
mod record;

pub use memory::MemoryLedger;
pub use record::{DeliveryRecord, ExamItem, LedgerRecord, RecordType};

#[derive(Debug, Error)]
pub enum LedgerError {
    /// The ledger refused the operation under one of its business rules.
    #[error("{message}")]
    Rejected { kind: FailureKind, message: String },
    #[error("ledger failure: {0}")]
    Internal(#[from] anyhow::Error),
}

impl LedgerError {
    pub fn rejected(kind: FailureKind, message: impl Into<String>) -> Self {
        Self::Rejected {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            Self::Rejected { kind, .. } => Some(*kind),
            Self::Internal(_) => None,
        }
    }
}

/// One method per ledger function. Listing methods return entries in key
/// order; display ordering is the console's concern.
#[async_trait]
pub trait Ledger: Send + Sync {
    async fn list_groups(&self) -> Result<Vec<LedgerEntry>, LedgerError>;
    /// Returns the key the new group was stored under.
    async fn add_group(&self, command: &AddGroup) -> Result<String, LedgerError>;
    /// Returns the key the new student was stored under.
    async fn add_user(&self, command: &AddUser) -> Result<String, LedgerError>;
    async fn list_users(&self) -> Result<Vec<LedgerEntry>, LedgerError>;
    /// Returns how many students received a new exam item.
    async fn generate_set(&self, command: &GenerateSet) -> Result<usize, LedgerError>;
    async fn get_user_record(&self, key: &str) -> Result<Record, LedgerError>;
    async fn prepare_for_delivery(
        &self,
        command: &PrepareDelivery,
    ) -> Result<Vec<LedgerEntry>, LedgerError>;
    /// Returns the student record after the item was rated.
    async fn delivery_item(&self, command: &DeliveryItem) -> Result<Record, LedgerError>;
}
