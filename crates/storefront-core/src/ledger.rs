//! Transaction Ledger Port
//!
//! Durable, append-only list of completed checkouts.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StorageError;
use crate::model::TransactionRecord;

/// Ledger storage trait
///
/// Implementations must keep records in append order and must serialize
/// concurrent appends so that no record is lost.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Append one record
    async fn append(&self, record: &TransactionRecord) -> Result<(), StorageError>;

    /// All records, oldest first
    async fn list_all(&self) -> Result<Vec<TransactionRecord>, StorageError>;
}

/// In-memory ledger (for development and tests)
#[derive(Debug, Default)]
pub struct MemoryLedger {
    records: RwLock<Vec<TransactionRecord>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn append(&self, record: &TransactionRecord) -> Result<(), StorageError> {
        self.records.write().await.push(record.clone());
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<TransactionRecord>, StorageError> {
        Ok(self.records.read().await.clone())
    }
}
