//! File Ledger
//!
//! Append-only JSON-lines store: one `TransactionRecord` per line. All
//! appends go through a single async mutex, so concurrent checkouts never
//! interleave or overwrite each other.

use std::io::{ErrorKind, SeekFrom};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::sync::Mutex;

use storefront_core::{Ledger, StorageError, TransactionRecord};

/// JSON-lines transaction ledger
#[derive(Debug)]
pub struct FileLedger {
    path: PathBuf,
    writer: Mutex<()>,
}

impl FileLedger {
    /// Open (or lazily create) the ledger at `path`.
    ///
    /// A file holding a single JSON array of records (the whole-file format)
    /// is converted to JSON lines in place. An array that does not parse is
    /// moved aside to `<path>.corrupt` and the ledger starts empty.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let ledger = Self {
            path: path.into(),
            writer: Mutex::new(()),
        };
        ledger.convert_array_format().await?;
        Ok(ledger)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_contents(&self) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(&self.path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Read(format!("{}: {e}", self.path.display()))),
        }
    }

    async fn convert_array_format(&self) -> Result<(), StorageError> {
        let _guard = self.writer.lock().await;

        let Some(contents) = self.read_contents().await? else {
            return Ok(());
        };
        if !contents.trim_start().starts_with('[') {
            return Ok(());
        }

        let records: Vec<TransactionRecord> = match serde_json::from_str(&contents) {
            Ok(records) => records,
            Err(e) => return self.quarantine(&e.to_string()).await,
        };

        let mut lines = String::new();
        for record in &records {
            lines.push_str(&serde_json::to_string(record)?);
            lines.push('\n');
        }

        let tmp = self.path.with_extension("migrating");
        fs::write(&tmp, lines)
            .await
            .map_err(|e| StorageError::Write(e.to_string()))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StorageError::Write(e.to_string()))?;

        tracing::info!(
            path = %self.path.display(),
            records = records.len(),
            "Converted array ledger to JSON lines"
        );
        Ok(())
    }

    async fn quarantine(&self, reason: &str) -> Result<(), StorageError> {
        let aside = self.path.with_extension("corrupt");
        fs::rename(&self.path, &aside)
            .await
            .map_err(|e| StorageError::Write(format!("{}: {e}", aside.display())))?;

        tracing::warn!(
            path = %self.path.display(),
            moved_to = %aside.display(),
            error = reason,
            "Unreadable array ledger moved aside, starting empty"
        );
        Ok(())
    }

    /// Whether the file ends mid-line (a previous write was cut short)
    async fn has_torn_tail(&self) -> Result<bool, StorageError> {
        let read_err =
            |e: std::io::Error| StorageError::Read(format!("{}: {e}", self.path.display()));

        let mut file = match File::open(&self.path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(read_err(e)),
        };
        if file.metadata().await.map_err(read_err)?.len() == 0 {
            return Ok(false);
        }

        let mut last = [0u8; 1];
        file.seek(SeekFrom::End(-1)).await.map_err(read_err)?;
        file.read_exact(&mut last).await.map_err(read_err)?;
        Ok(last[0] != b'\n')
    }
}

#[async_trait]
impl Ledger for FileLedger {
    async fn append(&self, record: &TransactionRecord) -> Result<(), StorageError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let _guard = self.writer.lock().await;

        if self.has_torn_tail().await? {
            tracing::warn!(
                path = %self.path.display(),
                "Ledger ends mid-line, starting a new line"
            );
            line.insert(0, b'\n');
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| StorageError::Write(format!("{}: {e}", self.path.display())))?;

        file.write_all(&line)
            .await
            .map_err(|e| StorageError::Write(e.to_string()))?;
        file.sync_data()
            .await
            .map_err(|e| StorageError::Write(e.to_string()))?;

        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<TransactionRecord>, StorageError> {
        let contents = {
            let _guard = self.writer.lock().await;
            self.read_contents().await?
        };
        let Some(contents) = contents else {
            return Ok(Vec::new());
        };

        let mut records = Vec::new();
        for (index, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(line) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!(
                    path = %self.path.display(),
                    line = index + 1,
                    error = %e,
                    "Skipping unreadable ledger entry"
                ),
            }
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use storefront_core::{CartLine, PaymentMethod, ShippingOption, TransactionId};

    fn record(n: i64) -> TransactionRecord {
        TransactionRecord {
            transaction_id: TransactionId::from_millis(1_700_000_000_000 + n),
            email: format!("customer{n}@example.com"),
            name: None,
            phone: None,
            cart: vec![CartLine {
                title: "Vase".into(),
                quantity: 2,
                price: dec!(50.00),
                color: Some("Red".into()),
                size: None,
                line_art: None,
                stand: None,
            }],
            subtotal: dec!(100.00),
            shipping_fee: dec!(120),
            total: dec!(220.00),
            shipping_address: "1 Main St".into(),
            shipping_option: ShippingOption::Courier,
            payment_method: PaymentMethod::OfflineTransfer,
            date: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = FileLedger::open(dir.path().join("tx.jsonl")).await.unwrap();
        assert!(ledger.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_then_list_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = FileLedger::open(dir.path().join("tx.jsonl")).await.unwrap();

        let appended: Vec<_> = (0..5).map(record).collect();
        for r in &appended {
            ledger.append(r).await.unwrap();
        }
        assert_eq!(ledger.list_all().await.unwrap(), appended);

        // survives reopening
        let reopened = FileLedger::open(ledger.path()).await.unwrap();
        assert_eq!(reopened.list_all().await.unwrap(), appended);
    }

    #[tokio::test]
    async fn test_concurrent_appends_lose_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Arc::new(FileLedger::open(dir.path().join("tx.jsonl")).await.unwrap());

        let tasks = (0..20).map(|n| {
            let ledger = ledger.clone();
            tokio::spawn(async move { ledger.append(&record(n)).await })
        });
        for result in futures::future::join_all(tasks).await {
            result.unwrap().unwrap();
        }

        let records = ledger.list_all().await.unwrap();
        assert_eq!(records.len(), 20);
        let mut ids: Vec<_> = records.into_iter().map(|r| r.transaction_id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 20);
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tx.jsonl");
        let good = serde_json::to_string(&record(1)).unwrap();
        std::fs::write(&path, format!("{good}\n{{\"transactionId\": \n")).unwrap();

        let ledger = FileLedger::open(&path).await.unwrap();
        let records = ledger.list_all().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].transaction_id, record(1).transaction_id);

        ledger.append(&record(2)).await.unwrap();
        assert_eq!(ledger.list_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_array_format_is_converted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transactions.json");
        let array = vec![record(1), record(2)];
        std::fs::write(&path, serde_json::to_string_pretty(&array).unwrap()).unwrap();

        let ledger = FileLedger::open(&path).await.unwrap();
        assert_eq!(ledger.list_all().await.unwrap(), array);

        ledger.append(&record(3)).await.unwrap();
        assert_eq!(ledger.list_all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_append_after_torn_tail_keeps_new_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tx.jsonl");
        let good = serde_json::to_string(&record(1)).unwrap();
        std::fs::write(&path, format!("{good}\n{{\"transactionId\":\"TXN-1")).unwrap();

        let ledger = FileLedger::open(&path).await.unwrap();
        ledger.append(&record(2)).await.unwrap();

        let ids: Vec<_> = ledger
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.transaction_id)
            .collect();
        assert_eq!(ids, vec![record(1).transaction_id, record(2).transaction_id]);
    }

    #[tokio::test]
    async fn test_unreadable_array_is_moved_aside() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transactions.json");
        let truncated = "[{\"transactionId\": \"TXN-1\",";
        std::fs::write(&path, truncated).unwrap();

        let ledger = FileLedger::open(&path).await.unwrap();
        assert!(ledger.list_all().await.unwrap().is_empty());
        assert_eq!(
            std::fs::read_to_string(path.with_extension("corrupt")).unwrap(),
            truncated
        );

        let first = record(1);
        ledger.append(&first).await.unwrap();
        assert_eq!(ledger.list_all().await.unwrap(), vec![first]);
    }
}
