//! Daily record storage.
//!
//! Records are keyed by the local date string. Writes are conditional: once a
//! date has a record it is never overwritten.

mod sqlite;

pub use sqlite::SqliteRecordStore;

use async_trait::async_trait;
use chrono::Duration;
use daily_record_types::DailyRecord;

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch the unexpired record for `date_key`
    async fn get(&self, date_key: &str) -> Result<Option<DailyRecord>, String>;

    /// Insert `record` under `date_key` unless one already exists.
    ///
    /// Returns `Ok(false)` when an unexpired record was already present.
    async fn set_if_absent(
        &self,
        date_key: &str,
        record: &DailyRecord,
        ttl: Duration,
    ) -> Result<bool, String>;

    /// Delete expired records, returning how many were removed
    async fn purge_expired(&self) -> Result<usize, String> {
        Ok(0)
    }
}

/// Stand-in used when the database could not be opened.
pub struct DisabledStore {
    reason: String,
}

impl DisabledStore {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl RecordStore for DisabledStore {
    async fn get(&self, _date_key: &str) -> Result<Option<DailyRecord>, String> {
        Err(format!("Record store unavailable: {}", self.reason))
    }

    async fn set_if_absent(
        &self,
        _date_key: &str,
        _record: &DailyRecord,
        _ttl: Duration,
    ) -> Result<bool, String> {
        Err(format!("Record store unavailable: {}", self.reason))
    }

    async fn purge_expired(&self) -> Result<usize, String> {
        Err(format!("Record store unavailable: {}", self.reason))
    }
}
