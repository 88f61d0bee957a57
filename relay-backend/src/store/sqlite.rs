//! SQLite-backed record store.

use super::RecordStore;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use daily_record_types::{DailyRecord, MediaKind};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Mutex, MutexGuard};

pub struct SqliteRecordStore {
    conn: Mutex<Connection>,
}

impl SqliteRecordStore {
    pub fn open(path: &str) -> Result<Self, String> {
        let conn = if path == ":memory:" {
            Connection::open_in_memory()
        } else {
            if let Some(parent) = std::path::Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)
                        .map_err(|e| format!("Failed to create {}: {}", parent.display(), e))?;
                }
            }
            Connection::open(path)
        }
        .map_err(|e| format!("Failed to open database {}: {}", path, e))?;

        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(|e| format!("Failed to configure database: {}", e))?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.create_tables()?;
        Ok(store)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, String> {
        self.conn
            .lock()
            .map_err(|e| format!("Database lock poisoned: {}", e))
    }

    fn create_tables(&self) -> Result<(), String> {
        let conn = self.conn()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS daily_records (
                date_key TEXT PRIMARY KEY,
                media_id TEXT NOT NULL,
                media_kind TEXT NOT NULL,
                source_message_id INTEGER NOT NULL,
                captured_at TEXT NOT NULL,
                expires_at INTEGER NOT NULL
            )",
            [],
        )
        .map_err(|e| format!("Failed to create daily_records: {}", e))?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_daily_records_expiry ON daily_records(expires_at)",
            [],
        )
        .map_err(|e| format!("Failed to create expiry index: {}", e))?;

        Ok(())
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn get(&self, date_key: &str) -> Result<Option<DailyRecord>, String> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                "SELECT date_key, media_id, media_kind, source_message_id, captured_at
                 FROM daily_records
                 WHERE date_key = ?1 AND expires_at > ?2",
                params![date_key, Utc::now().timestamp()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, i32>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                },
            )
            .optional()
            .map_err(|e| format!("Failed to read record {}: {}", date_key, e))?;

        match row {
            Some((date, media_id, kind, source_message_id, captured_at)) => Ok(Some(DailyRecord {
                date,
                media_id,
                media_kind: kind.parse::<MediaKind>()?,
                source_message_id,
                captured_at,
            })),
            None => Ok(None),
        }
    }

    async fn set_if_absent(
        &self,
        date_key: &str,
        record: &DailyRecord,
        ttl: Duration,
    ) -> Result<bool, String> {
        let now = Utc::now();
        let expires_at = (now + ttl).timestamp();
        let conn = self.conn()?;

        // A stale row must not block the key
        conn.execute(
            "DELETE FROM daily_records WHERE date_key = ?1 AND expires_at <= ?2",
            params![date_key, now.timestamp()],
        )
        .map_err(|e| format!("Failed to clear stale record {}: {}", date_key, e))?;

        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO daily_records
                    (date_key, media_id, media_kind, source_message_id, captured_at, expires_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    date_key,
                    record.media_id,
                    record.media_kind.as_str(),
                    record.source_message_id,
                    record.captured_at,
                    expires_at,
                ],
            )
            .map_err(|e| format!("Failed to write record {}: {}", date_key, e))?;

        if inserted > 0 {
            log::info!(
                "[STORE] Saved {} {} (message {}) for {}",
                record.media_kind.as_str(),
                record.media_id,
                record.source_message_id,
                date_key
            );
        }

        Ok(inserted > 0)
    }

    async fn purge_expired(&self) -> Result<usize, String> {
        let conn = self.conn()?;
        conn.execute(
            "DELETE FROM daily_records WHERE expires_at <= ?1",
            params![Utc::now().timestamp()],
        )
        .map_err(|e| format!("Failed to purge expired records: {}", e))
    }
}
