//! Background worker that drops expired daily records.

use crate::store::RecordStore;
use std::sync::Arc;
use std::time::Duration;

pub async fn run_worker(store: Arc<dyn RecordStore>, interval_secs: u64) {
    log::info!("[HOUSEKEEPING] Worker started (interval: {}s)", interval_secs);

    loop {
        tokio::time::sleep(Duration::from_secs(interval_secs)).await;
        purge_tick(store.as_ref()).await;
    }
}

/// One purge pass; returns the number of records removed
pub async fn purge_tick(store: &dyn RecordStore) -> usize {
    match store.purge_expired().await {
        Ok(0) => 0,
        Ok(removed) => {
            log::info!("[HOUSEKEEPING] Purged {} expired records", removed);
            removed
        }
        Err(e) => {
            log::error!("[HOUSEKEEPING] Purge failed: {}", e);
            0
        }
    }
}
