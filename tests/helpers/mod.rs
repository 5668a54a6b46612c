//! Shared test fixtures.

use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;
use vigil::domain::models::ExchangeConfig;
use vigil::{FileQueueStore, NullTransport};

/// An exchange config with short intervals so tests poll fast.
pub fn fast_exchange_config(bridge_dir: &Path) -> ExchangeConfig {
    ExchangeConfig {
        bridge_dir: bridge_dir.display().to_string(),
        poll_interval_ms: 50,
        escalation_timeout_secs: 2,
        sync_timeout_secs: 5,
        crash_responder: "gemini_1".to_string(),
        stuck_responder: "claude".to_string(),
    }
}

/// A fresh store over a temporary bridge directory, no synchronization.
pub async fn temp_store() -> (TempDir, FileQueueStore) {
    let dir = TempDir::new().expect("failed to create temp bridge dir");
    let store = FileQueueStore::open(dir.path(), Arc::new(NullTransport))
        .await
        .expect("failed to open store");
    (dir, store)
}

/// A second store over the same bridge directory, as the peer would see
/// it when both sides share one filesystem.
pub async fn peer_store(dir: &TempDir) -> FileQueueStore {
    FileQueueStore::open(dir.path(), Arc::new(NullTransport))
        .await
        .expect("failed to open peer store")
}
