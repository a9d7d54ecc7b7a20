//! History: appended on every successful receipt, retained most-recent-N.
//! The cap is enforced at save time rather than on every read.

use std::path::{Path, PathBuf};

use meshweb_proto::constants::HISTORY_CAP;
use meshweb_proto::persist::{read_json_or, write_json_atomic};
use meshweb_proto::DestinationHash;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum HistoryKind {
    Page,
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub peer: DestinationHash,
    pub peer_name: String,
    pub resource_name: String,
    pub timestamp: i64,
    pub kind: HistoryKind,
}

pub struct HistoryStore {
    path: PathBuf,
    entries: Mutex<Vec<HistoryEntry>>,
}

impl HistoryStore {
    pub fn load(storage_root: &Path) -> Self {
        let path = storage_root.join("history.json");
        let entries = read_json_or(&path, Vec::new());
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    /// Appends `entry`, then truncates to the most recent
    /// [`HISTORY_CAP`] entries before persisting.
    pub async fn append(&self, entry: HistoryEntry) {
        let mut entries = self.entries.lock().await;
        entries.push(entry);
        if entries.len() > HISTORY_CAP {
            let overflow = entries.len() - HISTORY_CAP;
            entries.drain(0..overflow);
        }
        if let Err(err) = write_json_atomic(&self.path, &*entries) {
            tracing::warn!(path = %self.path.display(), error = %err, "failed to persist history");
        }
    }

    pub async fn snapshot(&self) -> Vec<HistoryEntry> {
        self.entries.lock().await.clone()
    }
}
