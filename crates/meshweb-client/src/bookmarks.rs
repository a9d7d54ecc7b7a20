//! Bookmarks: a user-curated subset of peers, unique by `peer_hash` —
//! saving over an existing hash replaces it rather than appending a
//! duplicate (see DESIGN.md for the rationale).

use std::path::{Path, PathBuf};

use meshweb_proto::persist::{read_json_or, write_json_atomic};
use meshweb_proto::DestinationHash;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bookmark {
    pub name: String,
    pub peer_hash: DestinationHash,
    pub added_at: i64,
}

pub struct BookmarkStore {
    path: PathBuf,
    entries: Mutex<Vec<Bookmark>>,
}

impl BookmarkStore {
    pub fn load(storage_root: &Path) -> Self {
        let path = storage_root.join("bookmarks.json");
        let entries = read_json_or(&path, Vec::new());
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    /// Inserts `bookmark`, replacing any existing entry for the same
    /// `peer_hash` rather than appending a duplicate.
    pub async fn upsert(&self, bookmark: Bookmark) {
        let mut entries = self.entries.lock().await;
        entries.retain(|existing| existing.peer_hash != bookmark.peer_hash);
        entries.push(bookmark);
        self.persist(&entries);
    }

    pub async fn remove(&self, peer_hash: DestinationHash) {
        let mut entries = self.entries.lock().await;
        entries.retain(|existing| existing.peer_hash != peer_hash);
        self.persist(&entries);
    }

    pub async fn snapshot(&self) -> Vec<Bookmark> {
        self.entries.lock().await.clone()
    }

    fn persist(&self, entries: &[Bookmark]) {
        if let Err(err) = write_json_atomic(&self.path, &entries) {
            tracing::warn!(path = %self.path.display(), error = %err, "failed to persist bookmarks");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bookmark(hash_byte: u8, name: &str) -> Bookmark {
        Bookmark {
            name: name.to_string(),
            peer_hash: DestinationHash::from_bytes([hash_byte; 16]),
            added_at: 0,
        }
    }

    #[tokio::test]
    async fn upsert_replaces_rather_than_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let store = BookmarkStore::load(dir.path());

        store.upsert(bookmark(1, "First Name")).await;
        store.upsert(bookmark(1, "Renamed")).await;

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].name, "Renamed");
    }

    #[tokio::test]
    async fn remove_drops_the_matching_entry() {
        let dir = tempfile::tempdir().unwrap();
        let store = BookmarkStore::load(dir.path());
        store.upsert(bookmark(1, "A")).await;
        store.upsert(bookmark(2, "B")).await;

        store.remove(DestinationHash::from_bytes([1; 16])).await;
        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].name, "B");
    }
}
