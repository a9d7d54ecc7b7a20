//! `--stats` support: prints requests served, file-type breakdown, and
//! announce cadence without starting the serve loop.

use std::collections::BTreeMap;
use std::path::Path;

use crate::config::ServerConfig;
use crate::pages::PageStore;

pub struct Stats {
    pub requests_served: usize,
    pub requests_failed: usize,
    pub file_type_breakdown: BTreeMap<String, usize>,
    pub announce_interval_secs: u64,
    pub auto_announce_enabled: bool,
}

impl Stats {
    pub fn gather(storage_root: &Path) -> Self {
        let config = ServerConfig::load(storage_root);
        let pages = PageStore::new(storage_root.join("pages"));
        let entries = pages.list_pages().unwrap_or_default();

        let mut breakdown = BTreeMap::new();
        for entry in &entries {
            *breakdown.entry(entry.extension.clone()).or_insert(0) += 1;
        }

        let (served, failed) = count_access_log(storage_root);

        Self {
            requests_served: served,
            requests_failed: failed,
            file_type_breakdown: breakdown,
            announce_interval_secs: config.auto_announce_interval,
            auto_announce_enabled: config.auto_announce_enabled,
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "Requests served: {} success / {} failed\n",
            self.requests_served, self.requests_failed
        ));
        out.push_str("File types:\n");
        for (ext, count) in &self.file_type_breakdown {
            out.push_str(&format!("  .{ext}: {count}\n"));
        }
        out.push_str(&format!(
            "Announce: every {}s (auto-announce {})\n",
            self.announce_interval_secs,
            if self.auto_announce_enabled { "enabled" } else { "disabled" }
        ));
        out
    }
}

fn count_access_log(storage_root: &Path) -> (usize, usize) {
    let log_path = storage_root.join("access.log");
    let Ok(contents) = std::fs::read_to_string(log_path) else {
        return (0, 0);
    };
    let mut success = 0;
    let mut failed = 0;
    for line in contents.lines() {
        if line.ends_with("SUCCESS") {
            success += 1;
        } else if line.ends_with("FAILED") {
            failed += 1;
        }
    }
    (success, failed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gather_with_no_state_is_all_zero() {
        let dir = tempfile::tempdir().unwrap();
        let stats = Stats::gather(dir.path());
        assert_eq!(stats.requests_served, 0);
        assert_eq!(stats.requests_failed, 0);
    }

    #[test]
    fn gather_counts_access_log_lines() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("access.log"),
            "[2026-01-01 00:00:00] abc requested 'x' - SUCCESS\n\
             [2026-01-01 00:00:01] abc requested 'y' - FAILED\n",
        )
        .unwrap();
        let stats = Stats::gather(dir.path());
        assert_eq!(stats.requests_served, 1);
        assert_eq!(stats.requests_failed, 1);
    }
}
