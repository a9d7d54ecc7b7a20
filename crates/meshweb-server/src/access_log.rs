//! Access log: one line per served request, appended, with monotonically
//! non-decreasing timestamps.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use time::macros::format_description;
use time::OffsetDateTime;

use crate::error::ServerError;

pub struct AccessLog {
    path: PathBuf,
    file: Mutex<std::fs::File>,
}

impl AccessLog {
    pub fn open(storage_root: &Path) -> Result<Self, ServerError> {
        let path = storage_root.join("access.log");
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `[timestamp] <peer_hex> requested '<page>' - SUCCESS|FAILED`.
    pub fn record(&self, peer_hex: &str, page: &str, success: bool) {
        let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        let timestamp = now.format(&format).unwrap_or_else(|_| "unknown-time".to_string());
        let status = if success { "SUCCESS" } else { "FAILED" };
        let line = format!("[{timestamp}] {peer_hex} requested '{page}' - {status}\n");

        let mut file = match self.file.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(err) = file.write_all(line.as_bytes()) {
            tracing::warn!(error = %err, "failed to append access log line");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_appends_one_line_per_call() {
        let dir = tempfile::tempdir().unwrap();
        let log = AccessLog::open(dir.path()).unwrap();
        log.record("abcd1234", "about.html", true);
        log.record("abcd1234", "missing.html", false);

        let contents = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("SUCCESS"));
        assert!(lines[1].ends_with("FAILED"));
    }
}
