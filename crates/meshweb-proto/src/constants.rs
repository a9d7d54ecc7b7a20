//! Protocol-level field tag constants and default timings.

/// Server→client HTML body (string).
pub const FIELD_HTML_CONTENT: u8 = 10;
/// Client→server page name (string).
pub const FIELD_HTML_REQUEST: u8 = 11;
/// Server→client list of `(filename, bytes)` pairs.
pub const FIELD_FILE_ATTACHMENTS: u8 = 2;

/// Minimum bound for the send-path wait before a destination is declared
/// unreachable.
pub const PATH_WAIT_TIMEOUT_SECS: u64 = 15;

/// Default announce re-broadcast interval.
pub const DEFAULT_ANNOUNCE_INTERVAL_SECS: u64 = 1800;
/// Minimum configurable announce interval.
pub const MIN_ANNOUNCE_INTERVAL_SECS: u64 = 60;
/// Scheduler wakeup cadence, independent of the announce interval itself.
pub const ANNOUNCE_SCHEDULER_TICK_SECS: u64 = 10;

/// Suggested TTL after which an idle pending client request is swept.
pub const PENDING_REQUEST_TTL_SECS: u64 = 60;

/// Retained history length.
pub const HISTORY_CAP: usize = 100;

/// The canonical capability marker. Embedded verbatim (and stripped
/// verbatim) in announce display names.
pub const HTML_MARKER: &str = "[HTML]";
/// Loose, second-class marker accepted for tolerance.
pub const HTML_MARKER_LOOSE: &str = "HTML";

/// Substring the correlator looks for in a plain-text body to recognize a
/// LIST response, matching the literal wording produced by the text index.
pub const SENTINEL_AVAILABLE_PAGES: &str = "Available Files";
