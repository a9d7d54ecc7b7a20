//! Request Dispatcher: parses an inbound request (structured field or
//! text command) and produces the outgoing response shape, recording one
//! access-log line per served request.

use meshweb_proto::{FileAttachment, InboundPayload};

use crate::access_log::AccessLog;
use crate::pages::PageKind;
use crate::pages::{human_size, PageStore};
use crate::template::{self, is_index_request};

#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// Dynamic index: HTML sent via `FIELD_HTML_CONTENT`, text sent as a
    /// separate plain body.
    Index { html: String, text: String },
    /// A page resolved and read successfully.
    Page { html: String, body_text: String },
    /// A non-HTML supported file, sent as an attachment.
    File {
        files: Vec<FileAttachment>,
        body_text: String,
    },
    /// Resolution failed (missing or traversal) — always rendered as a 404.
    NotFound { html: String, body_text: String },
    /// `announce|hello|ping` acknowledgement.
    Ack { text: String },
    /// Anything unrecognized.
    Help { text: String },
}

pub struct Dispatcher<'a> {
    pages: &'a PageStore,
    access_log: &'a AccessLog,
    server_name: String,
}

impl<'a> Dispatcher<'a> {
    pub fn new(pages: &'a PageStore, access_log: &'a AccessLog, server_name: impl Into<String>) -> Self {
        Self {
            pages,
            access_log,
            server_name: server_name.into(),
        }
    }

    /// Parses `payload`/`content` into a page-name request, then serves
    /// it, recording one access-log line whenever a page was actually
    /// served (index/page/file/not-found) — acks and help replies are not
    /// requests for a named page and are not logged.
    pub fn handle(&self, peer_hex: &str, payload: &InboundPayload, content: &str) -> DispatchOutcome {
        if let InboundPayload::PageRequest { name } = payload {
            return self.serve(peer_hex, name);
        }

        let trimmed = content.trim();
        let lower = trimmed.to_lowercase();
        match lower.as_str() {
            "list" | "pages" | "dir" | "ls" | "_index" | "_list" | "index" => {
                self.serve(peer_hex, "index")
            }
            "announce" | "hello" | "ping" => DispatchOutcome::Ack {
                text: "Server received your announcement".to_string(),
            },
            _ => {
                if let Some(rest) = strip_get_prefix(trimmed) {
                    self.serve(peer_hex, rest)
                } else {
                    DispatchOutcome::Help {
                        text: help_text(),
                    }
                }
            }
        }
    }

    fn serve(&self, peer_hex: &str, page_name: &str) -> DispatchOutcome {
        if is_index_request(page_name) {
            let pages = self.pages.list_pages().unwrap_or_default();
            let html = template::render_index_html(&self.server_name, &pages);
            let text = template::render_index_text(&pages);
            self.access_log.record(peer_hex, "INDEX", true);
            return DispatchOutcome::Index { html, text };
        }

        let Some(entry) = self.pages.resolve(page_name) else {
            self.access_log.record(peer_hex, page_name, false);
            return DispatchOutcome::NotFound {
                html: not_found_html(page_name),
                body_text: format!("404: {page_name}"),
            };
        };

        let outcome = match entry.kind {
            PageKind::Html => match self.pages.read_to_string(&entry) {
                Ok(raw) => {
                    let pages = self.pages.list_pages().unwrap_or_default();
                    let rendered = template::substitute_with_pages(&raw, &pages);
                    DispatchOutcome::Page {
                        html: rendered,
                        body_text: format!("Serving: {}", entry.filename),
                    }
                }
                Err(_) => DispatchOutcome::NotFound {
                    html: not_found_html(page_name),
                    body_text: format!("404: {page_name}"),
                },
            },
            _ => match self.pages.read(&entry) {
                Ok(bytes) => DispatchOutcome::File {
                    body_text: format!(
                        "File: {} ({})",
                        entry.filename,
                        human_size(entry.size_bytes)
                    ),
                    files: vec![(entry.filename.clone(), bytes)],
                },
                Err(_) => DispatchOutcome::NotFound {
                    html: not_found_html(page_name),
                    body_text: format!("404: {page_name}"),
                },
            },
        };

        let success = !matches!(outcome, DispatchOutcome::NotFound { .. });
        self.access_log.record(peer_hex, page_name, success);
        outcome
    }
}

fn strip_get_prefix(content: &str) -> Option<&str> {
    content
        .strip_prefix("GET:")
        .or_else(|| content.strip_prefix("get:"))
}

fn not_found_html(page_name: &str) -> String {
    format!("<html><body><h1>404</h1><p>{page_name} not found.</p></body></html>")
}

fn help_text() -> String {
    "Unknown command. Send 'list' for the file index, 'GET:<name>' for a \
     specific file, or 'announce'/'hello'/'ping' to check connectivity."
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (tempfile::TempDir, tempfile::TempDir) {
        let pages_dir = tempfile::tempdir().unwrap();
        std::fs::write(
            pages_dir.path().join("about.html"),
            "<html>{{timestamp}} {{page_count}}</html>",
        )
        .unwrap();
        let storage_dir = tempfile::tempdir().unwrap();
        (pages_dir, storage_dir)
    }

    #[test]
    fn list_command_serves_index() {
        let (pages_dir, storage_dir) = fixture();
        let store = PageStore::new(pages_dir.path());
        let log = AccessLog::open(storage_dir.path()).unwrap();
        let dispatcher = Dispatcher::new(&store, &log, "LXMF HTML Server");

        let outcome = dispatcher.handle("abc123", &InboundPayload::Empty, "list");
        match outcome {
            DispatchOutcome::Index { text, .. } => assert!(text.starts_with("Available Files")),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn get_prefix_serves_named_page() {
        let (pages_dir, storage_dir) = fixture();
        let store = PageStore::new(pages_dir.path());
        let log = AccessLog::open(storage_dir.path()).unwrap();
        let dispatcher = Dispatcher::new(&store, &log, "LXMF HTML Server");

        let outcome = dispatcher.handle("abc123", &InboundPayload::Empty, "GET:about.html");
        match outcome {
            DispatchOutcome::Page { body_text, html } => {
                assert_eq!(body_text, "Serving: about.html");
                assert!(!html.contains("{{"));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn missing_page_is_not_found_and_logged() {
        let (pages_dir, storage_dir) = fixture();
        let store = PageStore::new(pages_dir.path());
        let log = AccessLog::open(storage_dir.path()).unwrap();
        let dispatcher = Dispatcher::new(&store, &log, "LXMF HTML Server");

        let outcome = dispatcher.handle("abc123", &InboundPayload::Empty, "GET:missing.html");
        assert!(matches!(outcome, DispatchOutcome::NotFound { .. }));
        let log_contents = std::fs::read_to_string(log.path()).unwrap();
        assert!(log_contents.trim_end().ends_with("FAILED"));
    }

    #[test]
    fn ping_gets_an_ack() {
        let (pages_dir, storage_dir) = fixture();
        let store = PageStore::new(pages_dir.path());
        let log = AccessLog::open(storage_dir.path()).unwrap();
        let dispatcher = Dispatcher::new(&store, &log, "LXMF HTML Server");

        let outcome = dispatcher.handle("abc123", &InboundPayload::Empty, "ping");
        assert!(matches!(outcome, DispatchOutcome::Ack { .. }));
    }

    #[test]
    fn unrecognized_text_gets_help() {
        let (pages_dir, storage_dir) = fixture();
        let store = PageStore::new(pages_dir.path());
        let log = AccessLog::open(storage_dir.path()).unwrap();
        let dispatcher = Dispatcher::new(&store, &log, "LXMF HTML Server");

        let outcome = dispatcher.handle("abc123", &InboundPayload::Empty, "gibberish");
        assert!(matches!(outcome, DispatchOutcome::Help { .. }));
    }

    #[test]
    fn field_request_takes_priority_over_text() {
        let (pages_dir, storage_dir) = fixture();
        let store = PageStore::new(pages_dir.path());
        let log = AccessLog::open(storage_dir.path()).unwrap();
        let dispatcher = Dispatcher::new(&store, &log, "LXMF HTML Server");

        let payload = InboundPayload::PageRequest {
            name: "about.html".to_string(),
        };
        let outcome = dispatcher.handle("abc123", &payload, "ping");
        assert!(matches!(outcome, DispatchOutcome::Page { .. }));
    }
}
