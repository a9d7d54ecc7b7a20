//! meshweb browser-client role: discovers HTML servers over mesh
//! announces, requests pages and files, and caches what it receives with
//! link-interception injected so rendered HTML navigates back into the
//! mesh protocol.
//!
//! Stability class: stable for the library surface (`Client`, `peer`,
//! `cache`, `events`); `bin/meshweb-client.rs` is a minimal driver CLI —
//! the real UI shell (HTTP/WebSocket) is out of scope.

pub mod announce_filter;
pub mod bookmarks;
pub mod cache;
pub mod client;
pub mod correlator;
pub mod error;
pub mod events;
pub mod history;
pub mod interceptor;
pub mod list_parser;
pub mod peer;

pub use client::Client;
pub use error::ClientError;
