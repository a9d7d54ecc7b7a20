//! Content Cache: stores received HTML (with link-interception injected)
//! and received binary file attachments on disk.

use std::path::{Path, PathBuf};

use meshweb_proto::{DestinationHash, FileAttachment};

use crate::error::ClientError;
use crate::interceptor;

/// Either shape a cached artifact's payload can take.
#[derive(Debug, Clone, PartialEq)]
pub enum ArtifactPayload {
    Html(String),
    Binary { bytes: Vec<u8>, mime_type: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CachedArtifact {
    pub id: String,
    pub origin_peer: DestinationHash,
    pub payload: ArtifactPayload,
    pub retrieved_at: i64,
}

fn now_unix() -> i64 {
    time::OffsetDateTime::now_utc().unix_timestamp()
}

/// Reduces a page/file name to something safe to use as a cache filename:
/// only the final path component survives, defeating any traversal
/// component the same way [`meshweb_server::pages::PageStore::resolve`]
/// does on the server side.
fn sanitize_name(name: &str) -> String {
    let base = Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if base.is_empty() {
        "page".to_string()
    } else {
        base
    }
}

/// Owns the two cache directories client-side artifacts are written into:
/// `html_cache/` for pages, `cache/` for downloaded files.
pub struct ContentCache {
    html_dir: PathBuf,
    files_dir: PathBuf,
}

impl ContentCache {
    pub fn new(storage_root: &Path) -> Result<Self, ClientError> {
        let html_dir = storage_root.join("html_cache");
        let files_dir = storage_root.join("cache");
        std::fs::create_dir_all(&html_dir)?;
        std::fs::create_dir_all(&files_dir)?;
        Ok(Self { html_dir, files_dir })
    }

    /// Writes an HTML page to the html cache under
    /// `<unix_seconds>_<sanitized page name>`, with the link interceptor
    /// injected exactly once.
    pub fn store_html(
        &self,
        origin_peer: DestinationHash,
        page_name: &str,
        body: &str,
    ) -> Result<CachedArtifact, ClientError> {
        let retrieved_at = now_unix();
        let sanitized = sanitize_name(page_name);
        let filename = format!("{retrieved_at}_{sanitized}");
        let rendered = interceptor::inject_once(body, &origin_peer.to_string());

        std::fs::write(self.html_dir.join(&filename), &rendered)?;

        Ok(CachedArtifact {
            id: filename,
            origin_peer,
            payload: ArtifactPayload::Html(rendered),
            retrieved_at,
        })
    }

    /// Writes every file attachment into the files cache under its own
    /// `<name>` with no timestamp prefix; a colliding name overwrites.
    pub fn store_files(
        &self,
        origin_peer: DestinationHash,
        files: Vec<FileAttachment>,
    ) -> Result<Vec<CachedArtifact>, ClientError> {
        let retrieved_at = now_unix();
        let mut artifacts = Vec::with_capacity(files.len());
        for (name, bytes) in files {
            let sanitized = sanitize_name(&name);
            std::fs::write(self.files_dir.join(&sanitized), &bytes)?;
            artifacts.push(CachedArtifact {
                id: sanitized.clone(),
                origin_peer,
                payload: ArtifactPayload::Binary {
                    bytes,
                    mime_type: mime_guess::from_path(&sanitized)
                        .first_or_octet_stream()
                        .to_string(),
                },
                retrieved_at,
            });
        }
        Ok(artifacts)
    }

    pub fn html_path(&self, filename: &str) -> PathBuf {
        self.html_dir.join(filename)
    }

    pub fn file_path(&self, filename: &str) -> PathBuf {
        self.files_dir.join(filename)
    }
}
