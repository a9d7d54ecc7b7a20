//! Page Store: directory enumeration, extension classification, and
//! traversal-safe reads.

use std::path::{Path, PathBuf};

use crate::error::ServerError;

/// File category, used to group the generated index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PageKind {
    Html,
    Text,
    Image,
    Pdf,
    Archive,
    Other,
}

impl PageKind {
    pub fn heading(self) -> &'static str {
        match self {
            PageKind::Html => "HTML Pages",
            PageKind::Text => "Text Files",
            PageKind::Image => "Images",
            PageKind::Pdf => "Documents",
            PageKind::Archive => "Archives",
            PageKind::Other => "Other",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            PageKind::Html => "📄",
            PageKind::Text => "📝",
            PageKind::Image => "🖼️",
            PageKind::Pdf => "📕",
            PageKind::Archive => "📦",
            PageKind::Other => "📎",
        }
    }
}

#[derive(Debug, Clone)]
pub struct PageEntry {
    pub filename: String,
    pub extension: String,
    pub mime_type: &'static str,
    pub size_bytes: u64,
    pub kind: PageKind,
}

/// The authoritative extension → (MIME type, category) table. Any
/// extension not listed here is unsupported and excluded from listings
/// entirely — it is not "OTHER" by omission, it simply does not exist as
/// far as the page store is concerned.
fn classify_extension(ext: &str) -> Option<(&'static str, PageKind)> {
    match ext {
        "html" | "htm" => Some(("text/html", PageKind::Html)),
        "txt" => Some(("text/plain", PageKind::Text)),
        "md" => Some(("text/markdown", PageKind::Text)),
        "jpg" | "jpeg" => Some(("image/jpeg", PageKind::Image)),
        "png" => Some(("image/png", PageKind::Image)),
        "gif" => Some(("image/gif", PageKind::Image)),
        "bmp" => Some(("image/bmp", PageKind::Image)),
        "webp" => Some(("image/webp", PageKind::Image)),
        "pdf" => Some(("application/pdf", PageKind::Pdf)),
        "zip" => Some(("application/zip", PageKind::Archive)),
        "rar" => Some(("application/x-rar-compressed", PageKind::Archive)),
        "7z" => Some(("application/x-7z-compressed", PageKind::Archive)),
        _ => None,
    }
}

pub struct PageStore {
    root: PathBuf,
}

impl PageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Enumerates the pages directory, lexicographically sorted, excluding
    /// any file whose extension is not in the supported table.
    pub fn list_pages(&self) -> Result<Vec<PageEntry>, ServerError> {
        let mut entries = Vec::new();
        let read_dir = match std::fs::read_dir(&self.root) {
            Ok(rd) => rd,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(entries),
            Err(err) => return Err(err.into()),
        };
        for entry in read_dir {
            let entry = entry?;
            let metadata = entry.metadata()?;
            if !metadata.is_file() {
                continue;
            }
            let filename = entry.file_name().to_string_lossy().into_owned();
            let Some(ext) = extension_of(&filename) else {
                continue;
            };
            let Some((mime_type, kind)) = classify_extension(&ext) else {
                continue;
            };
            entries.push(PageEntry {
                filename,
                extension: ext,
                mime_type,
                size_bytes: metadata.len(),
                kind,
            });
        }
        entries.sort_by(|a, b| a.filename.cmp(&b.filename));
        Ok(entries)
    }

    /// Resolves `requested` strictly inside the pages directory: the
    /// request is reduced to its basename before lookup, so any traversal
    /// component (`../`, absolute paths) is silently defeated rather than
    /// rejected with a distinguishing error — the caller sees a plain
    /// not-found, never a reason.
    pub fn resolve(&self, requested: &str) -> Option<PageEntry> {
        let safe_name = basename(requested);
        if safe_name.is_empty() {
            return None;
        }
        let ext = extension_of(&safe_name)?;
        let (mime_type, kind) = classify_extension(&ext)?;
        let path = self.root.join(&safe_name);
        let metadata = std::fs::metadata(&path).ok()?;
        if !metadata.is_file() {
            return None;
        }
        Some(PageEntry {
            filename: safe_name,
            extension: ext,
            mime_type,
            size_bytes: metadata.len(),
            kind,
        })
    }

    /// Reads the bytes of an already-resolved page by its basename.
    pub fn read(&self, entry: &PageEntry) -> Result<Vec<u8>, ServerError> {
        let path = self.root.join(&entry.filename);
        Ok(std::fs::read(path)?)
    }

    pub fn read_to_string(&self, entry: &PageEntry) -> Result<String, ServerError> {
        let path = self.root.join(&entry.filename);
        Ok(std::fs::read_to_string(path)?)
    }
}

/// Reduces a requested path to its final path component, defeating
/// traversal attempts.
fn basename(requested: &str) -> String {
    Path::new(requested)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
}

pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} {}", UNITS[unit])
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}
