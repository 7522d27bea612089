//! Local "download" of a document: its loaded content written to disk.
//!
//! No network call is involved; the content already sits in the loaded list.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use crate::models::Document;

/// Upper bound on `name (n).ext` probing before giving up
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Directory downloads land in when none is configured
pub fn default_download_dir() -> PathBuf {
    dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// Reduce a backend filename to a safe final path component
pub fn sanitize_filename(filename: &str, id: &str) -> String {
    let last = filename.rsplit(['/', '\\']).next().unwrap_or("");
    let cleaned: String = last.chars().filter(|c| !c.is_control()).collect();
    let cleaned = cleaned.trim();

    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        format!("document-{}.txt", id)
    } else {
        cleaned.to_string()
    }
}

/// Candidate path for the n-th attempt: `name.ext`, `name (1).ext`, `name (2).ext`, ...
fn candidate_path(dir: &Path, filename: &str, attempt: u32) -> PathBuf {
    if attempt == 0 {
        return dir.join(filename);
    }
    let path = Path::new(filename);
    let stem = path.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    match path.extension() {
        Some(ext) => dir.join(format!("{} ({}).{}", stem, attempt, ext.to_string_lossy())),
        None => dir.join(format!("{} ({})", stem, attempt)),
    }
}

/// Write `bytes` into the file just created at `path`.
///
/// A failed write removes the file so no partial download is left behind
/// and the next attempt can reuse the name.
fn fill_new_file<W: Write>(mut file: W, path: &Path, bytes: &[u8]) -> Result<()> {
    let written = file.write_all(bytes).and_then(|()| file.flush());
    drop(file);

    if let Err(e) = written {
        if let Err(remove_err) = fs::remove_file(path) {
            warn!("Failed to remove partial download {}: {}", path.display(), remove_err);
        }
        return Err(e).with_context(|| format!("Failed to write {}", path.display()));
    }
    Ok(())
}

/// Write the document's content into `dir` without overwriting anything.
///
/// Returns the path actually written.
pub fn save_document(doc: &Document, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create download directory {}", dir.display()))?;

    let filename = sanitize_filename(&doc.filename, &doc.id);

    for attempt in 0..MAX_NAME_ATTEMPTS {
        let path = candidate_path(dir, &filename, attempt);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => {
                fill_new_file(file, &path, doc.content.as_bytes())?;
                info!("Saved document {} to {}", doc.id, path.display());
                return Ok(path);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to create {}", path.display()));
            }
        }
    }

    bail!("Could not find a free file name for '{}' in {}", filename, dir.display())
}
