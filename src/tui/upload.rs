//! Upload dialog state.
//!
//! A file is chosen either by typing its path and pressing Enter or by pasting
//! a path (terminals paste dropped files as their path). Both routes end in
//! [`UploadDialog::select_path`], so a paste simply replaces the selection.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use percent_encoding::percent_decode_str;
use url::Url;

use crate::models::Category;

/// Extensions the backend knows how to ingest. Shown as a hint only.
pub const ACCEPTED_EXTENSIONS: [&str; 5] = ["txt", "pdf", "docx", "md", "doc"];

/// Upper bound for the typed path, in characters
const MAX_PATH_INPUT: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
}

impl SelectedFile {
    /// Whether the extension is one the backend advertises
    pub fn has_accepted_extension(&self) -> bool {
        Path::new(&self.name)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ACCEPTED_EXTENSIONS.iter().any(|a| a.eq_ignore_ascii_case(ext)))
    }
}

/// What the shell sends to the backend when the dialog submits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub path: PathBuf,
    pub category: Category,
}

#[derive(Debug, Default)]
pub struct UploadDialog {
    path_input: String,
    selected: Option<SelectedFile>,
    /// `None` means "not chosen"; submit falls back to `general`
    category: Option<Category>,
    uploading: bool,
    error: Option<String>,
}

impl UploadDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path_input(&self) -> &str {
        &self.path_input
    }

    pub fn selected(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    pub fn category(&self) -> Option<&Category> {
        self.category.as_ref()
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn input_char(&mut self, c: char) {
        if self.uploading || self.selected.is_some() || self.path_input.len() >= MAX_PATH_INPUT {
            return;
        }
        self.path_input.push(c);
        self.error = None;
    }

    /// Backspace: edits the typed path, or drops the selected file
    pub fn delete_char(&mut self) {
        if self.uploading {
            return;
        }
        if self.selected.is_some() {
            self.clear_selection();
        } else {
            self.path_input.pop();
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.error = None;
    }

    /// Select the file named in the path input
    pub fn confirm_path(&mut self) {
        let typed = self.path_input.clone();
        self.try_select(&typed);
    }

    /// Pasted (or dropped) path replaces any current selection
    pub fn paste(&mut self, text: &str) {
        self.try_select(text);
    }

    fn try_select(&mut self, raw: &str) {
        if self.uploading {
            return;
        }
        let path = normalize_pasted_path(raw);
        match self.select_path(&path) {
            Ok(()) => self.error = None,
            Err(e) => self.error = Some(format!("{:#}", e)),
        }
    }

    /// Stat `path` and make it the selected file.
    ///
    /// The previous selection is kept when `path` is not a readable regular
    /// file.
    pub fn select_path(&mut self, path: &Path) -> Result<()> {
        if path.as_os_str().is_empty() {
            bail!("Enter a file path");
        }
        let metadata = fs::metadata(path)
            .with_context(|| format!("Cannot read {}", path.display()))?;
        if !metadata.is_file() {
            bail!("{} is not a file", path.display());
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.selected = Some(SelectedFile { path: path.to_path_buf(), name, size: metadata.len() });
        self.path_input.clear();
        Ok(())
    }

    /// Step through: not chosen → general → … → scraped → not chosen
    pub fn cycle_category(&mut self, forward: bool) {
        if self.uploading {
            return;
        }
        let first = Category::ALL[0].clone();
        let last = Category::ALL[Category::ALL.len() - 1].clone();
        self.category = match (&self.category, forward) {
            (None, true) => Some(first),
            (None, false) => Some(last),
            (Some(current), true) if *current == last => None,
            (Some(current), false) if *current == first => None,
            (Some(current), true) => Some(current.next()),
            (Some(current), false) => Some(current.prev()),
        };
    }

    /// The request to send, if a file is selected and nothing is in flight.
    ///
    /// Marks the dialog as uploading.
    pub fn submit(&mut self) -> Option<UploadRequest> {
        if self.uploading {
            return None;
        }
        let file = self.selected.as_ref()?;
        let request = UploadRequest {
            path: file.path.clone(),
            category: self.category.clone().unwrap_or_default(),
        };
        self.uploading = true;
        self.error = None;
        Some(request)
    }

    /// Record the upload outcome. Returns true when the dialog should close.
    pub fn finish(&mut self, succeeded: bool) -> bool {
        self.uploading = false;
        if succeeded {
            self.selected = None;
            self.category = None;
            self.path_input.clear();
        }
        succeeded
    }
}

/// Strip the decorations terminals add around dropped paths: surrounding
/// quotes, the trailing newline and escaped spaces. `file://` URLs are
/// decoded into the local path they name.
fn normalize_pasted_path(raw: &str) -> PathBuf {
    let trimmed = raw.trim();
    let unquoted = trimmed
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .or_else(|| trimmed.strip_prefix('"').and_then(|s| s.strip_suffix('"')))
        .unwrap_or(trimmed);
    if let Some(rest) = unquoted.strip_prefix("file://") {
        if let Some(path) = Url::parse(unquoted).ok().and_then(|url| url.to_file_path().ok()) {
            return path;
        }
        // Not a well-formed URL; decode what follows the scheme
        let rest = rest.strip_prefix("localhost").unwrap_or(rest);
        return PathBuf::from(percent_decode_str(rest).decode_utf8_lossy().into_owned());
    }
    PathBuf::from(unquoted.replace("\\ ", " "))
}
