use anyhow::{Context, Result, bail};
use arboard::Clipboard;

use crate::models::Document;

/// Largest document body placed on the clipboard (10 MiB)
const MAX_CLIPBOARD_BYTES: usize = 10 * 1024 * 1024;

/// Clipboard backend, swapped for a mock in tests
trait ClipboardSink {
    fn put_text(&mut self, text: &str) -> Result<()>;
}

struct SystemClipboard(Clipboard);

impl ClipboardSink for SystemClipboard {
    fn put_text(&mut self, text: &str) -> Result<()> {
        self.0.set_text(text).context("Failed to set clipboard contents")
    }
}

fn check_copyable(doc: &Document) -> Result<()> {
    if doc.content.is_empty() {
        bail!("'{}' has no content to copy", doc.filename);
    }
    if doc.content.len() > MAX_CLIPBOARD_BYTES {
        bail!(
            "'{}' is too large for the clipboard ({} bytes, max {})",
            doc.filename,
            doc.content.len(),
            MAX_CLIPBOARD_BYTES
        );
    }
    Ok(())
}

fn copy_into(doc: &Document, sink: &mut dyn ClipboardSink) -> Result<()> {
    check_copyable(doc)?;
    sink.put_text(&doc.content)
}

/// Copy a document's content to the system clipboard.
///
/// # Errors
/// Fails when the content is empty or larger than 10 MiB (checked before the
/// clipboard is touched), or when no system clipboard is reachable, e.g. on a
/// headless session.
pub fn copy_document_content(doc: &Document) -> Result<()> {
    check_copyable(doc)?;
    let clipboard = Clipboard::new().context("Failed to initialize clipboard")?;
    copy_into(doc, &mut SystemClipboard(clipboard))
}

#[cfg(test)]
mod tests {
    use serde_json::Map;

    use super::*;
    use crate::models::Category;

    #[derive(Default)]
    struct MockClipboard {
        text: Option<String>,
        should_fail: bool,
    }

    impl ClipboardSink for MockClipboard {
        fn put_text(&mut self, text: &str) -> Result<()> {
            if self.should_fail {
                bail!("Mock clipboard error");
            }
            self.text = Some(text.to_string());
            Ok(())
        }
    }

    fn doc_with_content(content: String) -> Document {
        Document {
            id: "1".to_string(),
            filename: "notes.txt".to_string(),
            content,
            category: Category::General,
            size: 0,
            source: "Unknown".to_string(),
            original_url: "N/A".to_string(),
            word_count: 0,
            chunks_count: 0,
            added_at: None,
            metadata: Map::new(),
        }
    }

    #[test]
    fn test_copies_content() {
        let mut mock = MockClipboard::default();
        let doc = doc_with_content("Статья 1\nArticle 1 🚀".to_string());

        copy_into(&doc, &mut mock).unwrap();
        assert_eq!(mock.text.as_deref(), Some("Статья 1\nArticle 1 🚀"));
    }

    #[test]
    fn test_empty_content_rejected_before_clipboard() {
        let mut mock = MockClipboard::default();
        let err = copy_into(&doc_with_content(String::new()), &mut mock).unwrap_err();

        assert!(err.to_string().contains("no content"));
        assert!(mock.text.is_none());
    }

    #[test]
    fn test_size_limit() {
        let mut mock = MockClipboard::default();
        assert!(copy_into(&doc_with_content("a".repeat(MAX_CLIPBOARD_BYTES)), &mut mock).is_ok());

        let err =
            copy_into(&doc_with_content("a".repeat(MAX_CLIPBOARD_BYTES + 1)), &mut mock).unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn test_clipboard_failure_propagates() {
        let mut mock = MockClipboard { should_fail: true, ..MockClipboard::default() };
        let err = copy_into(&doc_with_content("x".to_string()), &mut mock).unwrap_err();
        assert!(err.to_string().contains("Mock clipboard error"));
    }
}
