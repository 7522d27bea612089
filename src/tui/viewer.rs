use crate::models::Document;

/// Which field receives input in edit mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditFocus {
    Category,
    Content,
}

/// Viewer/editor for one document.
///
/// Edits go to a draft copy; the original stays untouched until the shell
/// accepts the saved draft.
#[derive(Debug)]
pub struct DocumentViewer {
    original: Document,
    draft: Document,
    editing: bool,
    focus: EditFocus,
    scroll: u16,
}

impl DocumentViewer {
    pub fn new(document: Document) -> Self {
        Self {
            draft: document.clone(),
            original: document,
            editing: false,
            focus: EditFocus::Content,
            scroll: 0,
        }
    }

    pub fn document(&self) -> &Document {
        &self.original
    }

    /// What the screen shows: the draft while editing, otherwise the original
    pub fn displayed(&self) -> &Document {
        if self.editing { &self.draft } else { &self.original }
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn focus(&self) -> EditFocus {
        self.focus
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    pub fn is_dirty(&self) -> bool {
        self.draft != self.original
    }

    /// Leaving edit mode keeps the draft, re-entering continues it
    pub fn toggle_edit(&mut self) {
        self.editing = !self.editing;
    }

    pub fn toggle_focus(&mut self) {
        if !self.editing {
            return;
        }
        self.focus = match self.focus {
            EditFocus::Category => EditFocus::Content,
            EditFocus::Content => EditFocus::Category,
        };
    }

    pub fn scroll_by(&mut self, delta: i32) {
        let next = (self.scroll as i32 + delta).max(0);
        self.scroll = next.min(u16::MAX as i32) as u16;
    }

    pub fn cycle_category(&mut self, forward: bool) {
        if !self.editing || self.focus != EditFocus::Category {
            return;
        }
        self.draft.category = if forward { self.draft.category.next() } else { self.draft.category.prev() };
    }

    pub fn input_char(&mut self, c: char) {
        if self.editing && self.focus == EditFocus::Content {
            self.draft.content.push(c);
        }
    }

    pub fn insert_text(&mut self, text: &str) {
        if self.editing && self.focus == EditFocus::Content {
            self.draft.content.push_str(&text.replace("\r\n", "\n"));
        }
    }

    pub fn newline(&mut self) {
        self.input_char('\n');
    }

    pub fn delete_char(&mut self) {
        if self.editing && self.focus == EditFocus::Content {
            self.draft.content.pop();
        }
    }

    /// The edited document, available only in edit mode
    pub fn save(&self) -> Option<Document> {
        self.editing.then(|| self.draft.clone())
    }
}
