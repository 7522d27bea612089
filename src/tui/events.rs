use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::filters::SortField;

/// User actions from terminal events.
///
/// Actions are context-free; the app decides what each one means for the
/// active tab or dialog.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    Cancel,
    Confirm,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    PageUp,
    PageDown,
    NextTab,
    OpenUpload,
    DeleteSelected,
    Save,
    CopyToClipboard,
    Refresh,
    CycleCategory,
    ClearFilters,
    ToggleEdit,
    /// Scraper: switch between one URL and a bulk list
    ToggleBulk,
    /// Scraper: fill the bulk list from the next predefined site group
    NextSiteGroup,
    SortBy(SortField),
    Input(char),
    DeleteChar,
    /// Bracketed paste; terminals deliver dropped files this way
    Paste(String),
    None,
}

/// Poll for terminal events and convert to actions
pub fn poll_event(timeout: Duration) -> anyhow::Result<Action> {
    if event::poll(timeout)? {
        return Ok(match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => key_to_action(key),
            Event::Paste(text) => Action::Paste(text),
            _ => Action::None,
        });
    }
    Ok(Action::None)
}

fn key_to_action(key: KeyEvent) -> Action {
    match (key.code, key.modifiers) {
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,
        (KeyCode::Esc, _) => Action::Cancel,
        (KeyCode::Enter, _) => Action::Confirm,

        // Navigation (arrows, Emacs style)
        (KeyCode::Char('p'), KeyModifiers::CONTROL) => Action::MoveUp,
        (KeyCode::Char('n'), KeyModifiers::CONTROL) => Action::MoveDown,
        (KeyCode::Up, _) => Action::MoveUp,
        (KeyCode::Down, _) => Action::MoveDown,
        (KeyCode::Left, _) => Action::MoveLeft,
        (KeyCode::Right, _) => Action::MoveRight,
        (KeyCode::PageUp, _) => Action::PageUp,
        (KeyCode::PageDown, _) => Action::PageDown,
        (KeyCode::Tab, _) => Action::NextTab,

        // Document actions
        (KeyCode::Char('u'), KeyModifiers::CONTROL) => Action::OpenUpload,
        (KeyCode::Char('d'), KeyModifiers::CONTROL) => Action::DeleteSelected,
        (KeyCode::Char('s'), KeyModifiers::CONTROL) => Action::Save,
        (KeyCode::Char('y'), KeyModifiers::CONTROL) => Action::CopyToClipboard,
        (KeyCode::Char('r'), KeyModifiers::CONTROL) => Action::Refresh,
        (KeyCode::Char('e'), KeyModifiers::CONTROL) => Action::ToggleEdit,

        // Scraper
        (KeyCode::Char('b'), KeyModifiers::CONTROL) => Action::ToggleBulk,
        (KeyCode::Char('g'), KeyModifiers::CONTROL) => Action::NextSiteGroup,

        // Filtering and sorting (F-keys stand in for column headers)
        (KeyCode::Char('f'), KeyModifiers::CONTROL) => Action::CycleCategory,
        (KeyCode::Char('x'), KeyModifiers::CONTROL) => Action::ClearFilters,
        (KeyCode::F(1), _) => Action::SortBy(SortField::Name),
        (KeyCode::F(2), _) => Action::SortBy(SortField::Size),
        (KeyCode::F(3), _) => Action::SortBy(SortField::Category),

        // Text input
        (KeyCode::Char(c), KeyModifiers::NONE) | (KeyCode::Char(c), KeyModifiers::SHIFT) => {
            Action::Input(c)
        }
        (KeyCode::Backspace, _) => Action::DeleteChar,

        _ => Action::None,
    }
}
