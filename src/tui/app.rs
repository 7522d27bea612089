//! Dashboard state and event handling.
//!
//! The `App` struct owns all dashboard state and runs the event loop via `run()`:
//!
//! - **Document view**: loaded documents plus [`ViewCriteria`]; the visible rows
//!   are indices re-derived with [`derive_view`] after every change
//! - **Backend calls**: spawned as tokio tasks that report back through an
//!   unbounded channel drained once per loop iteration, so input never waits
//!   on the network
//! - **Dialogs**: upload, viewer/editor and delete confirmation, at most one at
//!   a time, each consuming input while open
//! - **Notifications**: transient banner with a fixed expiry
//! - **Dirty state tracking**: redraw only when state changes (or every 100ms)
//!
//! `App::run` must be called from within a tokio runtime context.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Utc;
use ratatui::Terminal;
use ratatui::backend::Backend;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

use super::events::{Action, poll_event};
use super::notification::{Notification, Severity};
use super::rendering::{RenderState, render_ui};
use super::scraper::{ScrapeJob, ScraperForm};
use super::upload::{UploadDialog, UploadRequest};
use super::viewer::DocumentViewer;
use crate::client::{AdminApi, ApiResult, load_dashboard};
use crate::clipboard::copy_document_content;
use crate::config::AdminConfig;
use crate::download::save_document;
use crate::filters::{ViewCriteria, derive_view};
use crate::models::{
    AdminStats, DeleteResponse, Document, PredefinedSites, ScrapeResponse, UploadResponse,
};
use crate::utils::sanitize_for_display;

/// Maximum search input length (characters)
const MAX_SEARCH_LEN: usize = 256;
/// Rows moved by PageUp/PageDown
const PAGE_SIZE: i32 = 10;
/// Redraw at least this often so terminal resizes are picked up
const REDRAW_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Documents,
    Scraper,
}

impl Tab {
    pub const ALL: [Tab; 2] = [Tab::Documents, Tab::Scraper];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Documents => "Documents",
            Tab::Scraper => "Scraper",
        }
    }

    fn toggled(self) -> Self {
        match self {
            Tab::Documents => Tab::Scraper,
            Tab::Scraper => Tab::Documents,
        }
    }
}

/// Modal dialog drawn over the active tab
#[derive(Debug)]
pub enum Overlay {
    Upload(UploadDialog),
    Viewer(DocumentViewer),
    ConfirmDelete { id: String, filename: String },
}

/// Completed backend call, delivered to the event loop
#[derive(Debug)]
pub enum ApiEvent {
    Loaded(ApiResult<(Vec<Document>, AdminStats)>),
    Uploaded(ApiResult<UploadResponse>),
    Deleted(ApiResult<DeleteResponse>),
    Scraped(ApiResult<ScrapeResponse>),
    SitesLoaded(ApiResult<PredefinedSites>),
}

pub struct App {
    api: Arc<dyn AdminApi>,
    config: AdminConfig,
    events_tx: UnboundedSender<ApiEvent>,
    events_rx: UnboundedReceiver<ApiEvent>,
    // Loaded data, replaced wholesale by every completed load
    documents: Vec<Document>,
    stats: AdminStats,
    // Derived view: indices into `documents`
    criteria: ViewCriteria,
    view: Vec<usize>,
    selected_idx: usize,
    tab: Tab,
    overlay: Option<Overlay>,
    scraper: ScraperForm,
    notification: Option<Notification>,
    pending_loads: usize,
    should_quit: bool,
    // Dirty state tracking for efficient rendering
    needs_redraw: bool,
    last_draw_time: Instant,
}

impl App {
    pub fn new(api: Arc<dyn AdminApi>, config: AdminConfig) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            api,
            config,
            events_tx,
            events_rx,
            documents: Vec::new(),
            stats: AdminStats::default(),
            criteria: ViewCriteria::new(),
            view: Vec::new(),
            selected_idx: 0,
            tab: Tab::Documents,
            overlay: None,
            scraper: ScraperForm::new(),
            notification: None,
            pending_loads: 0,
            should_quit: false,
            needs_redraw: true,
            last_draw_time: Instant::now(),
        }
    }

    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        self.load_data();

        while !self.should_quit {
            self.check_and_clear_expired_notification();
            self.drain_events();

            let now = Instant::now();
            if self.needs_redraw || now.duration_since(self.last_draw_time) >= REDRAW_INTERVAL {
                terminal.draw(|f| render_ui(f, &self.render_state()))?;
                self.needs_redraw = false;
                self.last_draw_time = now;
            }

            let action = poll_event(REDRAW_INTERVAL)?;
            self.handle_action(action);
        }

        Ok(())
    }

    fn render_state(&self) -> RenderState<'_> {
        RenderState {
            tab: self.tab,
            documents: self.visible_documents(),
            total_count: self.documents.len(),
            selected_idx: self.selected_idx,
            criteria: &self.criteria,
            stats: &self.stats,
            overlay: self.overlay.as_ref(),
            scraper: &self.scraper,
            notification: self.notification.as_ref(),
            is_loading: self.is_loading(),
            now: Utc::now(),
        }
    }

    fn visible_documents(&self) -> Vec<&Document> {
        self.view.iter().map(|&idx| &self.documents[idx]).collect()
    }

    fn selected_document(&self) -> Option<&Document> {
        self.view.get(self.selected_idx).map(|&idx| &self.documents[idx])
    }

    fn is_loading(&self) -> bool {
        self.pending_loads > 0
    }

    fn notify(&mut self, message: impl Into<String>, severity: Severity) {
        self.notification =
            Some(Notification::new(message, severity, self.config.notification_duration));
        self.needs_redraw = true;
    }

    fn check_and_clear_expired_notification(&mut self) {
        if self.notification.as_ref().is_some_and(|n| n.is_expired(Instant::now())) {
            self.notification = None;
            self.needs_redraw = true;
        }
    }

    // ----- backend calls -----

    fn spawn_request<F>(&self, request: F)
    where
        F: Future<Output = ApiEvent> + Send + 'static,
    {
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            // Receiver is gone only when the dashboard has exited
            let _ = tx.send(request.await);
        });
    }

    /// Fetch documents and stats in parallel
    fn load_data(&mut self) {
        self.pending_loads += 1;
        self.needs_redraw = true;
        let api = Arc::clone(&self.api);
        self.spawn_request(async move { ApiEvent::Loaded(load_dashboard(api.as_ref()).await) });
    }

    fn start_upload(&self, request: UploadRequest) {
        info!(path = %request.path.display(), category = %request.category, "Uploading document");
        let api = Arc::clone(&self.api);
        self.spawn_request(async move {
            ApiEvent::Uploaded(api.upload_document(&request.path, &request.category).await)
        });
    }

    fn start_delete(&self, id: String) {
        info!(%id, "Deleting document");
        let api = Arc::clone(&self.api);
        self.spawn_request(async move { ApiEvent::Deleted(api.delete_document(&id).await) });
    }

    fn start_scrape(&self, job: ScrapeJob) {
        let api = Arc::clone(&self.api);
        match job {
            ScrapeJob::Single(request) => {
                info!(url = %request.url, category = %request.category, "Submitting URL for scraping");
                self.spawn_request(async move { ApiEvent::Scraped(api.scrape_url(&request).await) });
            }
            ScrapeJob::Bulk(request) => {
                info!(count = request.urls.len(), category = %request.category, "Submitting URLs for bulk scraping");
                self.spawn_request(async move { ApiEvent::Scraped(api.scrape_bulk(&request).await) });
            }
        }
    }

    fn load_predefined_sites(&self) {
        let api = Arc::clone(&self.api);
        self.spawn_request(async move { ApiEvent::SitesLoaded(api.predefined_sites().await) });
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply_event(event);
        }
    }

    fn apply_event(&mut self, event: ApiEvent) {
        self.needs_redraw = true;
        match event {
            ApiEvent::Loaded(result) => {
                self.pending_loads = self.pending_loads.saturating_sub(1);
                match result {
                    Ok((documents, stats)) => {
                        debug!(count = documents.len(), "Loaded documents");
                        self.documents = documents;
                        self.stats = stats;
                        self.refresh_view(false);
                    }
                    Err(e) => {
                        error!("Failed to load dashboard data: {}", e);
                        self.notify("Failed to load documents", Severity::Error);
                    }
                }
            }
            ApiEvent::Uploaded(result) => {
                let succeeded = result.is_ok();
                match result {
                    Ok(response) => {
                        info!(filename = %response.filename, size = response.size, "Upload finished");
                        self.notify(
                            format!("Uploaded {}", sanitize_for_display(&response.filename)),
                            Severity::Success,
                        );
                        self.load_data();
                    }
                    Err(e) => {
                        error!("Upload failed: {}", e);
                        self.notify("Upload failed", Severity::Error);
                    }
                }
                if let Some(Overlay::Upload(dialog)) = &mut self.overlay
                    && dialog.finish(succeeded)
                {
                    self.overlay = None;
                }
            }
            ApiEvent::Deleted(result) => match result {
                Ok(response) => {
                    info!(id = %response.deleted_id, "Document deleted");
                    self.notify("Document deleted", Severity::Success);
                    self.load_data();
                }
                Err(e) => {
                    error!("Delete failed: {}", e);
                    self.notify("Failed to delete document", Severity::Error);
                }
            },
            ApiEvent::Scraped(result) => match result {
                Ok(response) => {
                    let summary = &response.summary;
                    info!(
                        processed = summary.total_processed,
                        successful = summary.successful,
                        failed = summary.failed,
                        "Scrape finished"
                    );
                    if response.all_succeeded() {
                        self.notify("Website content added", Severity::Success);
                    } else {
                        self.notify("Scrape finished with errors", Severity::Warning);
                    }
                    self.scraper.finish(Ok(response));
                    self.load_data();
                }
                Err(e) => {
                    error!("Scrape failed: {}", e);
                    self.scraper.finish(Err("Scraping failed".to_string()));
                    self.notify("Scraping failed", Severity::Error);
                }
            },
            ApiEvent::SitesLoaded(result) => match result {
                Ok(sites) => {
                    debug!(groups = sites.groups.len(), "Loaded predefined sites");
                    self.scraper.set_sites(Ok(sites));
                }
                Err(e) => {
                    warn!("Failed to load predefined sites: {}", e);
                    self.scraper.set_sites(Err(e.to_string()));
                }
            },
        }
    }

    // ----- view derivation -----

    /// Re-derive the visible rows from documents and criteria
    fn refresh_view(&mut self, reset_selection: bool) {
        self.view = derive_view(&self.documents, &self.criteria);
        if reset_selection || self.view.is_empty() {
            self.selected_idx = 0;
        } else {
            self.selected_idx = self.selected_idx.min(self.view.len() - 1);
        }
        self.needs_redraw = true;
    }

    fn move_selection(&mut self, delta: i32) {
        if self.view.is_empty() {
            return;
        }
        let max_idx = (self.view.len() - 1) as i32;
        self.selected_idx = (self.selected_idx as i32 + delta).clamp(0, max_idx) as usize;
        self.needs_redraw = true;
    }

    fn update_search(&mut self, c: char) {
        if self.criteria.search_term.chars().count() >= MAX_SEARCH_LEN {
            self.notify(
                format!("Search limited to {} characters", MAX_SEARCH_LEN),
                Severity::Warning,
            );
            return;
        }
        self.criteria.search_term.push(c);
        self.refresh_view(true);
    }

    fn delete_search_char(&mut self) {
        if self.criteria.search_term.pop().is_some() {
            self.refresh_view(true);
        }
    }

    /// Replace the in-memory copy of a document.
    ///
    /// The backend has no update endpoint, so edits last until the next load.
    fn update_document(&mut self, updated: Document) {
        warn!(id = %updated.id, "Document edits are kept locally and not sent to the backend");
        match self.documents.iter_mut().find(|d| d.id == updated.id) {
            Some(slot) => {
                *slot = updated;
                self.refresh_view(false);
                self.notify("Document updated (local only)", Severity::Success);
            }
            None => self.notify("Document no longer loaded", Severity::Error),
        }
    }

    fn report_download(&mut self, result: Result<PathBuf>) {
        match result {
            Ok(path) => {
                info!(path = %path.display(), "Document saved");
                self.notify(format!("Saved to {}", path.display()), Severity::Success);
            }
            Err(e) => {
                error!("Download failed: {:#}", e);
                self.notify("Failed to save document", Severity::Error);
            }
        }
    }

    fn report_copy(&mut self, result: Result<()>) {
        match result {
            Ok(()) => self.notify("Copied to clipboard", Severity::Success),
            Err(e) => {
                warn!("Copy failed: {:#}", e);
                self.notify(format!("Copy failed: {}", e), Severity::Error);
            }
        }
    }

    // ----- input -----

    fn handle_action(&mut self, action: Action) {
        if action == Action::None {
            return;
        }
        if action == Action::Quit {
            self.should_quit = true;
            return;
        }

        if let Some(overlay) = self.overlay.take() {
            self.overlay = match overlay {
                Overlay::Upload(dialog) => self.handle_upload_action(dialog, action),
                Overlay::Viewer(viewer) => self.handle_viewer_action(viewer, action),
                Overlay::ConfirmDelete { id, filename } => {
                    self.handle_confirm_delete(id, filename, action)
                }
            };
            self.needs_redraw = true;
            return;
        }

        match self.tab {
            Tab::Documents => self.handle_documents_action(action),
            Tab::Scraper => self.handle_scraper_action(action),
        }
        self.needs_redraw = true;
    }

    fn handle_documents_action(&mut self, action: Action) {
        match action {
            Action::Cancel => {
                if self.criteria.search_term.is_empty() {
                    self.should_quit = true;
                } else {
                    self.criteria.search_term.clear();
                    self.refresh_view(true);
                }
            }
            Action::Confirm => {
                if let Some(doc) = self.selected_document() {
                    self.overlay = Some(Overlay::Viewer(DocumentViewer::new(doc.clone())));
                }
            }
            Action::MoveUp => self.move_selection(-1),
            Action::MoveDown => self.move_selection(1),
            Action::PageUp => self.move_selection(-PAGE_SIZE),
            Action::PageDown => self.move_selection(PAGE_SIZE),
            Action::NextTab => self.tab = self.tab.toggled(),
            Action::OpenUpload => self.overlay = Some(Overlay::Upload(UploadDialog::new())),
            Action::DeleteSelected => {
                if let Some(doc) = self.selected_document() {
                    self.overlay = Some(Overlay::ConfirmDelete {
                        id: doc.id.clone(),
                        filename: doc.filename.clone(),
                    });
                }
            }
            Action::Save => match self.selected_document() {
                Some(doc) => {
                    let result = save_document(doc, &self.config.download_dir);
                    self.report_download(result);
                }
                None => self.notify("No document selected", Severity::Info),
            },
            Action::CopyToClipboard => match self.selected_document() {
                Some(doc) => {
                    let result = copy_document_content(doc);
                    self.report_copy(result);
                }
                None => self.notify("No document selected", Severity::Info),
            },
            Action::Refresh => self.load_data(),
            Action::CycleCategory => {
                self.criteria.cycle_category();
                self.refresh_view(true);
            }
            Action::ClearFilters => {
                self.criteria.clear_filters();
                self.refresh_view(true);
            }
            Action::SortBy(field) => {
                self.criteria.sort.toggle(field);
                self.refresh_view(true);
            }
            Action::Input(c) => self.update_search(c),
            Action::DeleteChar => self.delete_search_char(),
            Action::Paste(text) => {
                for c in text.lines().next().unwrap_or("").chars().filter(|c| !c.is_control()) {
                    self.update_search(c);
                }
            }
            _ => {}
        }
    }

    fn handle_scraper_action(&mut self, action: Action) {
        match action {
            Action::Cancel => {
                if !self.scraper.clear_input() {
                    self.tab = Tab::Documents;
                }
            }
            Action::NextTab => self.tab = self.tab.toggled(),
            Action::Confirm => {
                if let Some(job) = self.scraper.submit() {
                    self.start_scrape(job);
                }
            }
            Action::ToggleBulk => {
                if self.scraper.toggle_mode() {
                    self.load_predefined_sites();
                }
            }
            Action::NextSiteGroup => {
                if let Some(name) = self.scraper.next_site_group() {
                    self.notify(
                        format!("Loaded {} sites", sanitize_for_display(&name)),
                        Severity::Info,
                    );
                }
            }
            Action::MoveLeft | Action::MoveUp => self.scraper.cycle_category(false),
            Action::MoveRight | Action::MoveDown => self.scraper.cycle_category(true),
            Action::Input(c) => self.scraper.input_char(c),
            Action::DeleteChar => self.scraper.delete_char(),
            Action::Paste(text) => self.scraper.insert_text(&text),
            Action::Refresh => self.load_data(),
            _ => {}
        }
    }

    fn handle_upload_action(&mut self, mut dialog: UploadDialog, action: Action) -> Option<Overlay> {
        // Disabled while the request is in flight
        if dialog.is_uploading() {
            return Some(Overlay::Upload(dialog));
        }

        match action {
            Action::Cancel => return None,
            Action::Confirm | Action::Save => {
                if dialog.selected().is_none() {
                    dialog.confirm_path();
                } else if let Some(request) = dialog.submit() {
                    self.start_upload(request);
                }
            }
            Action::Input(c) => dialog.input_char(c),
            Action::DeleteChar => dialog.delete_char(),
            Action::Paste(text) => dialog.paste(&text),
            Action::MoveLeft | Action::MoveUp => dialog.cycle_category(false),
            Action::MoveRight | Action::MoveDown => dialog.cycle_category(true),
            _ => {}
        }
        Some(Overlay::Upload(dialog))
    }

    fn handle_viewer_action(
        &mut self,
        mut viewer: DocumentViewer,
        action: Action,
    ) -> Option<Overlay> {
        match action {
            Action::Cancel => return None,
            Action::ToggleEdit => viewer.toggle_edit(),
            Action::Save => match viewer.save() {
                Some(updated) => {
                    self.update_document(updated);
                    return None;
                }
                None => {
                    let result = save_document(viewer.document(), &self.config.download_dir);
                    self.report_download(result);
                }
            },
            Action::CopyToClipboard => {
                let result = copy_document_content(viewer.displayed());
                self.report_copy(result);
            }
            Action::MoveUp => viewer.scroll_by(-1),
            Action::MoveDown => viewer.scroll_by(1),
            Action::PageUp => viewer.scroll_by(-PAGE_SIZE),
            Action::PageDown => viewer.scroll_by(PAGE_SIZE),
            Action::MoveLeft => viewer.cycle_category(false),
            Action::MoveRight => viewer.cycle_category(true),
            Action::NextTab => viewer.toggle_focus(),
            Action::Input(c) => viewer.input_char(c),
            Action::Confirm => viewer.newline(),
            Action::DeleteChar => viewer.delete_char(),
            Action::Paste(text) => viewer.insert_text(&text),
            _ => {}
        }
        Some(Overlay::Viewer(viewer))
    }

    fn handle_confirm_delete(&mut self, id: String, filename: String, action: Action) -> Option<Overlay> {
        match action {
            Action::Input('y' | 'Y') | Action::Confirm => {
                self.start_delete(id);
                None
            }
            Action::Input('n' | 'N') | Action::Cancel => {
                debug!(%id, "Delete declined");
                None
            }
            _ => Some(Overlay::ConfirmDelete { id, filename }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use tempfile::TempDir;

    use super::*;
    use crate::client::mock::MockApi;
    use crate::filters::{SortField, SortOrder};
    use crate::models::Category;

    fn sample_documents() -> Vec<Document> {
        vec![
            Document::new("1", "a.txt", "first entry", Category::General, 100),
            Document::new("2", "B.TXT", "second entry", Category::Other("sales".to_string()), 50),
        ]
    }

    fn create_app(api: Arc<MockApi>, download_dir: &Path) -> App {
        let config = AdminConfig::resolve(None, Some(download_dir.to_path_buf())).unwrap();
        App::new(api, config)
    }

    /// Wait for the next backend event and apply it
    async fn settle(app: &mut App) {
        let event = app.events_rx.recv().await.unwrap();
        app.apply_event(event);
    }

    async fn loaded_app(api: Arc<MockApi>, dir: &Path) -> App {
        let mut app = create_app(api, dir);
        app.load_data();
        assert!(app.is_loading());
        settle(&mut app).await;
        app
    }

    fn visible_names(app: &App) -> Vec<String> {
        app.visible_documents().iter().map(|d| d.filename.clone()).collect()
    }

    fn notification_text(app: &App) -> String {
        app.notification.as_ref().map(|n| n.message.clone()).unwrap_or_default()
    }

    #[tokio::test]
    async fn test_initial_load_populates_view_and_stats() {
        let dir = TempDir::new().unwrap();
        let api = Arc::new(MockApi::with_documents(sample_documents()));
        let app = loaded_app(api, dir.path()).await;

        assert!(!app.is_loading());
        assert_eq!(app.documents.len(), 2);
        assert_eq!(app.stats.total_documents, 2);
        assert_eq!(visible_names(&app), vec!["a.txt", "B.TXT"]);
    }

    #[tokio::test]
    async fn test_load_failure_keeps_previous_state() {
        let dir = TempDir::new().unwrap();
        let api = Arc::new(MockApi { fail_load: true, ..MockApi::default() });
        let app = loaded_app(api, dir.path()).await;

        assert!(!app.is_loading());
        assert!(app.documents.is_empty());
        assert_eq!(notification_text(&app), "Failed to load documents");
        assert_eq!(app.notification.as_ref().unwrap().severity, Severity::Error);
    }

    #[tokio::test]
    async fn test_search_filters_case_insensitively() {
        let dir = TempDir::new().unwrap();
        let api = Arc::new(MockApi::with_documents(sample_documents()));
        let mut app = loaded_app(api, dir.path()).await;

        app.handle_action(Action::Input('b'));
        assert_eq!(visible_names(&app), vec!["B.TXT"]);

        app.handle_action(Action::DeleteChar);
        assert_eq!(visible_names(&app), vec!["a.txt", "B.TXT"]);
    }

    #[tokio::test]
    async fn test_sort_toggle_and_reset() {
        let dir = TempDir::new().unwrap();
        let api = Arc::new(MockApi::with_documents(sample_documents()));
        let mut app = loaded_app(api, dir.path()).await;

        app.handle_action(Action::SortBy(SortField::Size));
        assert_eq!(visible_names(&app), vec!["B.TXT", "a.txt"]);

        app.handle_action(Action::SortBy(SortField::Size));
        assert_eq!(app.criteria.sort.order, SortOrder::Desc);
        assert_eq!(visible_names(&app), vec!["a.txt", "B.TXT"]);

        app.handle_action(Action::SortBy(SortField::Name));
        assert_eq!(app.criteria.sort.order, SortOrder::Asc);
    }

    #[tokio::test]
    async fn test_category_filter_and_clear() {
        let dir = TempDir::new().unwrap();
        let api = Arc::new(MockApi::with_documents(sample_documents()));
        let mut app = loaded_app(api, dir.path()).await;

        app.handle_action(Action::CycleCategory);
        assert_eq!(app.criteria.category, Some(Category::General));
        assert_eq!(visible_names(&app), vec!["a.txt"]);

        app.handle_action(Action::Input('z'));
        assert!(app.view.is_empty());

        app.handle_action(Action::ClearFilters);
        assert!(app.criteria.is_unfiltered());
        assert_eq!(app.view.len(), 2);
    }

    #[tokio::test]
    async fn test_selection_clamps_to_view() {
        let dir = TempDir::new().unwrap();
        let api = Arc::new(MockApi::with_documents(sample_documents()));
        let mut app = loaded_app(api, dir.path()).await;

        app.handle_action(Action::PageDown);
        assert_eq!(app.selected_idx, 1);
        app.handle_action(Action::MoveDown);
        assert_eq!(app.selected_idx, 1);
        app.handle_action(Action::PageUp);
        assert_eq!(app.selected_idx, 0);
        app.handle_action(Action::MoveUp);
        assert_eq!(app.selected_idx, 0);
    }

    #[tokio::test]
    async fn test_escape_clears_search_then_quits() {
        let dir = TempDir::new().unwrap();
        let api = Arc::new(MockApi::with_documents(sample_documents()));
        let mut app = loaded_app(api, dir.path()).await;

        app.handle_action(Action::Input('a'));
        app.handle_action(Action::Cancel);
        assert!(app.criteria.search_term.is_empty());
        assert!(!app.should_quit);

        app.handle_action(Action::Cancel);
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_declined_delete_makes_no_call() {
        let dir = TempDir::new().unwrap();
        let api = Arc::new(MockApi::with_documents(sample_documents()));
        let mut app = loaded_app(Arc::clone(&api), dir.path()).await;

        app.handle_action(Action::DeleteSelected);
        assert!(matches!(app.overlay, Some(Overlay::ConfirmDelete { ref id, .. }) if id == "1"));

        // unrelated keys keep the confirmation open
        app.handle_action(Action::Input('x'));
        assert!(app.overlay.is_some());

        app.handle_action(Action::Input('n'));
        assert!(app.overlay.is_none());
        tokio::task::yield_now().await;
        assert!(app.events_rx.try_recv().is_err());
        assert_eq!(api.calls(), vec!["list"]);
    }

    #[tokio::test]
    async fn test_confirmed_delete_reloads() {
        let dir = TempDir::new().unwrap();
        let api = Arc::new(MockApi::with_documents(sample_documents()));
        let mut app = loaded_app(Arc::clone(&api), dir.path()).await;

        app.handle_action(Action::DeleteSelected);
        app.handle_action(Action::Input('y'));
        settle(&mut app).await; // Deleted
        assert_eq!(notification_text(&app), "Document deleted");
        settle(&mut app).await; // Loaded

        assert_eq!(visible_names(&app), vec!["B.TXT"]);
        assert_eq!(api.calls(), vec!["list", "delete:1", "list"]);
    }

    #[tokio::test]
    async fn test_upload_success_closes_dialog_and_reloads() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("new.txt");
        std::fs::write(&file, "content").unwrap();
        let api = Arc::new(MockApi::with_documents(sample_documents()));
        let mut app = loaded_app(Arc::clone(&api), dir.path()).await;

        app.handle_action(Action::OpenUpload);
        app.handle_action(Action::Paste(file.display().to_string()));
        app.handle_action(Action::Confirm);
        assert!(matches!(&app.overlay, Some(Overlay::Upload(d)) if d.is_uploading()));

        // input is ignored while uploading
        app.handle_action(Action::Cancel);
        assert!(app.overlay.is_some());

        settle(&mut app).await; // Uploaded
        assert!(app.overlay.is_none());
        settle(&mut app).await; // Loaded
        assert_eq!(app.documents.len(), 3);
        assert!(api.calls().contains(&"upload:new.txt:general".to_string()));
    }

    #[tokio::test]
    async fn test_upload_failure_keeps_dialog_state() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("retry.md");
        std::fs::write(&file, "content").unwrap();
        let api = Arc::new(MockApi { fail_upload: true, ..MockApi::default() });
        let mut app = loaded_app(api, dir.path()).await;

        app.handle_action(Action::OpenUpload);
        app.handle_action(Action::Paste(file.display().to_string()));
        app.handle_action(Action::MoveRight);
        app.handle_action(Action::Confirm);
        settle(&mut app).await;

        assert_eq!(notification_text(&app), "Upload failed");
        match &app.overlay {
            Some(Overlay::Upload(dialog)) => {
                assert!(!dialog.is_uploading());
                assert_eq!(dialog.selected().unwrap().name, "retry.md");
                assert_eq!(dialog.category(), Some(&Category::General));
            }
            other => panic!("expected upload dialog, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_upload_without_file_sends_nothing() {
        let dir = TempDir::new().unwrap();
        let api = Arc::new(MockApi::default());
        let mut app = loaded_app(Arc::clone(&api), dir.path()).await;

        app.handle_action(Action::OpenUpload);
        app.handle_action(Action::Confirm);
        tokio::task::yield_now().await;

        assert!(app.events_rx.try_recv().is_err());
        assert_eq!(api.calls(), vec!["list"]);
    }

    #[tokio::test]
    async fn test_viewer_save_updates_local_copy_only() {
        let dir = TempDir::new().unwrap();
        let api = Arc::new(MockApi::with_documents(sample_documents()));
        let mut app = loaded_app(Arc::clone(&api), dir.path()).await;

        app.handle_action(Action::Confirm);
        assert!(matches!(app.overlay, Some(Overlay::Viewer(_))));
        app.handle_action(Action::ToggleEdit);
        app.handle_action(Action::Input('!'));
        app.handle_action(Action::NextTab);
        app.handle_action(Action::MoveRight);
        app.handle_action(Action::Save);

        assert!(app.overlay.is_none());
        assert_eq!(app.documents[0].content, "first entry!");
        assert_eq!(app.documents[0].category, Category::Legislation);
        assert!(notification_text(&app).contains("local only"));
        assert_eq!(api.calls(), vec!["list"]);
    }

    #[tokio::test]
    async fn test_viewer_escape_discards_draft() {
        let dir = TempDir::new().unwrap();
        let api = Arc::new(MockApi::with_documents(sample_documents()));
        let mut app = loaded_app(api, dir.path()).await;

        app.handle_action(Action::Confirm);
        app.handle_action(Action::ToggleEdit);
        app.handle_action(Action::Input('!'));
        app.handle_action(Action::Cancel);

        assert!(app.overlay.is_none());
        assert_eq!(app.documents[0].content, "first entry");
    }

    #[tokio::test]
    async fn test_download_writes_to_configured_dir() {
        let dir = TempDir::new().unwrap();
        let api = Arc::new(MockApi::with_documents(sample_documents()));
        let mut app = loaded_app(api, dir.path()).await;

        app.handle_action(Action::Save);
        app.handle_action(Action::Save);

        assert_eq!(std::fs::read_to_string(dir.path().join("a.txt")).unwrap(), "first entry");
        assert!(dir.path().join("a (1).txt").exists());
        assert!(notification_text(&app).starts_with("Saved to"));
    }

    #[tokio::test]
    async fn test_scraper_rejects_invalid_url_without_call() {
        let dir = TempDir::new().unwrap();
        let api = Arc::new(MockApi::default());
        let mut app = loaded_app(Arc::clone(&api), dir.path()).await;

        app.handle_action(Action::NextTab);
        assert_eq!(app.tab, Tab::Scraper);
        for c in "example.org".chars() {
            app.handle_action(Action::Input(c));
        }
        app.handle_action(Action::Confirm);

        assert!(app.scraper.error().is_some());
        assert!(!app.scraper.is_in_flight());
        assert_eq!(api.calls(), vec!["list"]);
    }

    #[tokio::test]
    async fn test_scraper_success_reloads() {
        let dir = TempDir::new().unwrap();
        let api = Arc::new(MockApi::default());
        let mut app = loaded_app(Arc::clone(&api), dir.path()).await;

        app.handle_action(Action::NextTab);
        app.handle_action(Action::Paste("https://example.org/page".to_string()));
        app.handle_action(Action::Confirm);
        assert!(app.scraper.is_in_flight());

        settle(&mut app).await; // Scraped
        assert!(!app.scraper.is_in_flight());
        assert!(app.scraper.last_response().is_some());
        assert_eq!(notification_text(&app), "Website content added");
        settle(&mut app).await; // Loaded

        assert_eq!(
            api.calls(),
            vec!["list", "scrape:https://example.org/page:scraped", "list"]
        );
    }

    #[tokio::test]
    async fn test_bulk_scrape_uses_predefined_group() {
        let dir = TempDir::new().unwrap();
        let api = Arc::new(MockApi::default());
        let mut app = loaded_app(Arc::clone(&api), dir.path()).await;

        app.handle_action(Action::NextTab);
        app.handle_action(Action::ToggleBulk);
        settle(&mut app).await; // SitesLoaded
        app.handle_action(Action::NextSiteGroup);
        app.handle_action(Action::NextSiteGroup);
        assert_eq!(notification_text(&app), "Loaded ukraine sites");
        app.handle_action(Action::Paste("https://example.org/extra".to_string()));
        app.handle_action(Action::MoveRight);
        app.handle_action(Action::Confirm);
        assert!(app.scraper.is_in_flight());

        settle(&mut app).await; // Scraped
        assert!(app.scraper.bulk_urls().is_empty());
        assert_eq!(notification_text(&app), "Website content added");
        settle(&mut app).await; // Loaded

        assert_eq!(
            api.calls(),
            vec![
                "list",
                "sites",
                "bulk:https://court.gov.ua/,https://ccu.gov.ua/,https://example.org/extra:general",
                "list"
            ]
        );
    }

    #[tokio::test]
    async fn test_bulk_mode_fetches_sites_once() {
        let dir = TempDir::new().unwrap();
        let api = Arc::new(MockApi::default());
        let mut app = loaded_app(Arc::clone(&api), dir.path()).await;

        app.handle_action(Action::NextTab);
        app.handle_action(Action::ToggleBulk);
        settle(&mut app).await;
        app.handle_action(Action::ToggleBulk);
        app.handle_action(Action::ToggleBulk);
        app.handle_action(Action::Confirm);

        assert_eq!(app.scraper.error(), Some("Add at least one URL to scrape"));
        assert_eq!(api.calls(), vec!["list", "sites"]);
    }

    #[tokio::test]
    async fn test_scraper_escape_returns_to_documents() {
        let dir = TempDir::new().unwrap();
        let api = Arc::new(MockApi::default());
        let mut app = create_app(api, dir.path());

        app.handle_action(Action::NextTab);
        app.handle_action(Action::Input('h'));
        app.handle_action(Action::Cancel);
        assert_eq!(app.tab, Tab::Scraper);
        app.handle_action(Action::Cancel);
        assert_eq!(app.tab, Tab::Documents);
        assert!(!app.should_quit);
    }

    #[tokio::test]
    async fn test_quit_works_inside_dialogs() {
        let dir = TempDir::new().unwrap();
        let api = Arc::new(MockApi::default());
        let mut app = create_app(api, dir.path());

        app.handle_action(Action::OpenUpload);
        app.handle_action(Action::Quit);
        assert!(app.should_quit);
    }

    #[test]
    fn test_expired_notification_is_cleared() {
        let dir = TempDir::new().unwrap();
        let mut app = create_app(Arc::new(MockApi::default()), dir.path());
        app.config.notification_duration = Duration::ZERO;
        app.notify("gone", Severity::Info);
        app.check_and_clear_expired_notification();
        assert!(app.notification.is_none());
    }
}
