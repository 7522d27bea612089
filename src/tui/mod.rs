// Interactive terminal dashboard
mod app;
mod events;
mod layout;
mod notification;
mod rendering;
mod scraper;
mod terminal;
mod timestamps;
mod upload;
mod viewer;

use std::sync::Arc;

use anyhow::Result;
pub use app::App;
pub use scraper::{validate_bulk_urls, validate_scrape_url};
use terminal::TerminalManager;

use crate::client::AdminApi;
use crate::config::AdminConfig;

/// Run the dashboard until the user quits.
///
/// Must be called with a tokio runtime entered; backend calls are spawned
/// onto it.
pub fn run_dashboard(api: Arc<dyn AdminApi>, config: AdminConfig) -> Result<()> {
    let mut manager = TerminalManager::new()?;
    let mut app = App::new(api, config);

    let result = app.run(manager.terminal_mut());
    manager.restore()?;

    result
}
