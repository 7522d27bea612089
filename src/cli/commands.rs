use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use crate::client::{AdminApi, HttpAdminClient};
use crate::config::AdminConfig;
use crate::download::save_document;
use crate::filters::{SortField, SortOrder, SortState, ViewCriteria, filter_documents, view_summary};
use crate::logging;
use crate::models::{
    BulkScrapeRequest, Category, DEFAULT_BULK_DELAY, Document, ScrapeRequest, ScrapeResponse,
};
use crate::tui::{run_dashboard, validate_bulk_urls, validate_scrape_url};
use crate::utils::{format_file_size, sanitize_for_display, truncate_chars};

#[derive(Parser)]
#[command(name = "corpus-admin")]
#[command(version)]
#[command(about = "Manage a document corpus: upload, browse, search and delete documents", long_about = None)]
pub struct Cli {
    /// Backend base URL
    #[arg(long, global = true, env = "CORPUS_ADMIN_URL")]
    pub base_url: Option<String>,

    /// Directory for downloaded documents (defaults to the system downloads folder)
    #[arg(long, global = true, env = "CORPUS_ADMIN_DOWNLOAD_DIR")]
    pub download_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open the interactive dashboard (default)
    Dashboard,
    /// Show backend statistics
    Stats,
    /// List documents, optionally searched, filtered and sorted
    List {
        /// Case-insensitive text matched against filename and content
        #[arg(short, long)]
        search: Option<String>,
        /// Only show documents in this category
        #[arg(short, long)]
        category: Option<Category>,
        /// Sort key: name, size or category
        #[arg(long, default_value = "name")]
        sort: SortField,
        /// Sort in descending order
        #[arg(long)]
        desc: bool,
    },
    /// Upload a file to the corpus
    Upload {
        file: PathBuf,
        /// Category for the new document (default: general)
        #[arg(short, long)]
        category: Option<Category>,
    },
    /// Delete a document by id
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Save a document's content to a local file
    Download {
        id: String,
        /// Target directory (overrides --download-dir)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Ask the backend to scrape a web page into the corpus
    Scrape {
        url: String,
        /// Category for the scraped document (default: scraped)
        #[arg(short, long)]
        category: Option<Category>,
    },
    /// Scrape several web pages (at most 20) in one backend request
    ScrapeBulk {
        /// Pages to scrape, added after the --site group's URLs
        #[arg(required_unless_present = "site")]
        urls: Vec<String>,
        /// Start from a predefined site group (see `sites`)
        #[arg(short, long)]
        site: Option<String>,
        /// Category for the scraped documents (default: scraped)
        #[arg(short, long)]
        category: Option<Category>,
        /// Seconds the backend waits between pages
        #[arg(long, default_value_t = DEFAULT_BULK_DELAY)]
        delay: f64,
    },
    /// List the predefined site groups the backend suggests for scraping
    Sites,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = AdminConfig::resolve(cli.base_url.as_deref(), cli.download_dir.clone())?;
    let client = HttpAdminClient::new(config.base_url.clone())
        .with_context(|| format!("Cannot use backend URL {}", config.base_url))?;
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;

    let command = cli.command.unwrap_or(Commands::Dashboard);

    // The dashboard owns the terminal, so it logs to a file instead of stderr.
    // The guard flushes buffered log lines on exit.
    let _log_guard = match command {
        Commands::Dashboard => logging::init_tui(cli.verbose),
        _ => {
            logging::init_cli(cli.verbose);
            None
        }
    };

    match command {
        Commands::Dashboard => {
            let _runtime_guard = runtime.enter();
            run_dashboard(Arc::new(client), config)
        }
        Commands::Stats => runtime.block_on(show_stats(&client, &mut io::stdout().lock())),
        Commands::List { search, category, sort, desc } => {
            let order = if desc { SortOrder::Desc } else { SortOrder::Asc };
            let criteria = ViewCriteria::new()
                .with_search(search.unwrap_or_default())
                .with_category(category)
                .with_sort(SortState::new(sort, order));
            runtime.block_on(list_documents(&client, &criteria, &mut io::stdout().lock()))
        }
        Commands::Upload { file, category } => runtime.block_on(upload_document(
            &client,
            &file,
            category.unwrap_or_default(),
            &mut io::stdout().lock(),
        )),
        Commands::Delete { id, yes } => runtime.block_on(delete_document(
            &client,
            &id,
            yes,
            &mut io::stdin().lock(),
            &mut io::stdout().lock(),
        )),
        Commands::Download { id, output } => {
            let dir = output.unwrap_or(config.download_dir);
            runtime.block_on(download_document(&client, &id, &dir, &mut io::stdout().lock()))
        }
        Commands::Scrape { url, category } => runtime.block_on(scrape_url(
            &client,
            &url,
            category.unwrap_or(Category::Scraped),
            &mut io::stdout().lock(),
        )),
        Commands::ScrapeBulk { urls, site, category, delay } => runtime.block_on(scrape_bulk(
            &client,
            &urls,
            site.as_deref(),
            category.unwrap_or(Category::Scraped),
            delay,
            &mut io::stdout().lock(),
        )),
        Commands::Sites => runtime.block_on(show_sites(&client, &mut io::stdout().lock())),
    }
}

/// Ask a yes/no question; anything but `y`/`yes` counts as no
pub fn confirm<R: BufRead, W: Write>(prompt: &str, input: &mut R, output: &mut W) -> Result<bool> {
    write!(output, "{} [y/N] ", prompt)?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer).context("Failed to read confirmation")?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

pub async fn show_stats<W: Write>(api: &dyn AdminApi, out: &mut W) -> Result<()> {
    let stats = api.stats().await.context("Failed to fetch stats")?;

    writeln!(out, "Corpus Statistics")?;
    writeln!(out, "=================")?;
    writeln!(out, "Total documents: {}", stats.total_documents)?;
    writeln!(out, "Total chats: {}", stats.total_chats)?;
    if stats.categories.is_empty() {
        writeln!(out, "Categories: 0")?;
    } else {
        let names: Vec<String> = stats.categories.iter().map(|c| sanitize_for_display(c)).collect();
        writeln!(out, "Categories: {} ({})", stats.category_count(), names.join(", "))?;
    }
    if let Some(database) = &stats.database_type {
        writeln!(out, "Database: {}", sanitize_for_display(database))?;
    }

    Ok(())
}

/// One table row: id, filename, category, size
fn format_document_row(doc: &Document) -> String {
    format!(
        "{:<14} {:<40} {:<16} {:>10}",
        truncate_chars(&sanitize_for_display(&doc.id), 14),
        truncate_chars(&sanitize_for_display(&doc.filename), 40),
        truncate_chars(&sanitize_for_display(doc.category.as_str()), 16),
        format_file_size(doc.size)
    )
}

pub async fn list_documents<W: Write>(
    api: &dyn AdminApi,
    criteria: &ViewCriteria,
    out: &mut W,
) -> Result<()> {
    let documents = api.list_documents().await.context("Failed to fetch documents")?;
    let view = filter_documents(&documents, criteria);

    if !view.is_empty() {
        writeln!(out, "{:<14} {:<40} {:<16} {:>10}", "ID", "FILENAME", "CATEGORY", "SIZE")?;
        for doc in &view {
            writeln!(out, "{}", format_document_row(doc))?;
        }
        writeln!(out)?;
    }
    writeln!(
        out,
        "{}",
        sanitize_for_display(&view_summary(view.len(), documents.len(), &criteria.search_term))
    )?;

    Ok(())
}

pub async fn upload_document<W: Write>(
    api: &dyn AdminApi,
    file: &Path,
    category: Category,
    out: &mut W,
) -> Result<()> {
    let metadata =
        std::fs::metadata(file).with_context(|| format!("Cannot read {}", file.display()))?;
    if !metadata.is_file() {
        bail!("{} is not a file", file.display());
    }

    let response = api
        .upload_document(file, &category)
        .await
        .with_context(|| format!("Failed to upload {}", file.display()))?;

    writeln!(
        out,
        "Uploaded {} ({}) as {}",
        sanitize_for_display(&response.filename),
        format_file_size(response.size),
        response.category
    )?;

    Ok(())
}

pub async fn delete_document<R: BufRead, W: Write>(
    api: &dyn AdminApi,
    id: &str,
    yes: bool,
    input: &mut R,
    out: &mut W,
) -> Result<()> {
    let prompt = format!("Delete document {}?", sanitize_for_display(id));
    if !yes && !confirm(&prompt, input, out)? {
        writeln!(out, "Aborted")?;
        return Ok(());
    }

    let response =
        api.delete_document(id).await.with_context(|| format!("Failed to delete document {}", id))?;
    writeln!(out, "Deleted {}", sanitize_for_display(&response.deleted_id))?;

    Ok(())
}

pub async fn download_document<W: Write>(
    api: &dyn AdminApi,
    id: &str,
    dir: &Path,
    out: &mut W,
) -> Result<()> {
    let documents = api.list_documents().await.context("Failed to fetch documents")?;
    let Some(doc) = documents.iter().find(|d| d.id == id) else {
        bail!("No document with id '{}'", sanitize_for_display(id));
    };

    let path = save_document(doc, dir)?;
    writeln!(out, "Saved to {}", path.display())?;

    Ok(())
}

pub async fn scrape_url<W: Write>(
    api: &dyn AdminApi,
    url: &str,
    category: Category,
    out: &mut W,
) -> Result<()> {
    let url = validate_scrape_url(url)?;
    let request = ScrapeRequest { url: url.to_string(), category };
    let response = api.scrape_url(&request).await.context("Failed to scrape URL")?;
    print_scrape_response(&response, out)?;

    if !response.results.is_empty() && response.results.iter().all(|r| !r.success) {
        bail!("Scraping failed for {}", request.url);
    }

    Ok(())
}

/// Scrape a batch of URLs, optionally seeded from a predefined site group
pub async fn scrape_bulk<W: Write>(
    api: &dyn AdminApi,
    urls: &[String],
    site: Option<&str>,
    category: Category,
    delay: f64,
    out: &mut W,
) -> Result<()> {
    if !delay.is_finite() || delay < 0.0 {
        bail!("Delay must be a non-negative number of seconds");
    }

    let mut requested = Vec::new();
    if let Some(name) = site {
        let sites = api.predefined_sites().await.context("Failed to fetch predefined sites")?;
        let Some(group) = sites.group(name) else {
            let available: Vec<&str> = sites.groups.iter().map(|g| g.name.as_str()).collect();
            bail!(
                "No predefined site group '{}' (available: {})",
                sanitize_for_display(name),
                sanitize_for_display(&available.join(", "))
            );
        };
        requested.extend(group.urls.iter().cloned());
    }
    requested.extend(urls.iter().cloned());

    let request = BulkScrapeRequest { urls: validate_bulk_urls(&requested)?, category, delay };
    let response = api.scrape_bulk(&request).await.context("Failed to scrape URLs")?;
    print_scrape_response(&response, out)?;

    if !response.results.is_empty() && response.results.iter().all(|r| !r.success) {
        bail!("Scraping failed for all {} URLs", request.urls.len());
    }

    Ok(())
}

pub async fn show_sites<W: Write>(api: &dyn AdminApi, out: &mut W) -> Result<()> {
    let sites = api.predefined_sites().await.context("Failed to fetch predefined sites")?;

    if let Some(error) = &sites.error {
        writeln!(out, "Backend reported: {}", sanitize_for_display(error))?;
    }
    if sites.is_empty() {
        writeln!(out, "No predefined sites")?;
        return Ok(());
    }
    for group in &sites.groups {
        writeln!(out, "{} ({})", sanitize_for_display(&group.name), group.urls.len())?;
        for url in &group.urls {
            writeln!(out, "  {}", sanitize_for_display(url))?;
        }
    }

    Ok(())
}

fn print_scrape_response<W: Write>(response: &ScrapeResponse, out: &mut W) -> Result<()> {
    if !response.message.is_empty() {
        writeln!(out, "{}", sanitize_for_display(&response.message))?;
    }
    for result in &response.results {
        if result.success {
            writeln!(
                out,
                "  ✓ {} ({} chars) {}",
                sanitize_for_display(&result.title),
                result.content_length,
                sanitize_for_display(&result.url)
            )?;
        } else {
            writeln!(
                out,
                "  ✗ {}: {}",
                sanitize_for_display(&result.url),
                sanitize_for_display(result.error.as_deref().unwrap_or("failed"))
            )?;
        }
    }
    let summary = &response.summary;
    writeln!(
        out,
        "Processed {}, successful {}, failed {}",
        summary.total_processed, summary.successful, summary.failed
    )?;
    Ok(())
}
