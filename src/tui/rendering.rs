use chrono::{DateTime, Utc};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{
    Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Tabs, Wrap,
};

use super::app::{Overlay, Tab};
use super::layout::{DashboardLayout, centered_rect};
use super::notification::{Notification, Severity};
use super::scraper::{ScrapeMode, ScraperForm};
use super::timestamps::{format_added_at, format_full};
use super::upload::{ACCEPTED_EXTENSIONS, UploadDialog};
use super::viewer::{DocumentViewer, EditFocus};
use crate::filters::{SortField, SortState, ViewCriteria, view_summary};
use crate::models::{AdminStats, Document, MAX_BULK_URLS};
use crate::utils::{format_file_size, sanitize_for_display, truncate_chars};

const TEXT: Color = Color::Rgb(250, 250, 250);
const MUTED: Color = Color::Rgb(113, 113, 122);
const ACCENT: Color = Color::Rgb(16, 185, 129);
const SURFACE: Color = Color::Rgb(24, 24, 27);
const ERROR: Color = Color::Rgb(239, 68, 68);
const WARNING: Color = Color::Rgb(245, 158, 11);
const INFO: Color = Color::Rgb(59, 130, 246);

/// Everything a frame needs, borrowed from the app
pub struct RenderState<'a> {
    pub tab: Tab,
    /// Visible rows in display order
    pub documents: Vec<&'a Document>,
    pub total_count: usize,
    pub selected_idx: usize,
    pub criteria: &'a ViewCriteria,
    pub stats: &'a AdminStats,
    pub overlay: Option<&'a Overlay>,
    pub scraper: &'a ScraperForm,
    pub notification: Option<&'a Notification>,
    pub is_loading: bool,
    pub now: DateTime<Utc>,
}

/// Render the entire UI
pub fn render_ui(frame: &mut Frame, state: &RenderState) {
    let layout = DashboardLayout::new(frame.area());

    render_tabs(frame, layout.tabs_area, state.tab);
    render_notification(frame, layout.notification_area, state.notification);

    match state.tab {
        Tab::Documents => {
            render_stats(frame, layout.stats_area, state.stats);
            render_search_bar(frame, layout.search_area, state.criteria);
            render_table(frame, layout.table_area, state);
        }
        Tab::Scraper => render_scraper(frame, layout.body_area, state.scraper),
    }

    render_status_bar(frame, layout.status_area, state);

    match state.overlay {
        Some(Overlay::Upload(dialog)) => render_upload_dialog(frame, dialog),
        Some(Overlay::Viewer(viewer)) => render_viewer(frame, viewer, &state.now),
        Some(Overlay::ConfirmDelete { filename, .. }) => render_confirm_delete(frame, filename),
        None => {}
    }
}

/// Column header with the sort arrow when `field` is the active sort key
fn header_label(label: &str, field: SortField, sort: &SortState) -> String {
    if sort.field == field { format!("{} {}", label, sort.order.arrow()) } else { label.to_string() }
}

fn bordered(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(MUTED))
        .title(title)
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Success => ACCENT,
        Severity::Error => ERROR,
        Severity::Warning => WARNING,
        Severity::Info => INFO,
    }
}

fn render_tabs(frame: &mut Frame, area: Rect, active: Tab) {
    let titles: Vec<String> = Tab::ALL.iter().map(|t| format!(" {} ", t.title())).collect();
    let selected = Tab::ALL.iter().position(|t| *t == active).unwrap_or(0);
    let tabs = Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(MUTED))
        .highlight_style(Style::default().fg(TEXT).bg(ACCENT).add_modifier(Modifier::BOLD))
        .divider("│");
    frame.render_widget(tabs, area);
}

fn render_notification(frame: &mut Frame, area: Rect, notification: Option<&Notification>) {
    let Some(notification) = notification else {
        return;
    };
    let color = severity_color(notification.severity);
    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", notification.severity.icon()),
            Style::default().fg(SURFACE).bg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {}", sanitize_for_display(&notification.message)),
            Style::default().fg(color),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_stats(frame: &mut Frame, area: Rect, stats: &AdminStats) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3), Constraint::Ratio(1, 3), Constraint::Ratio(1, 3)])
        .split(area);

    let values = [
        (" Documents ", stats.total_documents.to_string()),
        (" Chats ", stats.total_chats.to_string()),
        (" Categories ", stats.category_count().to_string()),
    ];
    for ((title, value), card) in values.into_iter().zip(cards.iter()) {
        let paragraph = Paragraph::new(Span::styled(
            value,
            Style::default().fg(TEXT).add_modifier(Modifier::BOLD),
        ))
        .block(bordered(title));
        frame.render_widget(paragraph, *card);
    }
}

fn render_search_bar(frame: &mut Frame, area: Rect, criteria: &ViewCriteria) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(area);

    let search = if criteria.search_term.is_empty() {
        Line::from(Span::styled("Type to search filenames and content", Style::default().fg(MUTED)))
    } else {
        Line::from(vec![
            Span::styled(criteria.search_term.clone(), Style::default().fg(TEXT)),
            Span::styled("▏", Style::default().fg(ACCENT)),
        ])
    };
    frame.render_widget(Paragraph::new(search).block(bordered(" Search ")), chunks[0]);

    let category = match &criteria.category {
        Some(category) => {
            Span::styled(sanitize_for_display(&category.label()), Style::default().fg(ACCENT))
        }
        None => Span::styled("All categories", Style::default().fg(TEXT)),
    };
    frame.render_widget(
        Paragraph::new(Line::from(category)).block(bordered(" Category (Ctrl+F) ")),
        chunks[1],
    );
}

fn render_table(frame: &mut Frame, area: Rect, state: &RenderState) {
    let block = bordered(" Documents ");

    let empty_message = if state.is_loading && state.total_count == 0 {
        Some("Loading documents…")
    } else if state.total_count == 0 {
        Some("No documents yet. Press Ctrl+U to upload one.")
    } else if state.documents.is_empty() {
        Some("No documents match the current filters (Ctrl+X clears them)")
    } else {
        None
    };
    if let Some(message) = empty_message {
        let paragraph =
            Paragraph::new(Span::styled(message, Style::default().fg(MUTED))).block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let sort = &state.criteria.sort;
    let header = Row::new(vec![
        Cell::from(header_label("Name [F1]", SortField::Name, sort)),
        Cell::from(header_label("Category [F3]", SortField::Category, sort)),
        Cell::from(header_label("Size [F2]", SortField::Size, sort)),
        Cell::from("Words"),
        Cell::from("Added"),
    ])
    .style(Style::default().fg(MUTED).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = state
        .documents
        .iter()
        .map(|doc| {
            Row::new(vec![
                Cell::from(sanitize_for_display(&doc.filename)),
                Cell::from(sanitize_for_display(&doc.category.label())),
                Cell::from(format_file_size(doc.size)),
                Cell::from(doc.word_count.to_string()),
                Cell::from(format_added_at(doc.added_at.as_ref(), &state.now)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Min(20),
        Constraint::Length(18),
        Constraint::Length(12),
        Constraint::Length(8),
        Constraint::Length(14),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .style(Style::default().fg(TEXT))
        .row_highlight_style(Style::default().fg(TEXT).bg(ACCENT).add_modifier(Modifier::BOLD));

    let mut table_state = TableState::default().with_selected(Some(state.selected_idx));
    frame.render_stateful_widget(table, area, &mut table_state);
}

fn render_scraper(frame: &mut Frame, area: Rect, form: &ScraperForm) {
    let mut lines = vec![
        Line::from(Span::styled(
            "Submit a web page; the backend fetches it and stores the text as a document.",
            Style::default().fg(MUTED),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Mode: ", Style::default().fg(MUTED)),
            Span::styled(
                match form.mode() {
                    ScrapeMode::Single => "Single URL",
                    ScrapeMode::Bulk => "Bulk",
                },
                Style::default().fg(TEXT),
            ),
        ]),
        Line::from(vec![
            Span::styled("URL: ", Style::default().fg(MUTED)),
            Span::styled(sanitize_for_display(form.url_input()), Style::default().fg(TEXT)),
            Span::styled("▏", Style::default().fg(ACCENT)),
        ]),
        Line::from(vec![
            Span::styled("Category: ", Style::default().fg(MUTED)),
            Span::styled(
                format!("◀ {} ▶", sanitize_for_display(&form.category().label())),
                Style::default().fg(ACCENT),
            ),
        ]),
    ];

    if form.mode() == ScrapeMode::Bulk {
        lines.push(Line::from(vec![
            Span::styled("Predefined sites: ", Style::default().fg(MUTED)),
            Span::raw(sanitize_for_display(&form.sites_status())),
        ]));
        let source = form
            .site_group_name()
            .map(|name| format!(" from {}", sanitize_for_display(name)))
            .unwrap_or_default();
        lines.push(Line::from(Span::styled(
            format!("URLs ({}/{}){}:", form.bulk_urls().len(), MAX_BULK_URLS, source),
            Style::default().fg(MUTED),
        )));
        for url in form.bulk_urls() {
            lines.push(Line::from(format!("  • {}", sanitize_for_display(url))));
        }
    }
    lines.push(Line::from(""));

    if form.is_in_flight() {
        lines.push(Line::from(Span::styled("Scraping…", Style::default().fg(INFO))));
    }
    if let Some(error) = form.error() {
        lines.push(Line::from(Span::styled(error.to_string(), Style::default().fg(ERROR))));
    }

    if let Some(response) = form.last_response() {
        let summary = &response.summary;
        lines.push(Line::from(Span::styled(
            sanitize_for_display(&response.message),
            Style::default().fg(TEXT).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            format!(
                "Processed {}, successful {}, failed {}",
                summary.total_processed, summary.successful, summary.failed
            ),
            Style::default().fg(MUTED),
        )));
        for result in &response.results {
            let line = if result.success {
                Line::from(vec![
                    Span::styled("✓ ", Style::default().fg(ACCENT)),
                    Span::raw(sanitize_for_display(&result.title)),
                    Span::styled(
                        format!(" ({}, {} chars)", sanitize_for_display(&result.url), result.content_length),
                        Style::default().fg(MUTED),
                    ),
                ])
            } else {
                Line::from(vec![
                    Span::styled("✗ ", Style::default().fg(ERROR)),
                    Span::raw(sanitize_for_display(&result.url)),
                    Span::styled(
                        format!(": {}", sanitize_for_display(result.error.as_deref().unwrap_or("failed"))),
                        Style::default().fg(ERROR),
                    ),
                ])
            };
            lines.push(line);
        }
    }

    let paragraph =
        Paragraph::new(Text::from(lines)).block(bordered(" Scrape website ")).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_status_bar(frame: &mut Frame, area: Rect, state: &RenderState) {
    let text = match state.tab {
        Tab::Documents => {
            let mut parts = vec![view_summary(
                state.documents.len(),
                state.total_count,
                &state.criteria.search_term,
            )];
            if state.is_loading {
                parts.push("loading…".to_string());
            }
            parts.push(
                "Enter: view | ^U: upload | ^D: delete | ^S: save | ^Y: copy | ^R: refresh | Tab: scraper | ^C: quit"
                    .to_string(),
            );
            parts.join(" | ")
        }
        Tab::Scraper => {
            "Enter: scrape/add | ←/→: category | ^B: bulk | ^G: site group | Esc: clear/back | Tab: documents | ^C: quit"
                .to_string()
        }
    };

    let paragraph = Paragraph::new(format!(" {} ", sanitize_for_display(&text)))
        .style(Style::default().fg(TEXT).bg(SURFACE));
    frame.render_widget(paragraph, area);
}

fn render_upload_dialog(frame: &mut Frame, dialog: &UploadDialog) {
    let area = centered_rect(60, 50, frame.area());
    frame.render_widget(Clear, area);

    let category = match dialog.category() {
        Some(category) => sanitize_for_display(&category.label()),
        None => "Default (general)".to_string(),
    };
    let mut lines = vec![
        Line::from(vec![
            Span::styled("Category: ", Style::default().fg(MUTED)),
            Span::styled(format!("◀ {} ▶", category), Style::default().fg(ACCENT)),
        ]),
        Line::from(""),
    ];

    match dialog.selected() {
        Some(file) => {
            lines.push(Line::from(vec![
                Span::styled("▸ ", Style::default().fg(ACCENT)),
                Span::styled(
                    sanitize_for_display(&file.name),
                    Style::default().fg(TEXT).add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("  {}", format_file_size(file.size)), Style::default().fg(MUTED)),
            ]));
            lines.push(Line::from(Span::styled(
                "Backspace removes the file",
                Style::default().fg(MUTED),
            )));
            if !file.has_accepted_extension() {
                lines.push(Line::from(Span::styled(
                    "This file type may not be supported by the backend",
                    Style::default().fg(WARNING),
                )));
            }
        }
        None => {
            lines.push(Line::from(vec![
                Span::styled("Path: ", Style::default().fg(MUTED)),
                Span::styled(sanitize_for_display(dialog.path_input()), Style::default().fg(TEXT)),
                Span::styled("▏", Style::default().fg(ACCENT)),
            ]));
            lines.push(Line::from(Span::styled(
                "Type a path and press Enter, or drop a file onto the terminal",
                Style::default().fg(MUTED),
            )));
        }
    }

    let accepted: Vec<String> = ACCEPTED_EXTENSIONS.iter().map(|ext| format!(".{}", ext)).collect();
    lines.push(Line::from(Span::styled(
        format!("Accepted: {}", accepted.join(" ")),
        Style::default().fg(MUTED),
    )));

    if let Some(error) = dialog.error() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(sanitize_for_display(error), Style::default().fg(ERROR))));
    }

    lines.push(Line::from(""));
    let footer = if dialog.is_uploading() {
        Span::styled("Uploading…", Style::default().fg(INFO))
    } else {
        Span::styled("Enter: upload | ←/→: category | Esc: cancel", Style::default().fg(MUTED))
    };
    lines.push(Line::from(footer));

    let paragraph = Paragraph::new(Text::from(lines))
        .block(bordered(" Upload document ").border_style(Style::default().fg(ACCENT)))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_viewer(frame: &mut Frame, viewer: &DocumentViewer, now: &DateTime<Utc>) {
    let area = centered_rect(80, 80, frame.area());
    frame.render_widget(Clear, area);

    let doc = viewer.displayed();
    let editing = viewer.is_editing();
    let mut title = if editing { " Edit document (local only) " } else { " Document " }.to_string();
    if viewer.is_dirty() {
        title.push_str("● unsaved ");
    }
    let block = bordered(&title).border_style(Style::default().fg(ACCENT));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    let focused = |field: EditFocus| {
        if editing && viewer.focus() == field {
            Style::default().fg(SURFACE).bg(ACCENT)
        } else {
            Style::default().fg(ACCENT)
        }
    };
    let category = if editing {
        format!("◀ {} ▶", doc.category.label())
    } else {
        doc.category.label()
    };

    let label = |text: &'static str| Span::styled(text, Style::default().fg(MUTED));
    let header = vec![
        Line::from(Span::styled(
            sanitize_for_display(&doc.filename),
            Style::default().fg(TEXT).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            label("Category: "),
            Span::styled(sanitize_for_display(&category), focused(EditFocus::Category)),
            label("  Size: "),
            Span::raw(doc.size_kb()),
            label("  ID: "),
            Span::raw(sanitize_for_display(&truncate_chars(&doc.id, 40))),
        ]),
        Line::from(vec![
            label("Source: "),
            Span::raw(sanitize_for_display(&doc.source)),
            label("  URL: "),
            Span::raw(sanitize_for_display(&doc.original_url)),
        ]),
        Line::from(vec![
            label("Words: "),
            Span::raw(doc.word_count.to_string()),
            label("  Chunks: "),
            Span::raw(doc.chunks_count.to_string()),
            label("  Added: "),
            Span::raw(format!(
                "{} ({})",
                format_full(doc.added_at.as_ref()),
                format_added_at(doc.added_at.as_ref(), now)
            )),
        ]),
    ];
    frame.render_widget(Paragraph::new(Text::from(header)), chunks[0]);

    let content_style = if editing && viewer.focus() == EditFocus::Content {
        Style::default().fg(TEXT)
    } else {
        Style::default().fg(Color::Rgb(212, 212, 216))
    };
    let mut content = sanitize_for_display(&doc.content);
    if editing && viewer.focus() == EditFocus::Content {
        content.push('▏');
    }
    let content_block = Block::default()
        .borders(Borders::TOP)
        .border_style(Style::default().fg(MUTED))
        .title(Span::styled(" Content ", focused(EditFocus::Content)));
    let paragraph = Paragraph::new(content)
        .style(content_style)
        .block(content_block)
        .wrap(Wrap { trim: false })
        .scroll((viewer.scroll(), 0));
    frame.render_widget(paragraph, chunks[1]);

    let hints = if editing {
        "^S: save | Tab: field | ←/→: category | ^E: stop editing | Esc: close"
    } else {
        "↑/↓: scroll | ^E: edit | ^S: save to disk | ^Y: copy | Esc: close"
    };
    frame.render_widget(Paragraph::new(Span::styled(hints, Style::default().fg(MUTED))), chunks[2]);
}

fn render_confirm_delete(frame: &mut Frame, filename: &str) {
    let area = centered_rect(50, 30, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(vec![
            Span::raw("Delete "),
            Span::styled(
                format!("\"{}\"", sanitize_for_display(filename)),
                Style::default().fg(TEXT).add_modifier(Modifier::BOLD),
            ),
            Span::raw("?"),
        ]),
        Line::from(Span::styled("This cannot be undone.", Style::default().fg(MUTED))),
        Line::from(""),
        Line::from(vec![
            Span::styled("y", Style::default().fg(ERROR).add_modifier(Modifier::BOLD)),
            Span::raw(": delete   "),
            Span::styled("n", Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
            Span::raw("/Esc: cancel"),
        ]),
    ];

    let paragraph = Paragraph::new(Text::from(lines))
        .block(bordered(" Confirm delete ").border_style(Style::default().fg(ERROR)))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}
