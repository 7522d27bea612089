use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Screen regions of the dashboard
pub struct DashboardLayout {
    pub tabs_area: Rect,
    pub notification_area: Rect,
    /// Everything between the banner and the status bar (scraper tab body)
    pub body_area: Rect,
    pub stats_area: Rect,
    pub search_area: Rect,
    pub table_area: Rect,
    pub status_area: Rect,
}

impl DashboardLayout {
    /// Vertical stack:
    /// - Tab bar: 1 row
    /// - Notification banner: 1 row
    /// - Body: stats cards (3 rows), search bar (3 rows), document table (rest)
    /// - Status bar: bottom row
    pub fn new(area: Rect) -> Self {
        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Tabs
                Constraint::Length(1), // Notification
                Constraint::Min(3),    // Body
                Constraint::Length(1), // Status bar
            ])
            .split(area);

        let body = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Stats cards
                Constraint::Length(3), // Search and filter bar
                Constraint::Min(3),    // Table
            ])
            .split(outer[2]);

        Self {
            tabs_area: outer[0],
            notification_area: outer[1],
            body_area: outer[2],
            stats_area: body[0],
            search_area: body[1],
            table_area: body[2],
            status_area: outer[3],
        }
    }
}

/// Rectangle of `percent_x` × `percent_y` centered in `area`, for dialogs
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
