// Screen layout: panel arrangement and sizing.
//
// Divides the terminal area into fixed zones:
//
// +--------------------------------------------------+
// | Status Bar (1 row)                                |
// +--------------------------------------------------+
// | Banner (1 row, empty unless an error is showing)  |
// +----------------+---------------------------------+
// | Editor (34%)   | Filters (6 rows)                 |
// |                +---------------------------------+
// |                | Results (fill)                   |
// |                +---------------------------------+
// |                | Card Detail (7 rows)             |
// +----------------+---------------------------------+
// | Help Bar (1 row)                                  |
// +--------------------------------------------------+

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Resolved screen areas for each zone.
#[derive(Debug, Clone)]
pub struct AppLayout {
    /// Top row: result counts, active view, loading indicator.
    pub status_bar: Rect,
    /// Second row: dismissible error banner.
    pub banner: Rect,
    /// Left column: card data, access code, and mechanics fields.
    pub editor: Rect,
    /// Right column top: search and filter chips.
    pub filters: Rect,
    /// Right column middle: the active result view.
    pub results: Rect,
    /// Right column bottom: per-card mechanic detail.
    pub detail: Rect,
    /// Bottom row: keyboard shortcut hints.
    pub help_bar: Rect,
}

/// Build the layout from the available terminal area.
pub fn build_layout(area: Rect) -> AppLayout {
    // Vertical: status(1) | banner(1) | middle(fill) | help(1)
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(12),
            Constraint::Length(1),
        ])
        .split(area);

    let status_bar = vertical[0];
    let banner = vertical[1];
    let middle = vertical[2];
    let help_bar = vertical[3];

    // Horizontal: editor (34%) | results column (66%)
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(34), Constraint::Percentage(66)])
        .split(middle);

    let editor = horizontal[0];
    let results_column = horizontal[1];

    // Results column vertical: filters (6) | results (fill) | detail (7)
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),
            Constraint::Min(5),
            Constraint::Length(7),
        ])
        .split(results_column);

    AppLayout {
        status_bar,
        banner,
        editor,
        filters: sections[0],
        results: sections[1],
        detail: sections[2],
        help_bar,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
