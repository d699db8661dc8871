// Table view: sortable card / mechanic / tier rows.
//
// Sorting is re-applied to the filtered row set on every render; the sort
// column and direction live in ViewState and reset whenever new results
// arrive.

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row as TableRow, Table};
use ratatui::Frame;

use crate::protocol::SortColumn;
use crate::rows::{no_mechanics_note, Row};
use crate::tui::ViewState;

use super::tier_style;

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

/// Sort rows by the active column.
///
/// Text columns compare case-insensitively; the tier column compares by
/// rank. The sort is stable, so equal keys keep their filtered order.
pub fn sort_rows(rows: &mut [&Row], col: SortColumn, ascending: bool) {
    rows.sort_by(|a, b| {
        let ordering = match col {
            SortColumn::Card => a.card.to_lowercase().cmp(&b.card.to_lowercase()),
            SortColumn::Mechanic => a
                .mechanic_label
                .to_lowercase()
                .cmp(&b.mechanic_label.to_lowercase()),
            SortColumn::Tier => a.tier_rank.cmp(&b.tier_rank),
        };
        if ascending {
            ordering
        } else {
            ordering.reverse()
        }
    });
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let mut filtered = state.filtered_rows();

    if filtered.is_empty() && state.filter.is_active() {
        render_empty_filter_state(frame, area);
        return;
    }

    sort_rows(&mut filtered, state.sort_col, state.sort_asc);

    let header = TableRow::new(vec![
        Cell::from(header_label("Card", SortColumn::Card, state)),
        Cell::from(header_label("Mechanic", SortColumn::Mechanic, state)),
        Cell::from(header_label("Tier", SortColumn::Tier, state)),
    ])
    .style(
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    );

    let body: Vec<TableRow> = filtered
        .iter()
        .map(|row| {
            TableRow::new(vec![
                Cell::from(row.card.clone()),
                Cell::from(row.mechanic_label.clone()),
                Cell::from(Span::styled(row.tier.clone(), tier_style(row.tier_rank))),
            ])
        })
        .collect();

    let widths = [
        Constraint::Min(24),
        Constraint::Length(22),
        Constraint::Length(8),
    ];

    let mut title = format!("Results ({})", filtered.len());
    if state.row_set.no_mechanics_count > 0 {
        title.push_str(&format!(
            " | {}",
            no_mechanics_note(state.row_set.no_mechanics_count)
        ));
    }

    let table = Table::new(body, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title));

    frame.render_widget(table, area);
}

/// Column header with the sort arrow on the active column.
fn header_label(name: &str, col: SortColumn, state: &ViewState) -> String {
    if state.sort_col == col {
        let arrow = if state.sort_asc { "\u{25b2}" } else { "\u{25bc}" };
        format!("{name} {arrow}")
    } else {
        name.to_string()
    }
}

/// Active filters matched nothing: a distinct state with a clear-all hint.
fn render_empty_filter_state(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "No cards match your filters",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "press x to clear all filters",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];
    let paragraph = Paragraph::new(lines)
        .centered()
        .block(Block::default().borders(Borders::ALL).title("Results"));
    frame.render_widget(paragraph, area);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
