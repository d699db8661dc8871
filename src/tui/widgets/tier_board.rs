// Tier board view: filtered rows grouped into tier buckets, one tile per
// row, with card art resolved lazily through the fetch queue.
//
// A terminal cell cannot show the image itself, so each tile carries an
// art marker: pending, resolved, or no-art. The resolved URL is shown in
// the card detail panel.

use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::rows::{no_mechanics_note, Row, TierDef, TIER_DEFS};
use crate::tui::{ArtState, ViewState};

use super::tier_style;

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// Group rows into tier buckets, iterating the displayable tiers in rank
/// order and skipping empty buckets entirely. Row order inside a bucket is
/// preserved. Rows with an unrecognized tier have no bucket and do not
/// appear on the board.
pub fn group_by_tier<'a>(rows: &[&'a Row]) -> Vec<(TierDef, Vec<&'a Row>)> {
    TIER_DEFS
        .iter()
        .filter_map(|def| {
            let bucket: Vec<&Row> = rows
                .iter()
                .filter(|row| row.tier_rank == def.rank)
                .copied()
                .collect();
            if bucket.is_empty() {
                None
            } else {
                Some((*def, bucket))
            }
        })
        .collect()
}

/// Distinct card names in first-occurrence order; this is the order art is
/// requested in.
pub fn distinct_cards(rows: &[&Row]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    rows.iter()
        .filter(|row| seen.insert(row.card.to_lowercase()))
        .map(|row| row.card.clone())
        .collect()
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let filtered = state.filtered_rows();

    if filtered.is_empty() && state.filter.is_active() {
        let paragraph = Paragraph::new(Line::from(Span::styled(
            "No cards match your filters",
            Style::default().add_modifier(Modifier::BOLD),
        )))
        .centered()
        .block(Block::default().borders(Borders::ALL).title("Tier Board"));
        frame.render_widget(paragraph, area);
        return;
    }

    let mut lines = Vec::new();
    for (def, bucket) in group_by_tier(&filtered) {
        let mut spans = vec![Span::styled(
            format!(" {:<2} ", def.label),
            tier_style(def.rank).add_modifier(Modifier::REVERSED),
        )];
        spans.push(Span::raw(" "));
        for row in bucket {
            spans.push(Span::raw(format!(
                "{} {} ({})",
                art_marker(state, &row.card),
                row.card,
                row.mechanic_label
            )));
            spans.push(Span::raw("  "));
        }
        lines.push(Line::from(spans));
        lines.push(Line::from(""));
    }

    if state.row_set.no_mechanics_count > 0 {
        lines.push(Line::from(Span::styled(
            no_mechanics_note(state.row_set.no_mechanics_count),
            Style::default().add_modifier(Modifier::DIM),
        )));
    }

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Tier Board"));
    frame.render_widget(paragraph, area);
}

/// Tile art marker: art resolved, no art available, or still in the queue.
fn art_marker(state: &ViewState, card: &str) -> &'static str {
    match state.art.get(&card.to_lowercase()) {
        Some(ArtState::Resolved(Some(_))) => "\u{25a3}",
        Some(ArtState::Resolved(None)) => "\u{25a1}",
        Some(ArtState::Pending) | None => "\u{25cc}",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
