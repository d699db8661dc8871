// Filter bar: search text, mechanic chips with counts, tier badges.
//
// The chip list is shared with the input handler so the cursor toggles
// exactly what is drawn.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::rows::{mechanic_counts, TIER_DEFS};
use crate::tui::ViewState;

use super::tier_style;

// ---------------------------------------------------------------------------
// Chip model
// ---------------------------------------------------------------------------

/// What toggling a chip does.
#[derive(Debug, Clone, PartialEq)]
pub enum ChipKind {
    /// Toggle this mechanic key in the filter.
    Mechanic(String),
    /// Toggle this tier rank in the filter.
    Tier(u8),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chip {
    pub kind: ChipKind,
    pub label: String,
    pub active: bool,
}

/// The chips in display order: mechanics by descending row count, then the
/// six tiers strongest-first.
pub fn chip_list(state: &ViewState) -> Vec<Chip> {
    let mut chips = Vec::new();
    for (key, label, count) in mechanic_counts(&state.row_set.rows) {
        chips.push(Chip {
            active: state.filter.mechanics.contains(&key),
            label: format!("{label}: {count}"),
            kind: ChipKind::Mechanic(key),
        });
    }
    for def in TIER_DEFS {
        chips.push(Chip {
            active: state.filter.tiers.contains(&def.rank),
            label: def.label.to_string(),
            kind: ChipKind::Tier(def.rank),
        });
    }
    chips
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let mut lines = Vec::new();

    // Search line.
    let search_label = if state.search_mode {
        Span::styled(
            "Search: ",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )
    } else {
        Span::raw("Search: ")
    };
    let search_text = if state.filter.search.is_empty() && !state.search_mode {
        Span::styled("Search cards...", Style::default().add_modifier(Modifier::DIM))
    } else {
        let cursor = if state.search_mode { "_" } else { "" };
        Span::raw(format!("{}{cursor}", state.filter.search))
    };
    lines.push(Line::from(vec![search_label, search_text]));

    // Chip lines: mechanics, then tiers.
    let chips = chip_list(state);
    let tier_start = chips
        .iter()
        .position(|chip| matches!(chip.kind, ChipKind::Tier(_)))
        .unwrap_or(chips.len());
    lines.push(chip_line(&chips[..tier_start], state.chip_cursor, 0, None));
    lines.push(chip_line(
        &chips[tier_start..],
        state.chip_cursor,
        tier_start,
        Some("Tiers: "),
    ));

    // Narrowing summary.
    let total = state.row_set.rows.len();
    let shown = state.filtered_rows().len();
    if state.filter.is_active() && shown < total {
        lines.push(Line::from(Span::styled(
            format!("Showing {shown} of {total} results"),
            Style::default().add_modifier(Modifier::DIM),
        )));
    }

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Filters"));
    frame.render_widget(paragraph, area);
}

fn chip_line<'a>(
    chips: &'a [Chip],
    cursor: usize,
    offset: usize,
    prefix: Option<&'static str>,
) -> Line<'a> {
    let mut spans = Vec::new();
    if let Some(prefix) = prefix {
        spans.push(Span::styled(
            prefix,
            Style::default().add_modifier(Modifier::DIM),
        ));
    }
    for (i, chip) in chips.iter().enumerate() {
        let mut style = match &chip.kind {
            ChipKind::Tier(rank) => tier_style(*rank),
            ChipKind::Mechanic(_) => Style::default(),
        };
        if chip.active {
            style = style.add_modifier(Modifier::REVERSED);
        }
        if offset + i == cursor {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        spans.push(Span::styled(format!("[{}]", chip.label), style));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
