// Card detail panel: the selected card's mechanic ratings and art URL.

use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::rows::tier_rank;
use crate::tui::{ArtState, ViewState};

use super::tier_style;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let block = Block::default().borders(Borders::ALL).title("Card Detail");

    let Some(card) = state.card_names.get(state.selected_card) else {
        let paragraph = Paragraph::new(Span::styled(
            "Select a card...",
            Style::default().add_modifier(Modifier::DIM),
        ))
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    };

    let mut lines = vec![Line::from(Span::styled(
        card.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    ))];

    match state.result.get(card) {
        Some(mechanics) if !mechanics.is_empty() => {
            for (mech, tier) in mechanics {
                lines.push(Line::from(vec![
                    Span::raw(format!("{}: ", crate::rows::mechanic_label(mech))),
                    Span::styled(tier.clone(), tier_style(tier_rank(tier))),
                ]));
            }
        }
        _ => {
            lines.push(Line::from(Span::styled(
                "No tagged mechanics",
                Style::default().add_modifier(Modifier::DIM),
            )));
        }
    }

    if let Some(ArtState::Resolved(Some(url))) = state.art.get(&card.to_lowercase()) {
        lines.push(Line::from(Span::styled(
            format!("art: {url}"),
            Style::default().add_modifier(Modifier::DIM),
        )));
    }

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
