// Editor panel: card data, access code, and mechanics fields.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::tui::{InputFocus, ViewState};

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(8),
            Constraint::Length(3),
            Constraint::Length(8),
        ])
        .split(area);

    render_field(
        frame,
        sections[0],
        state,
        InputFocus::CardData,
        &format!("Card Data ({} lines)", state.card_data.lines().count()),
        &state.card_data,
        None,
    );
    render_field(
        frame,
        sections[1],
        state,
        InputFocus::AccessCode,
        "Access Code",
        &state.access_code,
        None,
    );
    render_field(
        frame,
        sections[2],
        state,
        InputFocus::Mechanics,
        "Mechanics",
        &state.mechanics,
        state.mechanics_placeholder.as_deref(),
    );
}

#[allow(clippy::too_many_arguments)]
fn render_field(
    frame: &mut Frame,
    area: Rect,
    state: &ViewState,
    field: InputFocus,
    title: &str,
    text: &str,
    placeholder: Option<&str>,
) {
    let focused = state.focus == field;
    let border_style = if focused && state.editing {
        Style::default().fg(Color::Yellow)
    } else if focused {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let title = if focused && state.editing {
        format!("{title} [editing]")
    } else {
        title.to_string()
    };

    let (content, dim) = if text.is_empty() {
        (placeholder.unwrap_or(""), true)
    } else {
        (text, false)
    };
    let mut style = Style::default();
    if dim {
        style = style.add_modifier(Modifier::DIM);
    }

    let lines: Vec<Line> = content.lines().map(Line::from).collect();
    let paragraph = Paragraph::new(lines)
        .style(style)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(title),
        );
    frame.render_widget(paragraph, area);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
