// Raw JSON view: the exact analysis result, pretty-printed.

use ratatui::layout::Rect;
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let lines: Vec<Line> = state.raw_json.lines().map(Line::from).collect();
    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Raw JSON (r to hide)"),
    );
    frame.render_widget(paragraph, area);
}
