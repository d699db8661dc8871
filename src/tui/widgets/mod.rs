// Widget rendering functions, one module per panel.

pub mod card_detail;
pub mod editor;
pub mod filters;
pub mod raw_json;
pub mod results_table;
pub mod tier_board;

use ratatui::style::{Color, Modifier, Style};

use crate::rows::FALLBACK_RANK;

/// Badge style for a tier rank, shared by the table, the board, the filter
/// chips, and the card detail panel.
pub fn tier_style(rank: u8) -> Style {
    let color = match rank {
        0 | 1 => Color::Red,
        2 => Color::LightRed,
        3 => Color::Yellow,
        4 => Color::Green,
        5 => Color::Blue,
        _ => Color::Gray,
    };
    let style = Style::default().fg(color).add_modifier(Modifier::BOLD);
    if rank == FALLBACK_RANK {
        style.remove_modifier(Modifier::BOLD)
    } else {
        style
    }
}
