// Keyboard input handling and command dispatch.
//
// Translates crossterm key events into UserCommand messages for the
// orchestrator, or into local ViewState mutations (view switching, sort,
// filter chips, editor fields).

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::protocol::{SortColumn, UserCommand, ViewId};

use super::widgets::filters::{chip_list, ChipKind};
use super::{InputFocus, ViewState};

/// Handle a keyboard event.
///
/// Returns `Some(UserCommand)` when the key press should be forwarded to
/// the orchestrator (submit, quit). Returns `None` when the key press was
/// handled locally by mutating `ViewState`.
pub fn handle_key(key_event: KeyEvent, state: &mut ViewState) -> Option<UserCommand> {
    // On Windows, crossterm emits both Press and Release events for each
    // physical keypress; ignoring non-Press events prevents double input.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    // Ctrl+C always quits immediately regardless of mode (escape hatch)
    if key_event.modifiers.contains(KeyModifiers::CONTROL)
        && key_event.code == KeyCode::Char('c')
    {
        return Some(UserCommand::Quit);
    }

    if state.editing {
        return handle_editor_mode(key_event, state);
    }

    if state.search_mode {
        return handle_search_mode(key_event, state);
    }

    // Normal mode key dispatch
    match key_event.code {
        KeyCode::Char('q') => Some(UserCommand::Quit),

        KeyCode::Char('e') => {
            state.editing = true;
            None
        }

        KeyCode::Char('s') => submit_command(state),

        // View switching
        KeyCode::Char('v') => {
            state.view = match state.view {
                ViewId::Table => ViewId::TierBoard,
                ViewId::TierBoard => ViewId::Table,
            };
            None
        }

        // Raw JSON visibility
        KeyCode::Char('r') => {
            if state.has_results {
                state.show_raw = !state.show_raw;
            }
            None
        }

        // Search mode entry: only meaningful once results exist
        KeyCode::Char('/') => {
            if state.has_results {
                state.search_mode = true;
            }
            None
        }

        // Clear all filters
        KeyCode::Char('x') => {
            state.filter.clear();
            None
        }

        // Table sorting
        KeyCode::Char('1') => {
            set_sort(state, SortColumn::Card);
            None
        }
        KeyCode::Char('2') => {
            set_sort(state, SortColumn::Mechanic);
            None
        }
        KeyCode::Char('3') => {
            set_sort(state, SortColumn::Tier);
            None
        }

        // Filter chip cursor and toggling
        KeyCode::Left | KeyCode::Char('h') => {
            state.chip_cursor = state.chip_cursor.saturating_sub(1);
            None
        }
        KeyCode::Right | KeyCode::Char('l') => {
            let count = chip_list(state).len();
            if count > 0 && state.chip_cursor + 1 < count {
                state.chip_cursor += 1;
            }
            None
        }
        KeyCode::Char(' ') | KeyCode::Enter => {
            toggle_chip_at_cursor(state);
            None
        }

        // Card detail selection
        KeyCode::Char('n') | KeyCode::Down => {
            if !state.card_names.is_empty() {
                state.selected_card = (state.selected_card + 1) % state.card_names.len();
            }
            None
        }
        KeyCode::Char('p') | KeyCode::Up => {
            if !state.card_names.is_empty() {
                state.selected_card =
                    (state.selected_card + state.card_names.len() - 1) % state.card_names.len();
            }
            None
        }

        // Dismiss the error banner
        KeyCode::Esc => {
            state.dismiss_error();
            None
        }

        _ => None,
    }
}

/// Build the submit command from the editor fields, unless a submission is
/// already in flight.
fn submit_command(state: &mut ViewState) -> Option<UserCommand> {
    if state.loading {
        return None;
    }
    state.loading = true;
    state.dismiss_error();
    Some(UserCommand::Submit {
        card_data: state.card_data.clone(),
        access_code: state.access_code.clone(),
        mechanics: state.mechanics.clone(),
    })
}

/// Activate a sort column, toggling direction when it is already active.
fn set_sort(state: &mut ViewState, col: SortColumn) {
    if state.view != ViewId::Table {
        return;
    }
    if state.sort_col == col {
        state.sort_asc = !state.sort_asc;
    } else {
        state.sort_col = col;
        state.sort_asc = true;
    }
}

fn toggle_chip_at_cursor(state: &mut ViewState) {
    let chips = chip_list(state);
    let Some(chip) = chips.get(state.chip_cursor) else {
        return;
    };
    match &chip.kind {
        ChipKind::Mechanic(key) => {
            let key = key.clone();
            state.filter.toggle_mechanic(&key);
        }
        ChipKind::Tier(rank) => {
            let rank = *rank;
            state.filter.toggle_tier(rank);
        }
    }
}

/// Handle key events while editing a field.
///
/// Tab cycles the focused field; Esc leaves the editor. Enter inserts a
/// newline in the multi-line fields and leaves the editor from the
/// single-line access-code field.
fn handle_editor_mode(key_event: KeyEvent, state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Esc => {
            state.editing = false;
            None
        }
        KeyCode::Tab => {
            state.focus = match state.focus {
                InputFocus::CardData => InputFocus::AccessCode,
                InputFocus::AccessCode => InputFocus::Mechanics,
                InputFocus::Mechanics => InputFocus::CardData,
            };
            None
        }
        KeyCode::Enter => match state.focus {
            InputFocus::CardData => {
                state.card_data.push('\n');
                None
            }
            InputFocus::Mechanics => {
                state.mechanics.push('\n');
                None
            }
            InputFocus::AccessCode => {
                state.editing = false;
                None
            }
        },
        KeyCode::Backspace => {
            focused_field(state).pop();
            None
        }
        KeyCode::Char(c) => {
            focused_field(state).push(c);
            None
        }
        _ => None,
    }
}

fn focused_field(state: &mut ViewState) -> &mut String {
    match state.focus {
        InputFocus::CardData => &mut state.card_data,
        InputFocus::AccessCode => &mut state.access_code,
        InputFocus::Mechanics => &mut state.mechanics,
    }
}

/// Handle key events while in search mode.
///
/// Printable characters extend the search text; Backspace removes the last
/// character; Enter keeps the text and exits; Esc clears it and exits.
fn handle_search_mode(key_event: KeyEvent, state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Esc => {
            state.search_mode = false;
            state.filter.search.clear();
            None
        }
        KeyCode::Enter => {
            state.search_mode = false;
            None
        }
        KeyCode::Backspace => {
            state.filter.search.pop();
            None
        }
        KeyCode::Char(c) => {
            state.filter.search.push(c);
            None
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
