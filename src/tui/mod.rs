// Terminal dashboard: view state, event loop, and frame rendering.
//
// The TUI owns a `ViewState` mirroring everything it needs to draw. The
// orchestrator pushes `UiUpdate` messages over an mpsc channel; the TUI
// applies them and re-renders at ~30 fps. Keyboard input either mutates
// `ViewState` locally (filters, sorting, view switching) or turns into a
// `UserCommand` for the orchestrator (submit, art requests, quit).

pub mod input;
pub mod layout;
pub mod widgets;

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::filter::FilterState;
use crate::protocol::{SortColumn, UiUpdate, UserCommand, ViewId};
use crate::rows::{AnalysisResult, RowSet};

use layout::{build_layout, AppLayout};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// How long an error banner stays up before it dismisses itself.
const BANNER_TTL: Duration = Duration::from_secs(5);

/// Placeholder mechanics description used when the default-mechanics
/// endpoint is unreachable.
const MECHANICS_FALLBACK: &str =
    "- ramp: Accelerates your mana production...\n- card_advantage: Net positive card advantage...";

/// Deck prefilled into the card-data field on startup.
const DEFAULT_CARDS: &str = "\
1 Adorned Pouncer
1 Angelic Cub
1 Arahbo, Roar of the World
1 Arahbo, the First Fang
1 Arcane Signet
1 Austere Command
1 Blackblade Reforged
1 Bloodforged Battle-Axe
1 Bronzehide Lion
1 Buried Ruin
1 Canopy Vista
1 Command Tower
1 Conjurer's Mantle
1 Dawn of a New Age
1 Enlightened Ascetic
1 Entish Restoration
1 Evolving Wilds
1 Felidar Cub
1 Felidar Retreat
1 Feline Sovereign
1 Fleecemane Lion
1 Folk Hero
11 Forest
1 Harvest Season
1 Herd Heirloom
1 Horn of the Mark
1 Hunter's Insight
1 Hunter's Prowess
1 Jazal Goldmane
1 Kaheera, the Orphanguard
1 Keen Sense
1 Keeper of Fables
1 King of the Pride
1 Krosan Verge
1 Kutzil, Malamet Exemplar
1 Leonin Relic-Warder
1 Leonin Skyhunter
1 Leonin Vanguard
1 Lion Sash
1 Loam Lion
1 Mirari's Wake
1 Mirri, Weatherlight Duelist
1 Mosswort Bridge
1 Myriad Landscape
1 Nissa's Pilgrimage
1 Patchwork Banner
1 Path of Ancestry
15 Plains
1 Qasali Ambusher
1 Qasali Pridemage
1 Qasali Slingers
1 Rampant Growth
1 Reprieve
1 Rogue's Passage
1 Rout
1 Sacred Cat
1 Savannah Lions
1 Scythe Leopard
1 Selesnya Sanctuary
1 Sixth Sense
1 Sol Ring
1 Soul's Majesty
1 Stalking Leonin
1 Steppe Lynx
1 Stirring Wildwood
1 Storm of Souls
1 Sword of the Animist
1 Sword of Vengeance
1 Terramorphic Expanse
1 Thought Vessel
1 Trained Caracal
1 Traverse the Outlands
1 White Sun's Zenith
1 Whitemane Lion
1 Wild Growth
1 Wily Bandar";

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// Which editor field has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFocus {
    CardData,
    AccessCode,
    Mechanics,
}

/// Art status for one card tile, keyed by lower-cased card name.
#[derive(Debug, Clone, PartialEq)]
pub enum ArtState {
    /// Requested, not yet resolved.
    Pending,
    /// Resolved: `Some(url)` or `None` for "no art".
    Resolved(Option<String>),
}

/// TUI-local state that mirrors the application state for rendering.
pub struct ViewState {
    // Editor panel.
    pub card_data: String,
    pub access_code: String,
    pub mechanics: String,
    pub mechanics_placeholder: Option<String>,
    pub focus: InputFocus,
    pub editing: bool,

    // Current results.
    pub has_results: bool,
    pub result: AnalysisResult,
    pub row_set: RowSet,
    pub raw_json: String,
    pub show_raw: bool,
    pub card_names: Vec<String>,
    pub selected_card: usize,

    // Filtering and view selection.
    pub filter: FilterState,
    pub search_mode: bool,
    pub chip_cursor: usize,
    pub view: ViewId,
    pub sort_col: SortColumn,
    pub sort_asc: bool,

    // Art tiles, keyed by lower-cased card name.
    pub art: HashMap<String, ArtState>,

    // Transient status.
    pub loading: bool,
    pub error: Option<String>,
    error_deadline: Option<Instant>,
}

impl ViewState {
    /// Fresh state with the editor prefilled: the default deck, plus the
    /// persisted access code if there is one.
    pub fn new(saved_access_code: Option<String>) -> Self {
        ViewState {
            card_data: DEFAULT_CARDS.to_string(),
            access_code: saved_access_code.unwrap_or_default(),
            mechanics: String::new(),
            mechanics_placeholder: None,
            focus: InputFocus::CardData,
            editing: false,
            has_results: false,
            result: AnalysisResult::default(),
            row_set: RowSet::default(),
            raw_json: String::new(),
            show_raw: false,
            card_names: Vec::new(),
            selected_card: 0,
            filter: FilterState::default(),
            search_mode: false,
            chip_cursor: 0,
            view: ViewId::TierBoard,
            sort_col: SortColumn::Tier,
            sort_asc: true,
            art: HashMap::new(),
            loading: false,
            error: None,
            error_deadline: None,
        }
    }

    /// Show an error in the banner; it auto-dismisses after `BANNER_TTL`.
    pub fn set_error(&mut self, message: String) {
        self.error = Some(message);
        self.error_deadline = Some(Instant::now() + BANNER_TTL);
    }

    /// Dismiss the banner immediately.
    pub fn dismiss_error(&mut self) {
        self.error = None;
        self.error_deadline = None;
    }

    /// Drop the banner once its deadline passes. Called on render ticks.
    pub fn expire_banner(&mut self) {
        if let Some(deadline) = self.error_deadline {
            if Instant::now() >= deadline {
                self.dismiss_error();
            }
        }
    }

    /// The filtered rows the active view is showing right now.
    pub fn filtered_rows(&self) -> Vec<&crate::rows::Row> {
        self.filter.apply(&self.row_set.rows)
    }
}

// ---------------------------------------------------------------------------
// UiUpdate processing
// ---------------------------------------------------------------------------

/// Apply a single UiUpdate to the ViewState.
pub fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::Loading(loading) => {
            state.loading = loading;
        }
        UiUpdate::Results(results) => {
            state.has_results = true;
            state.card_names = results.result.card_names();
            state.selected_card = 0;
            state.result = results.result;
            state.row_set = results.row_set;
            state.raw_json = results.raw_json;
            state.show_raw = false;
            // New results reset every piece of per-result view state.
            state.filter.clear();
            state.search_mode = false;
            state.chip_cursor = 0;
            state.sort_col = SortColumn::Tier;
            state.sort_asc = true;
            state.view = ViewId::TierBoard;
            state.art.clear();
            state.loading = false;
            state.dismiss_error();
        }
        UiUpdate::MechanicsLoaded(text) => {
            // Never clobber text the user already typed.
            if state.mechanics.is_empty() {
                state.mechanics = text;
            }
        }
        UiUpdate::MechanicsUnavailable => {
            state.mechanics_placeholder = Some(MECHANICS_FALLBACK.to_string());
        }
        UiUpdate::Error(message) => {
            state.loading = false;
            state.set_error(message);
        }
        UiUpdate::AccessDenied(message) => {
            state.loading = false;
            state.set_error(message);
            // Put the user straight into the credential field.
            state.focus = InputFocus::AccessCode;
            state.editing = true;
        }
        UiUpdate::ArtResolved { card_key, url } => {
            state.art.insert(card_key, ArtState::Resolved(url));
        }
    }
}

// ---------------------------------------------------------------------------
// Art requests
// ---------------------------------------------------------------------------

/// Card names the tier board is showing that have no art entry yet, in
/// first-occurrence order. Marks them pending so a name is requested at
/// most once per result set.
pub fn pending_art_requests(state: &mut ViewState) -> Vec<String> {
    if !state.has_results || state.show_raw || state.view != ViewId::TierBoard {
        return Vec::new();
    }

    let names: Vec<String> = {
        let filtered = state.filtered_rows();
        let mut seen = HashSet::new();
        filtered
            .iter()
            .filter(|row| seen.insert(row.card.to_lowercase()))
            .map(|row| row.card.clone())
            .collect()
    };

    let mut requests = Vec::new();
    for name in names {
        let key = name.to_lowercase();
        if !state.art.contains_key(&key) {
            state.art.insert(key, ArtState::Pending);
            requests.push(name);
        }
    }
    requests
}

async fn send_art_requests(state: &mut ViewState, cmd_tx: &mpsc::Sender<UserCommand>) {
    let requests = pending_art_requests(state);
    if !requests.is_empty() {
        let _ = cmd_tx.send(UserCommand::FetchArt(requests)).await;
    }
}

// ---------------------------------------------------------------------------
// Frame rendering
// ---------------------------------------------------------------------------

/// Render the complete frame.
fn render_frame(frame: &mut Frame, state: &ViewState) {
    let layout = build_layout(frame.area());

    render_status_bar(frame, &layout, state);
    render_banner(frame, &layout, state);
    widgets::editor::render(frame, layout.editor, state);
    widgets::filters::render(frame, layout.filters, state);

    if !state.has_results {
        render_empty_state(frame, &layout, state);
    } else if state.show_raw {
        widgets::raw_json::render(frame, layout.results, state);
    } else {
        match state.view {
            ViewId::Table => widgets::results_table::render(frame, layout.results, state),
            ViewId::TierBoard => widgets::tier_board::render(frame, layout.results, state),
        }
    }

    widgets::card_detail::render(frame, layout.detail, state);
    render_help_bar(frame, &layout);
}

fn render_status_bar(frame: &mut Frame, layout: &AppLayout, state: &ViewState) {
    let view_name = match state.view {
        ViewId::Table => "Table",
        ViewId::TierBoard => "Tier Board",
    };
    let mut text = format!(" mechtag | {view_name}");
    if state.has_results {
        text.push_str(&format!(
            " | {} rows across {} cards",
            state.row_set.rows.len(),
            state.card_names.len()
        ));
    }
    if state.loading {
        text.push_str(" | Analyzing...");
    }
    let paragraph = Paragraph::new(Line::from(Span::styled(
        text,
        Style::default().fg(Color::White),
    )))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, layout.status_bar);
}

fn render_banner(frame: &mut Frame, layout: &AppLayout, state: &ViewState) {
    let Some(message) = &state.error else {
        return;
    };
    let paragraph = Paragraph::new(Line::from(vec![
        Span::styled(
            format!(" {message} "),
            Style::default()
                .fg(Color::White)
                .bg(Color::Red)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            " (Esc to dismiss)",
            Style::default().fg(Color::Red).add_modifier(Modifier::DIM),
        ),
    ]));
    frame.render_widget(paragraph, layout.banner);
}

fn render_empty_state(frame: &mut Frame, layout: &AppLayout, state: &ViewState) {
    let text = if state.loading {
        "Analyzing deck..."
    } else {
        "Submit a deck to see its tagged mechanics."
    };
    let paragraph = Paragraph::new(text).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, layout.results);
}

fn render_help_bar(frame: &mut Frame, layout: &AppLayout) {
    let text =
        " q:Quit | e:Edit | s:Submit | v:View | /:Search | \u{2190}\u{2192}:Chips | Space:Toggle | x:Clear | r:Raw | n/p:Card";
    let paragraph = Paragraph::new(Line::from(Span::styled(
        text,
        Style::default().fg(Color::White).add_modifier(Modifier::DIM),
    )))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, layout.help_bar);
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI event loop.
///
/// Initializes the terminal, installs a panic hook that restores it, then
/// selects over UI updates, keyboard input, and render ticks until the
/// user quits or the update channel closes.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
    saved_access_code: Option<String>,
) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        // Best-effort terminal restoration before the default handler runs.
        let _ = ratatui::restore();
        original_hook(panic_info);
    }));

    let mut view_state = ViewState::new(saved_access_code);
    let mut event_stream = EventStream::new();

    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => {
                        apply_ui_update(&mut view_state, ui_update);
                        send_art_requests(&mut view_state, &cmd_tx).await;
                    }
                    None => break,
                }
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        match input::handle_key(key_event, &mut view_state) {
                            Some(UserCommand::Quit) => {
                                let _ = cmd_tx.send(UserCommand::Quit).await;
                                break;
                            }
                            Some(command) => {
                                let _ = cmd_tx.send(command).await;
                            }
                            None => {}
                        }
                        send_art_requests(&mut view_state, &cmd_tx).await;
                    }
                    Some(Ok(_)) => {
                        // Mouse and resize events need no handling; the next
                        // render tick redraws at the new size.
                    }
                    Some(Err(_)) | None => break,
                }
            }

            _ = render_tick.tick() => {
                view_state.expire_banner();
                terminal.draw(|frame| render_frame(frame, &view_state))?;
            }
        }
    }

    ratatui::restore();

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
