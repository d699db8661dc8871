// Application orchestration.
//
// The event loop between the TUI and the outside world: it validates and
// submits analyses, owns the access-code lifecycle, projects results into
// rows, and forwards art resolutions from the fetch queue back to the
// render loop. The TUI never talks to the network directly.

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::api::{ApiClient, ApiError};
use crate::art::ArtFetcher;
use crate::protocol::{ResultsUpdate, UiUpdate, UserCommand};
use crate::rows;
use crate::store::AccessCodeStore;

/// Message shown when the user submits without any card data. Checked
/// locally; no request is made.
const VALIDATION_NO_CARDS: &str = "Please enter card data.";

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// Everything the orchestrator owns.
pub struct AppState {
    pub api: ApiClient,
    pub art: ArtFetcher,
    pub store: AccessCodeStore,
}

impl AppState {
    pub fn new(api: ApiClient, art: ArtFetcher, store: AccessCodeStore) -> Self {
        AppState { api, art, store }
    }
}

// ---------------------------------------------------------------------------
// Event loop
// ---------------------------------------------------------------------------

/// Run the orchestrator until the command channel closes or `Quit` arrives.
///
/// On startup the default-mechanics text is fetched in the background so
/// the editor can be prefilled without delaying the first render.
pub async fn run(
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    ui_tx: mpsc::Sender<UiUpdate>,
    state: AppState,
) -> anyhow::Result<()> {
    spawn_mechanics_prefetch(state.api.clone(), ui_tx.clone());

    while let Some(command) = cmd_rx.recv().await {
        match command {
            UserCommand::Submit {
                card_data,
                access_code,
                mechanics,
            } => {
                handle_submit(&state, &ui_tx, &card_data, &access_code, &mechanics).await;
            }
            UserCommand::FetchArt(names) => {
                handle_fetch_art(&state, &ui_tx, names);
            }
            UserCommand::Quit => {
                info!("quit requested");
                break;
            }
        }
    }

    Ok(())
}

fn spawn_mechanics_prefetch(api: ApiClient, ui_tx: mpsc::Sender<UiUpdate>) {
    tokio::spawn(async move {
        match api.default_mechanics().await {
            Ok(text) => {
                let _ = ui_tx.send(UiUpdate::MechanicsLoaded(text)).await;
            }
            Err(e) => {
                warn!("failed to load default mechanics: {e}");
                let _ = ui_tx.send(UiUpdate::MechanicsUnavailable).await;
            }
        }
    });
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

async fn handle_submit(
    state: &AppState,
    ui_tx: &mpsc::Sender<UiUpdate>,
    card_data: &str,
    access_code: &str,
    mechanics: &str,
) {
    let card_data = card_data.trim();
    if card_data.is_empty() {
        let _ = ui_tx
            .send(UiUpdate::Error(VALIDATION_NO_CARDS.to_string()))
            .await;
        return;
    }

    let _ = ui_tx.send(UiUpdate::Loading(true)).await;

    let access_code = non_empty(access_code);
    let mechanics = non_empty(mechanics);
    let outcome = state
        .api
        .analyze(card_data, access_code.as_deref(), mechanics.as_deref())
        .await;

    let update = match outcome {
        Ok((result, raw_json)) => {
            // The code authenticated; remember it for next time.
            if let Some(code) = &access_code {
                state.store.save(code);
            }
            let row_set = rows::project(&result);
            info!(
                "analysis complete: {} cards, {} rows, {} without mechanics",
                result.cards().len(),
                row_set.rows.len(),
                row_set.no_mechanics_count
            );
            UiUpdate::Results(Box::new(ResultsUpdate {
                result,
                raw_json,
                row_set,
            }))
        }
        Err(err @ ApiError::AccessDenied { .. }) => {
            warn!("access denied; clearing stored access code");
            state.store.clear();
            UiUpdate::AccessDenied(err.to_string())
        }
        Err(err) => {
            warn!("analysis failed: {err}");
            UiUpdate::Error(err.to_string())
        }
    };

    let _ = ui_tx.send(update).await;
    let _ = ui_tx.send(UiUpdate::Loading(false)).await;
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// ---------------------------------------------------------------------------
// Art forwarding
// ---------------------------------------------------------------------------

/// Resolve a batch of card names sequentially so the queue sees them in
/// first-occurrence order, forwarding each answer as it lands. Stale
/// batches are harmless: a resolution for a card no longer visible updates
/// nothing.
fn handle_fetch_art(state: &AppState, ui_tx: &mpsc::Sender<UiUpdate>, names: Vec<String>) {
    if names.is_empty() {
        return;
    }
    let art = state.art.clone();
    let ui_tx = ui_tx.clone();
    tokio::spawn(async move {
        for name in names {
            let card_key = name.to_lowercase();
            let url = art.resolve(&name).await;
            if ui_tx
                .send(UiUpdate::ArtResolved { card_key, url })
                .await
                .is_err()
            {
                // Render loop gone; nothing left to update.
                return;
            }
        }
    });
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
