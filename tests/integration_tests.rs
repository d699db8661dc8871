// Integration tests for mechtag.
//
// These tests exercise the full system end-to-end using the library
// crate's public API: the row projection and filter pipeline, both result
// views, the art-fetch queue, and the orchestrator loop against a mock
// analysis server.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::mpsc;

use mechtag::api::ApiClient;
use mechtag::app::{self, AppState};
use mechtag::art::{ArtFetcher, ArtLookup};
use mechtag::filter::FilterState;
use mechtag::protocol::{SortColumn, UiUpdate, UserCommand, ViewId};
use mechtag::rows::{self, AnalysisResult};
use mechtag::store::AccessCodeStore;
use mechtag::tui::widgets::results_table::sort_rows;
use mechtag::tui::widgets::tier_board::{distinct_cards, group_by_tier};
use mechtag::tui::{apply_ui_update, pending_art_requests, ViewState};

// ===========================================================================
// Test helpers
// ===========================================================================

fn analysis(value: serde_json::Value) -> AnalysisResult {
    AnalysisResult::from_value(&value).expect("test fixture must be a valid result")
}

/// The canonical two-card example: one tagged card, one untagged.
fn sol_ring_forest() -> AnalysisResult {
    analysis(json!({
        "Sol Ring": { "ramp": "S+" },
        "Forest": {}
    }))
}

struct CountingLookup {
    calls: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl ArtLookup for CountingLookup {
    async fn lookup(&self, card_name: &str) -> Option<String> {
        self.calls.lock().unwrap().push(card_name.to_string());
        if card_name == "Forest" {
            None
        } else {
            Some(format!("https://img.test/{}.jpg", card_name.to_lowercase()))
        }
    }
}

fn counting_fetcher() -> (ArtFetcher, Arc<Mutex<Vec<String>>>) {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let fetcher = ArtFetcher::spawn(
        CountingLookup {
            calls: Arc::clone(&calls),
        },
        Duration::from_millis(1),
    );
    (fetcher, calls)
}

fn temp_store(name: &str) -> AccessCodeStore {
    let path = std::env::temp_dir()
        .join(format!("mechtag-integration-{}-{name}", std::process::id()))
        .join("access_code");
    let _ = std::fs::remove_file(&path);
    AccessCodeStore::new(path)
}

/// Minimal HTTP server answering the default-mechanics prefetch and the
/// analyze endpoint with canned bodies.
async fn spawn_mock_server(analyze_status: &str, analyze_body: String) -> std::net::SocketAddr {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let analyze = format!(
        "HTTP/1.1 {analyze_status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{analyze_body}",
        analyze_body.len()
    );
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let mut buf = vec![0u8; 65536];
            let n = socket.read(&mut buf).await.unwrap_or(0);
            let request = String::from_utf8_lossy(&buf[..n]).to_string();
            let response = if request.contains("default-mechanics") {
                let body = r#"{"mechanics":"- ramp: stub"}"#;
                format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                )
            } else {
                analyze.clone()
            };
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.flush().await;
        }
    });
    addr
}

async fn recv_update(rx: &mut mpsc::Receiver<UiUpdate>) -> UiUpdate {
    loop {
        match rx.recv().await.expect("ui channel closed") {
            UiUpdate::MechanicsLoaded(_) | UiUpdate::MechanicsUnavailable => continue,
            other => return other,
        }
    }
}

// ===========================================================================
// Row projection properties
// ===========================================================================

#[test]
fn row_count_equals_sum_of_mechanic_map_sizes() {
    let result = analysis(json!({
        "Sol Ring": { "ramp": "S+" },
        "Mulldrifter": { "card_advantage": "A", "ramp": "C" },
        "Craterhoof Behemoth": { "overrun": "S", "go_wide": "A", "anthem": "B" },
        "Forest": {},
        "Island": {}
    }));
    let set = rows::project(&result);
    assert_eq!(set.rows.len(), 1 + 2 + 3);
    assert_eq!(set.no_mechanics_count, 2);
}

#[test]
fn tier_rank_mapping_is_case_and_suffix_insensitive() {
    assert_eq!(rows::tier_rank("S+"), 0);
    assert_eq!(rows::tier_rank("s"), 1);
    assert_eq!(rows::tier_rank("A-Tier"), 2);
    assert_eq!(rows::tier_rank("Z"), 6);
}

// ===========================================================================
// Filter evaluator properties
// ===========================================================================

#[test]
fn filter_is_idempotent_and_clearing_restores_everything() {
    let result = analysis(json!({
        "Sol Ring": { "ramp": "S+" },
        "Cultivate": { "ramp": "A" },
        "Mulldrifter": { "card_advantage": "B" }
    }));
    let set = rows::project(&result);

    let mut filter = FilterState::default();
    filter.toggle_mechanic("ramp");

    let once: Vec<_> = filter.apply(&set.rows).into_iter().cloned().collect();
    let twice: Vec<_> = filter.apply(&once).into_iter().cloned().collect();
    assert_eq!(once, twice);
    assert_eq!(once.len(), 2);

    filter.clear();
    assert_eq!(filter.apply(&set.rows).len(), set.rows.len());
}

// ===========================================================================
// The Sol Ring / Forest end-to-end scenario
// ===========================================================================

#[tokio::test]
async fn sol_ring_forest_flows_through_submission_and_both_views() {
    let body = r#"{"result":{"Sol Ring":{"ramp":"S+"},"Forest":{}}}"#;
    let addr = spawn_mock_server("200 OK", body.to_string()).await;

    let api = ApiClient::new(&format!("http://{addr}"), Duration::from_secs(5)).unwrap();
    let (fetcher, _calls) = counting_fetcher();
    let store = temp_store("e2e");
    let (cmd_tx, cmd_rx) = mpsc::channel(8);
    let (ui_tx, mut ui_rx) = mpsc::channel(32);
    let handle = tokio::spawn(app::run(cmd_rx, ui_tx, AppState::new(api, fetcher, store)));

    cmd_tx
        .send(UserCommand::Submit {
            card_data: "1 Sol Ring\n11 Forest".to_string(),
            access_code: String::new(),
            mechanics: String::new(),
        })
        .await
        .unwrap();

    assert_eq!(recv_update(&mut ui_rx).await, UiUpdate::Loading(true));
    let results = match recv_update(&mut ui_rx).await {
        UiUpdate::Results(update) => update,
        other => panic!("expected results, got: {other:?}"),
    };
    assert_eq!(recv_update(&mut ui_rx).await, UiUpdate::Loading(false));

    // Table view: exactly one row, Sol Ring / Ramp / S+.
    assert_eq!(results.row_set.rows.len(), 1);
    let row = &results.row_set.rows[0];
    assert_eq!(row.card, "Sol Ring");
    assert_eq!(row.mechanic_label, "Ramp");
    assert_eq!(row.tier, "S+");
    assert_eq!(row.tier_rank, 0);

    // The untagged-card note.
    assert_eq!(results.row_set.no_mechanics_count, 1);
    assert_eq!(
        rows::no_mechanics_note(results.row_set.no_mechanics_count),
        "1 card had no tagged mechanics"
    );

    // Tier board: a single S+ bucket with a single tile.
    let filter = FilterState::default();
    let filtered = filter.apply(&results.row_set.rows);
    let grouped = group_by_tier(&filtered);
    assert_eq!(grouped.len(), 1);
    assert_eq!(grouped[0].0.label, "S+");
    assert_eq!(grouped[0].1.len(), 1);

    // Art is requested once per distinct visible card.
    assert_eq!(distinct_cards(&filtered), vec!["Sol Ring"]);

    // Raw JSON view contains the exact input mapping.
    let reparsed: serde_json::Value = serde_json::from_str(&results.raw_json).unwrap();
    assert_eq!(reparsed, json!({ "Sol Ring": { "ramp": "S+" }, "Forest": {} }));

    cmd_tx.send(UserCommand::Quit).await.unwrap();
    handle.await.unwrap().unwrap();
}

#[test]
fn ramp_plus_a_tier_filter_yields_empty_with_filters_state() {
    let mut state = ViewState::new(None);
    let result = sol_ring_forest();
    let row_set = rows::project(&result);
    apply_ui_update(
        &mut state,
        UiUpdate::Results(Box::new(mechtag::protocol::ResultsUpdate {
            raw_json: "{}".to_string(),
            result,
            row_set,
        })),
    );

    state.filter.toggle_mechanic("ramp");
    state.filter.toggle_tier(2); // "A"

    let filtered = state.filtered_rows();
    assert!(filtered.is_empty());
    assert!(state.filter.is_active());

    // One clear restores the full row set.
    state.filter.clear();
    assert_eq!(state.filtered_rows().len(), 1);
}

// ===========================================================================
// View state machine
// ===========================================================================

#[test]
fn new_results_reset_filters_and_sort_and_switch_to_tier_board() {
    let mut state = ViewState::new(None);
    state.view = ViewId::Table;
    state.sort_col = SortColumn::Card;
    state.sort_asc = false;
    state.filter.toggle_tier(3);

    let result = sol_ring_forest();
    let row_set = rows::project(&result);
    apply_ui_update(
        &mut state,
        UiUpdate::Results(Box::new(mechtag::protocol::ResultsUpdate {
            raw_json: "{}".to_string(),
            result,
            row_set,
        })),
    );

    assert_eq!(state.view, ViewId::TierBoard);
    assert_eq!(state.sort_col, SortColumn::Tier);
    assert!(state.sort_asc);
    assert!(!state.filter.is_active());
}

#[test]
fn table_sort_is_stable_and_reverses() {
    let result = analysis(json!({
        "Banner": { "anthem": "A" },
        "Adornment": { "anthem": "A" },
        "Crown": { "anthem": "A" },
        "Sol Ring": { "ramp": "S+" }
    }));
    let set = rows::project(&result);
    let mut refs: Vec<_> = set.rows.iter().collect();

    sort_rows(&mut refs, SortColumn::Tier, true);
    let cards: Vec<&str> = refs.iter().map(|r| r.card.as_str()).collect();
    // S+ first; the three A-tier rows keep their input order.
    assert_eq!(cards, vec!["Sol Ring", "Banner", "Adornment", "Crown"]);

    sort_rows(&mut refs, SortColumn::Tier, false);
    let cards: Vec<&str> = refs.iter().map(|r| r.card.as_str()).collect();
    assert_eq!(cards, vec!["Banner", "Adornment", "Crown", "Sol Ring"]);
}

#[test]
fn tier_board_art_requests_are_deduplicated_across_tiles() {
    let mut state = ViewState::new(None);
    let result = analysis(json!({
        "Sol Ring": { "ramp": "S+", "card_advantage": "C" },
        "Cultivate": { "ramp": "A" }
    }));
    let row_set = rows::project(&result);
    apply_ui_update(
        &mut state,
        UiUpdate::Results(Box::new(mechtag::protocol::ResultsUpdate {
            raw_json: "{}".to_string(),
            result,
            row_set,
        })),
    );

    // Sol Ring spans two tiles but is requested once; a second pass
    // requests nothing.
    assert_eq!(pending_art_requests(&mut state), vec!["Sol Ring", "Cultivate"]);
    assert!(pending_art_requests(&mut state).is_empty());

    // A resolution lands on the shared key used by every tile of the card.
    apply_ui_update(
        &mut state,
        UiUpdate::ArtResolved {
            card_key: "sol ring".to_string(),
            url: Some("https://img.test/sol.jpg".to_string()),
        },
    );
    assert!(state.art.contains_key("sol ring"));
}

// ===========================================================================
// Fetch queue properties
// ===========================================================================

#[tokio::test]
async fn concurrent_resolves_share_one_network_call() {
    let (fetcher, calls) = counting_fetcher();

    let (a, b) = tokio::join!(fetcher.resolve("Sol Ring"), fetcher.resolve("Sol Ring"));
    assert_eq!(a, Some("https://img.test/sol ring.jpg".to_string()));
    assert_eq!(b, a);
    assert_eq!(calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn failed_lookup_is_terminal_for_the_session() {
    let (fetcher, calls) = counting_fetcher();

    assert_eq!(fetcher.resolve("Forest").await, None);
    assert_eq!(fetcher.resolve("Forest").await, None);
    assert_eq!(fetcher.resolve("forest").await, None);
    assert_eq!(calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn queue_services_distinct_names_in_order() {
    let (fetcher, calls) = counting_fetcher();

    let names = ["Alpha", "Beta", "Gamma", "Delta"];
    let mut handles = Vec::new();
    for name in names {
        let fetcher = fetcher.clone();
        handles.push(async move { fetcher.resolve(name).await });
    }
    let resolved = futures_util::future::join_all(handles).await;
    assert!(resolved.iter().all(|r| r.is_some()));

    let seen: Vec<String> = calls.lock().unwrap().clone();
    assert_eq!(seen, names);

    let unique: HashSet<&String> = seen.iter().collect();
    assert_eq!(unique.len(), names.len());
}

// ===========================================================================
// Error paths through the orchestrator
// ===========================================================================

#[tokio::test]
async fn denied_then_successful_submission_updates_the_store() {
    // First server rejects, second accepts.
    let denied_addr = spawn_mock_server(
        "403 Forbidden",
        r#"{"error":"Access denied: incorrect access code."}"#.to_string(),
    )
    .await;
    let store = temp_store("denied-then-ok");
    store.save("old-code");

    {
        let api = ApiClient::new(&format!("http://{denied_addr}"), Duration::from_secs(5)).unwrap();
        let (fetcher, _) = counting_fetcher();
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let (ui_tx, mut ui_rx) = mpsc::channel(32);
        let handle = tokio::spawn(app::run(
            cmd_rx,
            ui_tx,
            AppState::new(api, fetcher, store.clone()),
        ));

        cmd_tx
            .send(UserCommand::Submit {
                card_data: "1 Sol Ring".to_string(),
                access_code: "old-code".to_string(),
                mechanics: String::new(),
            })
            .await
            .unwrap();

        assert_eq!(recv_update(&mut ui_rx).await, UiUpdate::Loading(true));
        match recv_update(&mut ui_rx).await {
            UiUpdate::AccessDenied(message) => {
                assert_eq!(message, "Access denied: incorrect access code.")
            }
            other => panic!("expected access denied, got: {other:?}"),
        }
        assert_eq!(store.load(), None, "403 clears the persisted code");

        cmd_tx.send(UserCommand::Quit).await.unwrap();
        handle.await.unwrap().unwrap();
    }

    let ok_addr =
        spawn_mock_server("200 OK", r#"{"result":{"Sol Ring":{"ramp":"S+"}}}"#.to_string()).await;
    let api = ApiClient::new(&format!("http://{ok_addr}"), Duration::from_secs(5)).unwrap();
    let (fetcher, _) = counting_fetcher();
    let (cmd_tx, cmd_rx) = mpsc::channel(8);
    let (ui_tx, mut ui_rx) = mpsc::channel(32);
    let handle = tokio::spawn(app::run(
        cmd_rx,
        ui_tx,
        AppState::new(api, fetcher, store.clone()),
    ));

    cmd_tx
        .send(UserCommand::Submit {
            card_data: "1 Sol Ring".to_string(),
            access_code: "new-code".to_string(),
            mechanics: String::new(),
        })
        .await
        .unwrap();

    assert_eq!(recv_update(&mut ui_rx).await, UiUpdate::Loading(true));
    assert!(matches!(recv_update(&mut ui_rx).await, UiUpdate::Results(_)));
    assert_eq!(store.load(), Some("new-code".to_string()));

    store.clear();
    cmd_tx.send(UserCommand::Quit).await.unwrap();
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn string_result_that_is_not_json_surfaces_render_error() {
    let addr = spawn_mock_server(
        "200 OK",
        r#"{"result":"I could not tag this deck, sorry."}"#.to_string(),
    )
    .await;
    let api = ApiClient::new(&format!("http://{addr}"), Duration::from_secs(5)).unwrap();
    let (fetcher, _) = counting_fetcher();
    let store = temp_store("render-error");
    let (cmd_tx, cmd_rx) = mpsc::channel(8);
    let (ui_tx, mut ui_rx) = mpsc::channel(32);
    let handle = tokio::spawn(app::run(cmd_rx, ui_tx, AppState::new(api, fetcher, store)));

    cmd_tx
        .send(UserCommand::Submit {
            card_data: "1 Sol Ring".to_string(),
            access_code: String::new(),
            mechanics: String::new(),
        })
        .await
        .unwrap();

    assert_eq!(recv_update(&mut ui_rx).await, UiUpdate::Loading(true));
    match recv_update(&mut ui_rx).await {
        UiUpdate::Error(message) => {
            assert!(
                message.starts_with("Error rendering results: "),
                "unexpected message: {message}"
            );
        }
        other => panic!("expected error, got: {other:?}"),
    }

    cmd_tx.send(UserCommand::Quit).await.unwrap();
    handle.await.unwrap().unwrap();
}
