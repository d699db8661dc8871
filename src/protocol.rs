// Shared message types between the app orchestrator and the TUI.
//
// The orchestrator pushes `UiUpdate`s; the TUI sends `UserCommand`s back.
// Both sides otherwise share no mutable state except the art cache inside
// the fetcher.

use crate::rows::{AnalysisResult, RowSet};

/// Which result view is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewId {
    Table,
    TierBoard,
}

/// Sortable table columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Card,
    Mechanic,
    Tier,
}

/// Everything the TUI needs when a new analysis lands: the parsed result,
/// the exact response pretty-printed for the raw view, and the projected
/// rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultsUpdate {
    pub result: AnalysisResult,
    pub raw_json: String,
    pub row_set: RowSet,
}

/// Updates pushed from the orchestrator to the TUI render loop.
#[derive(Debug, Clone, PartialEq)]
pub enum UiUpdate {
    /// A submission started (`true`) or finished (`false`).
    Loading(bool),
    /// A successful analysis replaced the current results.
    Results(Box<ResultsUpdate>),
    /// Default mechanics text fetched at startup.
    MechanicsLoaded(String),
    /// The default-mechanics endpoint could not be reached.
    MechanicsUnavailable,
    /// A user-facing error to show in the banner.
    Error(String),
    /// The server rejected the access code; the credential field should be
    /// focused so the user can correct it.
    AccessDenied(String),
    /// An art lookup finished for the given lower-cased card name.
    ArtResolved {
        card_key: String,
        url: Option<String>,
    },
}

/// Commands sent from the TUI to the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    /// Submit the editor contents for analysis.
    Submit {
        card_data: String,
        access_code: String,
        mechanics: String,
    },
    /// Request art for the given card names, in first-occurrence order.
    FetchArt(Vec<String>),
    Quit,
}
