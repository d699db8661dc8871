// Client-side filtering over the projected row set.
//
// Three independent predicates: selected mechanics, selected tier ranks,
// and a card-name search substring. OR within each category, AND across
// categories. Filtering is pure and order-preserving; the views re-apply
// it on every render without touching upstream state.

use std::collections::HashSet;

use crate::rows::Row;

/// User-selected filters. Cleared wholesale whenever new results arrive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    /// Selected mechanic keys (not display labels).
    pub mechanics: HashSet<String>,
    /// Selected tier ranks.
    pub tiers: HashSet<u8>,
    /// Search substring, matched case-insensitively against card names.
    pub search: String,
}

impl FilterState {
    /// Whether any filter would narrow the row set.
    pub fn is_active(&self) -> bool {
        !self.mechanics.is_empty() || !self.tiers.is_empty() || !self.search.trim().is_empty()
    }

    /// Reset every filter.
    pub fn clear(&mut self) {
        self.mechanics.clear();
        self.tiers.clear();
        self.search.clear();
    }

    pub fn toggle_mechanic(&mut self, key: &str) {
        if !self.mechanics.remove(key) {
            self.mechanics.insert(key.to_string());
        }
    }

    pub fn toggle_tier(&mut self, rank: u8) {
        if !self.tiers.remove(&rank) {
            self.tiers.insert(rank);
        }
    }

    /// Apply the filters to a row sequence.
    ///
    /// Returns the full sequence untouched when no filter is active.
    pub fn apply<'a>(&self, rows: &'a [Row]) -> Vec<&'a Row> {
        if !self.is_active() {
            return rows.iter().collect();
        }

        let search_lower = self.search.trim().to_lowercase();
        rows.iter()
            .filter(|row| {
                let mech_match =
                    self.mechanics.is_empty() || self.mechanics.contains(&row.mechanic);
                let tier_match = self.tiers.is_empty() || self.tiers.contains(&row.tier_rank);
                let search_match = search_lower.is_empty()
                    || row.card.to_lowercase().contains(&search_lower);
                mech_match && tier_match && search_match
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rows::{mechanic_label, tier_rank};

    fn row(card: &str, mechanic: &str, tier: &str) -> Row {
        Row {
            card: card.to_string(),
            mechanic: mechanic.to_string(),
            mechanic_label: mechanic_label(mechanic),
            tier: tier.to_string(),
            tier_rank: tier_rank(tier),
        }
    }

    fn sample_rows() -> Vec<Row> {
        vec![
            row("Sol Ring", "ramp", "S+"),
            row("Cultivate", "ramp", "A"),
            row("Mulldrifter", "card_advantage", "B"),
            row("Craterhoof Behemoth", "overrun", "S"),
        ]
    }

    #[test]
    fn inactive_filter_is_identity() {
        let rows = sample_rows();
        let state = FilterState::default();
        assert!(!state.is_active());
        let filtered = state.apply(&rows);
        assert_eq!(filtered.len(), rows.len());
        for (got, want) in filtered.iter().zip(rows.iter()) {
            assert_eq!(*got, want);
        }
    }

    #[test]
    fn whitespace_search_is_inactive() {
        let mut state = FilterState::default();
        state.search = "   ".to_string();
        assert!(!state.is_active());
    }

    #[test]
    fn mechanic_filter_or_within_category() {
        let rows = sample_rows();
        let mut state = FilterState::default();
        state.toggle_mechanic("ramp");
        state.toggle_mechanic("overrun");
        let filtered = state.apply(&rows);
        assert_eq!(filtered.len(), 3);
        assert!(filtered.iter().all(|r| r.mechanic != "card_advantage"));
    }

    #[test]
    fn tier_filter_matches_rank() {
        let rows = sample_rows();
        let mut state = FilterState::default();
        state.toggle_tier(0);
        state.toggle_tier(1);
        let filtered = state.apply(&rows);
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].card, "Sol Ring");
        assert_eq!(filtered[1].card, "Craterhoof Behemoth");
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let rows = sample_rows();
        let mut state = FilterState::default();
        state.search = "RING".to_string();
        let filtered = state.apply(&rows);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].card, "Sol Ring");
    }

    #[test]
    fn categories_combine_with_and() {
        let rows = sample_rows();
        let mut state = FilterState::default();
        state.toggle_mechanic("ramp");
        state.toggle_tier(2);
        let filtered = state.apply(&rows);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].card, "Cultivate");

        // Mechanic present but no row of that mechanic has the tier.
        state.toggle_tier(2);
        state.toggle_tier(3);
        let filtered = state.apply(&rows);
        assert!(filtered.is_empty());
    }

    #[test]
    fn apply_is_idempotent() {
        let rows = sample_rows();
        let mut state = FilterState::default();
        state.toggle_mechanic("ramp");
        let once: Vec<Row> = state.apply(&rows).into_iter().cloned().collect();
        let twice = state.apply(&once);
        assert_eq!(twice.len(), once.len());
        for (got, want) in twice.iter().zip(once.iter()) {
            assert_eq!(*got, want);
        }
    }

    #[test]
    fn clear_restores_identity() {
        let rows = sample_rows();
        let mut state = FilterState::default();
        state.toggle_mechanic("ramp");
        state.toggle_tier(4);
        state.search = "sol".to_string();
        assert!(state.is_active());
        state.clear();
        assert!(!state.is_active());
        assert_eq!(state.apply(&rows).len(), rows.len());
    }

    #[test]
    fn toggle_twice_removes_selection() {
        let mut state = FilterState::default();
        state.toggle_mechanic("ramp");
        state.toggle_mechanic("ramp");
        state.toggle_tier(3);
        state.toggle_tier(3);
        assert!(!state.is_active());
    }

    #[test]
    fn filter_preserves_row_order() {
        let rows = sample_rows();
        let mut state = FilterState::default();
        state.toggle_tier(0);
        state.toggle_tier(1);
        state.toggle_tier(2);
        let filtered = state.apply(&rows);
        let cards: Vec<&str> = filtered.iter().map(|r| r.card.as_str()).collect();
        assert_eq!(cards, vec!["Sol Ring", "Cultivate", "Craterhoof Behemoth"]);
    }
}
