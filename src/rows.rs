// Analysis result model and flat row projection.
//
// The server returns a mapping of card name -> { mechanic -> tier }. The
// views never consume that mapping directly; they work on a flat, ordered
// sequence of rows (one per card/mechanic pair) produced here. Cards whose
// mechanic map is empty contribute no rows and are counted separately.

use serde_json::Value;

// ---------------------------------------------------------------------------
// Tier definitions
// ---------------------------------------------------------------------------

/// Rank assigned to tier labels that match none of the known tiers.
pub const FALLBACK_RANK: u8 = 6;

/// A displayable tier with its rank position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierDef {
    pub rank: u8,
    pub label: &'static str,
}

/// The displayable tiers, strongest first. Rank `FALLBACK_RANK` is
/// deliberately absent: unrecognized tiers sort last in the table but are
/// never given a board bucket of their own.
pub const TIER_DEFS: [TierDef; 6] = [
    TierDef { rank: 0, label: "S+" },
    TierDef { rank: 1, label: "S" },
    TierDef { rank: 2, label: "A" },
    TierDef { rank: 3, label: "B" },
    TierDef { rank: 4, label: "C" },
    TierDef { rank: 5, label: "D" },
];

/// Map a free-form tier label to its rank.
///
/// Matching is case-insensitive and tolerates a "Tier" suffix with an
/// optional space or hyphen before it ("A-Tier", "s tier"). Anything that
/// does not resolve to a known tier gets `FALLBACK_RANK`.
pub fn tier_rank(label: &str) -> u8 {
    let lower = label.to_lowercase();
    let mut t = lower.trim();
    if let Some(stripped) = t.strip_suffix("tier") {
        t = stripped.strip_suffix(['-', ' ']).unwrap_or(stripped).trim();
    }
    match t {
        "s+" => 0,
        "s" => 1,
        "a" => 2,
        "b" => 3,
        "c" => 4,
        "d" => 5,
        _ => FALLBACK_RANK,
    }
}

// ---------------------------------------------------------------------------
// Mechanic display labels
// ---------------------------------------------------------------------------

/// Display label for a mechanic key.
///
/// Known keys use their curated labels; unknown keys fall back to
/// snake_case -> Title Case.
pub fn mechanic_label(key: &str) -> String {
    match key {
        "ramp" => "Ramp".to_string(),
        "card_advantage" => "Card Advantage".to_string(),
        "targeted_disruption" => "Targeted Disruption".to_string(),
        "mass_disruption" => "Mass Disruption".to_string(),
        "go_wide" => "Go Wide".to_string(),
        "anthem" => "Anthem".to_string(),
        "overrun" => "Overrun".to_string(),
        other => title_case(other),
    }
}

fn title_case(key: &str) -> String {
    key.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// AnalysisResult
// ---------------------------------------------------------------------------

/// The parsed analysis response: card name -> ordered mechanic/tier pairs.
///
/// Entry order follows the server's JSON object order so that row order is
/// deterministic across views.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisResult {
    cards: Vec<(String, Vec<(String, String)>)>,
}

impl AnalysisResult {
    /// Validate a JSON value into an `AnalysisResult`.
    ///
    /// The expected shape is an object of objects with string values. The
    /// error string describes the first offending entry and is surfaced to
    /// the user as a render error.
    pub fn from_value(value: &Value) -> Result<Self, String> {
        let map = value
            .as_object()
            .ok_or_else(|| format!("expected an object of cards, got {}", type_name(value)))?;

        let mut cards = Vec::with_capacity(map.len());
        for (card, mechanics) in map {
            let mech_map = mechanics.as_object().ok_or_else(|| {
                format!(
                    "expected an object of mechanics for card \"{card}\", got {}",
                    type_name(mechanics)
                )
            })?;
            let mut entries = Vec::with_capacity(mech_map.len());
            for (mech, tier) in mech_map {
                let tier = tier.as_str().ok_or_else(|| {
                    format!(
                        "expected a tier string for \"{card}\" / \"{mech}\", got {}",
                        type_name(tier)
                    )
                })?;
                entries.push((mech.clone(), tier.to_string()));
            }
            cards.push((card.clone(), entries));
        }
        Ok(AnalysisResult { cards })
    }

    /// Card entries in server order.
    pub fn cards(&self) -> &[(String, Vec<(String, String)>)] {
        &self.cards
    }

    /// Mechanic/tier pairs for a single card, if present.
    pub fn get(&self, card: &str) -> Option<&[(String, String)]> {
        self.cards
            .iter()
            .find(|(name, _)| name == card)
            .map(|(_, mechanics)| mechanics.as_slice())
    }

    pub fn card_names(&self) -> Vec<String> {
        self.cards.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    #[cfg(test)]
    pub fn from_entries(entries: Vec<(&str, Vec<(&str, &str)>)>) -> Self {
        AnalysisResult {
            cards: entries
                .into_iter()
                .map(|(card, mechanics)| {
                    (
                        card.to_string(),
                        mechanics
                            .into_iter()
                            .map(|(m, t)| (m.to_string(), t.to_string()))
                            .collect(),
                    )
                })
                .collect(),
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ---------------------------------------------------------------------------
// Row projection
// ---------------------------------------------------------------------------

/// One (card, mechanic) pair, ready for filtering and display.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub card: String,
    pub mechanic: String,
    pub mechanic_label: String,
    pub tier: String,
    pub tier_rank: u8,
}

/// The flat projection of an `AnalysisResult`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    pub rows: Vec<Row>,
    pub no_mechanics_count: usize,
}

/// Flatten an analysis result into rows, preserving entry order.
pub fn project(result: &AnalysisResult) -> RowSet {
    let mut rows = Vec::new();
    let mut no_mechanics_count = 0;
    for (card, mechanics) in result.cards() {
        if mechanics.is_empty() {
            no_mechanics_count += 1;
            continue;
        }
        for (mech, tier) in mechanics {
            rows.push(Row {
                card: card.clone(),
                mechanic: mech.clone(),
                mechanic_label: mechanic_label(mech),
                tier: tier.clone(),
                tier_rank: tier_rank(tier),
            });
        }
    }
    RowSet {
        rows,
        no_mechanics_count,
    }
}

/// Per-mechanic row counts as (key, label, count), ordered by descending
/// count. Feeds the filter chips.
pub fn mechanic_counts(rows: &[Row]) -> Vec<(String, String, usize)> {
    let mut counts: Vec<(String, String, usize)> = Vec::new();
    for row in rows {
        match counts.iter_mut().find(|(key, _, _)| *key == row.mechanic) {
            Some((_, _, count)) => *count += 1,
            None => counts.push((row.mechanic.clone(), row.mechanic_label.clone(), 1)),
        }
    }
    counts.sort_by(|a, b| b.2.cmp(&a.2));
    counts
}

/// The note shown under both views when some cards had no tagged mechanics.
pub fn no_mechanics_note(count: usize) -> String {
    let plural = if count == 1 { "" } else { "s" };
    format!("{count} card{plural} had no tagged mechanics")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tier_rank_known_labels() {
        assert_eq!(tier_rank("S+"), 0);
        assert_eq!(tier_rank("S"), 1);
        assert_eq!(tier_rank("A"), 2);
        assert_eq!(tier_rank("B"), 3);
        assert_eq!(tier_rank("C"), 4);
        assert_eq!(tier_rank("D"), 5);
    }

    #[test]
    fn tier_rank_case_insensitive() {
        assert_eq!(tier_rank("s"), 1);
        assert_eq!(tier_rank("s+"), 0);
        assert_eq!(tier_rank("a"), 2);
    }

    #[test]
    fn tier_rank_strips_tier_suffix() {
        assert_eq!(tier_rank("A-Tier"), 2);
        assert_eq!(tier_rank("S+ Tier"), 0);
        assert_eq!(tier_rank("b tier"), 3);
        assert_eq!(tier_rank("CTier"), 4);
    }

    #[test]
    fn tier_rank_fallback() {
        assert_eq!(tier_rank("Z"), FALLBACK_RANK);
        assert_eq!(tier_rank(""), FALLBACK_RANK);
        assert_eq!(tier_rank("great"), FALLBACK_RANK);
        // "tier" alone strips down to nothing
        assert_eq!(tier_rank("Tier"), FALLBACK_RANK);
    }

    #[test]
    fn mechanic_label_known_keys() {
        assert_eq!(mechanic_label("ramp"), "Ramp");
        assert_eq!(mechanic_label("card_advantage"), "Card Advantage");
        assert_eq!(mechanic_label("go_wide"), "Go Wide");
    }

    #[test]
    fn mechanic_label_title_case_fallback() {
        assert_eq!(mechanic_label("token_generation"), "Token Generation");
        assert_eq!(mechanic_label("lifegain"), "Lifegain");
        assert_eq!(mechanic_label(""), "");
    }

    #[test]
    fn from_value_accepts_nested_string_maps() {
        let value = json!({
            "Sol Ring": { "ramp": "S+" },
            "Forest": {}
        });
        let result = AnalysisResult::from_value(&value).unwrap();
        assert_eq!(result.cards().len(), 2);
        assert_eq!(
            result.get("Sol Ring"),
            Some(&[("ramp".to_string(), "S+".to_string())][..])
        );
        assert_eq!(result.get("Forest"), Some(&[][..]));
        assert_eq!(result.get("Island"), None);
    }

    #[test]
    fn from_value_preserves_entry_order() {
        let value = json!({
            "Zebra": { "ramp": "A" },
            "Aardvark": { "ramp": "B" },
            "Mongoose": { "ramp": "C" }
        });
        let result = AnalysisResult::from_value(&value).unwrap();
        assert_eq!(result.card_names(), vec!["Zebra", "Aardvark", "Mongoose"]);
    }

    #[test]
    fn from_value_rejects_non_object() {
        let err = AnalysisResult::from_value(&json!([1, 2])).unwrap_err();
        assert!(err.contains("an array"), "unexpected message: {err}");
    }

    #[test]
    fn from_value_rejects_non_object_mechanics() {
        let err = AnalysisResult::from_value(&json!({ "Sol Ring": "S+" })).unwrap_err();
        assert!(err.contains("Sol Ring"), "unexpected message: {err}");
    }

    #[test]
    fn from_value_rejects_non_string_tier() {
        let err =
            AnalysisResult::from_value(&json!({ "Sol Ring": { "ramp": 1 } })).unwrap_err();
        assert!(err.contains("ramp"), "unexpected message: {err}");
        assert!(err.contains("a number"), "unexpected message: {err}");
    }

    #[test]
    fn project_row_count_matches_mechanic_entries() {
        let result = AnalysisResult::from_entries(vec![
            ("Sol Ring", vec![("ramp", "S+")]),
            ("Mulldrifter", vec![("card_advantage", "A"), ("ramp", "C")]),
            ("Forest", vec![]),
            ("Island", vec![]),
        ]);
        let set = project(&result);
        assert_eq!(set.rows.len(), 3);
        assert_eq!(set.no_mechanics_count, 2);
    }

    #[test]
    fn project_preserves_order_and_computes_fields() {
        let result = AnalysisResult::from_entries(vec![
            ("Craterhoof Behemoth", vec![("overrun", "S"), ("go_wide", "A-Tier")]),
            ("Sol Ring", vec![("ramp", "S+")]),
        ]);
        let set = project(&result);
        assert_eq!(set.rows[0].card, "Craterhoof Behemoth");
        assert_eq!(set.rows[0].mechanic_label, "Overrun");
        assert_eq!(set.rows[0].tier_rank, 1);
        assert_eq!(set.rows[1].tier, "A-Tier");
        assert_eq!(set.rows[1].tier_rank, 2);
        assert_eq!(set.rows[2].card, "Sol Ring");
        assert_eq!(set.rows[2].tier_rank, 0);
    }

    #[test]
    fn project_empty_result() {
        let set = project(&AnalysisResult::default());
        assert!(set.rows.is_empty());
        assert_eq!(set.no_mechanics_count, 0);
    }

    #[test]
    fn mechanic_counts_ordered_by_count_desc() {
        let result = AnalysisResult::from_entries(vec![
            ("A", vec![("ramp", "A")]),
            ("B", vec![("ramp", "B"), ("anthem", "A")]),
            ("C", vec![("ramp", "C"), ("anthem", "B"), ("overrun", "A")]),
        ]);
        let set = project(&result);
        let counts = mechanic_counts(&set.rows);
        assert_eq!(counts[0], ("ramp".to_string(), "Ramp".to_string(), 3));
        assert_eq!(counts[1], ("anthem".to_string(), "Anthem".to_string(), 2));
        assert_eq!(counts[2], ("overrun".to_string(), "Overrun".to_string(), 1));
    }

    #[test]
    fn no_mechanics_note_pluralizes() {
        assert_eq!(no_mechanics_note(1), "1 card had no tagged mechanics");
        assert_eq!(no_mechanics_note(3), "3 cards had no tagged mechanics");
    }
}
