//! Deck scoring against weight tables

use crate::core::FormatVariant;
use crate::loader::deck::ParsedCardEntry;
use crate::loader::table::WeightTable;
use serde::Serialize;

/// Weight breakdown for one deck entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredCard {
    pub quantity: u32,
    pub name: String,
    /// `unit_weight * quantity`; the commander counts once
    pub total_weight: i64,
    pub unit_weight: i64,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_commander: bool,
}

/// Aggregate score of a deck
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DeckScore {
    pub total_weight: i64,
    /// Descending by `total_weight`, ties in input order
    pub cards: Vec<ScoredCard>,
}

impl DeckScore {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn commander(&self) -> Option<&ScoredCard> {
        self.cards.iter().find(|c| c.is_commander)
    }
}

/// Score parsed entries
///
/// The last entry flagged as commander is weighted from `commander_table`
/// and counted once; every other entry uses its main-deck weight from
/// `main_table` times its quantity. Cards missing from a table weigh 0.
pub fn score_deck(
    entries: &[ParsedCardEntry],
    main_table: &WeightTable,
    commander_table: Option<&WeightTable>,
    format: FormatVariant,
) -> DeckScore {
    let commander_idx = entries.iter().rposition(|e| e.is_commander);

    let mut cards: Vec<ScoredCard> = entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            if Some(idx) == commander_idx {
                let unit_weight = commander_table
                    .and_then(|table| table.get(&entry.name))
                    .and_then(|record| record.commander_weight(format))
                    .unwrap_or(0);
                ScoredCard {
                    quantity: 1,
                    name: entry.name.clone(),
                    total_weight: unit_weight,
                    unit_weight,
                    is_commander: true,
                }
            } else {
                let unit_weight = main_table
                    .get(&entry.name)
                    .and_then(|record| record.main_deck_weight(format))
                    .unwrap_or(0);
                ScoredCard {
                    quantity: entry.quantity,
                    name: entry.name.clone(),
                    total_weight: unit_weight.saturating_mul(i64::from(entry.quantity)),
                    unit_weight,
                    is_commander: false,
                }
            }
        })
        .collect();

    // Weights saturate instead of wrapping
    let total_weight = cards
        .iter()
        .fold(0i64, |acc, c| acc.saturating_add(c.total_weight));
    // sort_by is stable
    cards.sort_by(|a, b| b.total_weight.cmp(&a.total_weight));

    DeckScore {
        total_weight,
        cards,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::WeightKey;
    use crate::loader::table::WeightRecord;

    fn tables() -> (WeightTable, WeightTable) {
        let main = WeightTable::from_records(
            "main",
            [
                WeightRecord::new("Mountain")
                    .with_weight(WeightKey::main_deck(FormatVariant::Historic), 1)
                    .with_weight(WeightKey::main_deck(FormatVariant::Standard), 2),
                WeightRecord::new("Swamp")
                    .with_weight(WeightKey::main_deck(FormatVariant::Historic), 1)
                    .with_weight(WeightKey::main_deck(FormatVariant::Standard), 0),
                WeightRecord::new("Sol Ring")
                    .with_weight(WeightKey::main_deck(FormatVariant::Historic), 3),
                WeightRecord::new("Niv-Mizzet, Parun")
                    .with_weight(WeightKey::main_deck(FormatVariant::Historic), 7),
            ],
        );
        let commander = WeightTable::from_records(
            "commander",
            [WeightRecord::new("Niv-Mizzet, Parun")
                .with_weight(WeightKey::commander(FormatVariant::Historic), 5)
                .with_weight(WeightKey::commander(FormatVariant::Standard), 4)],
        );
        (main, commander)
    }

    fn summary(score: &DeckScore) -> Vec<(&str, u32, i64, i64)> {
        score
            .cards
            .iter()
            .map(|c| (c.name.as_str(), c.quantity, c.total_weight, c.unit_weight))
            .collect()
    }

    #[test]
    fn test_commander_deck() {
        let (main, commander) = tables();
        let entries = vec![
            ParsedCardEntry::commander("Niv-Mizzet, Parun"),
            ParsedCardEntry::new("Mountain", 3),
            ParsedCardEntry::new("Swamp", 2),
        ];
        let score = score_deck(&entries, &main, Some(&commander), FormatVariant::Historic);
        assert_eq!(score.total_weight, 10);
        assert_eq!(
            summary(&score),
            vec![
                ("Niv-Mizzet, Parun", 1, 5, 5),
                ("Mountain", 3, 3, 1),
                ("Swamp", 2, 2, 1),
            ]
        );
        assert_eq!(score.commander().map(|c| c.name.as_str()), Some("Niv-Mizzet, Parun"));
    }

    #[test]
    fn test_format_selects_column() {
        let (main, commander) = tables();
        let entries = vec![
            ParsedCardEntry::commander("Niv-Mizzet, Parun"),
            ParsedCardEntry::new("Mountain", 3),
            ParsedCardEntry::new("Swamp", 2),
        ];
        let score = score_deck(&entries, &main, Some(&commander), FormatVariant::Standard);
        // 4 + 3*2 + 2*0
        assert_eq!(score.total_weight, 10);
        assert_eq!(score.cards[0].name, "Mountain");
        assert_eq!(score.cards[2].name, "Swamp");
    }

    #[test]
    fn test_unknown_cards_weigh_zero_but_stay() {
        let (main, _) = tables();
        let entries = vec![
            ParsedCardEntry::new("Nonexistent Card", 4),
            ParsedCardEntry::new("Sol Ring", 1),
        ];
        let score = score_deck(&entries, &main, None, FormatVariant::Historic);
        assert_eq!(score.total_weight, 3);
        assert_eq!(
            summary(&score),
            vec![("Sol Ring", 1, 3, 3), ("Nonexistent Card", 4, 0, 0)]
        );
    }

    #[test]
    fn test_missing_format_column_weighs_zero() {
        let (main, _) = tables();
        let entries = vec![ParsedCardEntry::new("Sol Ring", 2)];
        let score = score_deck(&entries, &main, None, FormatVariant::Standard);
        assert_eq!(score.total_weight, 0);
        assert_eq!(score.cards.len(), 1);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let (main, _) = tables();
        let entries = vec![
            ParsedCardEntry::new("Swamp", 3),
            ParsedCardEntry::new("Unknown A", 1),
            ParsedCardEntry::new("Mountain", 3),
            ParsedCardEntry::new("Unknown B", 1),
        ];
        let score = score_deck(&entries, &main, None, FormatVariant::Historic);
        let names: Vec<_> = score.cards.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Swamp", "Mountain", "Unknown A", "Unknown B"]);
    }

    #[test]
    fn test_commander_counted_once() {
        let (main, commander) = tables();
        let entries = vec![ParsedCardEntry {
            name: "Niv-Mizzet, Parun".to_string(),
            quantity: 4,
            is_commander: true,
        }];
        let score = score_deck(&entries, &main, Some(&commander), FormatVariant::Historic);
        assert_eq!(score.total_weight, 5);
        assert_eq!(score.cards[0].quantity, 1);
    }

    #[test]
    fn test_several_flagged_commanders_last_wins() {
        let (main, commander) = tables();
        let entries = vec![
            ParsedCardEntry::commander("Niv-Mizzet, Parun"),
            ParsedCardEntry::commander("Sol Ring"),
        ];
        let score = score_deck(&entries, &main, Some(&commander), FormatVariant::Historic);
        // Niv-Mizzet scores as a main-deck card (7), Sol Ring as commander (absent -> 0)
        assert_eq!(score.total_weight, 7);
        assert_eq!(score.commander().map(|c| c.name.as_str()), Some("Sol Ring"));
    }

    #[test]
    fn test_huge_quantities_saturate() {
        let key = WeightKey::main_deck(FormatVariant::Historic);
        let main = WeightTable::from_records(
            "main",
            [
                WeightRecord::new("Big").with_weight(key, 4_000_000_000),
                WeightRecord::new("Bigger").with_weight(key, i64::MAX),
                WeightRecord::new("Debt").with_weight(key, i64::MIN),
            ],
        );
        let entries = vec![
            ParsedCardEntry::new("Big", 4_000_000_000),
            ParsedCardEntry::new("Bigger", 1),
        ];
        let score = score_deck(&entries, &main, None, FormatVariant::Historic);
        assert_eq!(score.cards[0].total_weight, i64::MAX);
        assert_eq!(score.total_weight, i64::MAX);

        let score = score_deck(
            &[ParsedCardEntry::new("Debt", 2)],
            &main,
            None,
            FormatVariant::Historic,
        );
        assert_eq!(score.total_weight, i64::MIN);
    }

    #[test]
    fn test_empty_entries() {
        let (main, _) = tables();
        assert_eq!(score_deck(&[], &main, None, FormatVariant::Historic), DeckScore::empty());
    }
}
