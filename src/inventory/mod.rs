//! Inventory helpers that sit between storage and the deck builder.

pub mod csv;

use tracing::warn;

use crate::autobuild::{copy_limit, CardType, OwnedCard};
use crate::model::OwnedRow;

/// Turn owned rows into the builder's candidate pool.
///
/// Each row yields one entry per owned copy, capped at the card's copy
/// limit, so the single-pass selector can take several copies of a card the
/// user actually owns several of. Rows with an unknown card type are dropped.
pub fn owned_pool(rows: &[OwnedRow]) -> Vec<OwnedCard> {
    let mut pool = Vec::new();
    for row in rows {
        let card_type = match row.card_type.as_deref().map(str::parse::<CardType>) {
            Some(Ok(t)) => t,
            Some(Err(e)) => {
                warn!(card_id = row.card_id, "skipping owned card: {}", e);
                continue;
            }
            None => {
                warn!(card_id = row.card_id, "skipping owned card without a type");
                continue;
            }
        };

        let copies = row.count.max(0) as u32;
        let copies = copies.min(copy_limit(row.is_basic_energy));
        let card = OwnedCard {
            card_id: row.card_id,
            card_type,
            is_basic_energy: row.is_basic_energy,
            legal_standard: row.legal_standard,
            legal_expanded: row.legal_expanded,
            times_in_decks: row.times_in_decks.unwrap_or(0.0),
            meta_win_rate: row.meta_win_rate.unwrap_or(0.0),
        };
        pool.extend(std::iter::repeat(card).take(copies as usize));
    }
    pool
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(card_id: i64, card_type: Option<&str>, count: i32, basic: bool) -> OwnedRow {
        OwnedRow {
            card_id,
            card_type: card_type.map(str::to_string),
            is_basic_energy: basic,
            legal_standard: true,
            legal_expanded: true,
            count,
            times_in_decks: None,
            meta_win_rate: Some(0.4),
        }
    }

    #[test]
    fn expands_copies_up_to_limit() {
        let pool = owned_pool(&[
            row(1, Some("Pokemon"), 7, false),
            row(2, Some("Energy"), 20, true),
            row(3, Some("Trainer"), 2, false),
        ]);
        let count = |id| pool.iter().filter(|c| c.card_id == id).count();
        assert_eq!(count(1), 4);
        assert_eq!(count(2), 20);
        assert_eq!(count(3), 2);
    }

    #[test]
    fn missing_stats_become_zero() {
        let pool = owned_pool(&[row(1, Some("Trainer"), 1, false)]);
        assert_eq!(pool[0].times_in_decks, 0.0);
        assert_eq!(pool[0].meta_win_rate, 0.4);
    }

    #[test]
    fn unknown_types_and_empty_rows_are_dropped() {
        let pool = owned_pool(&[
            row(1, Some("Stadium?"), 3, false),
            row(2, None, 3, false),
            row(3, Some("Pokemon"), 0, false),
        ]);
        assert!(pool.is_empty());
    }
}
