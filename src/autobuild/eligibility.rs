use serde::{Deserialize, Serialize};

use super::OwnedCard;

/// Deck-legality ruleset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Format {
    Standard,
    Expanded,
}

impl Format {
    /// Only the exact string "Expanded" selects expanded rules; anything else
    /// (unknown names, other casings) falls back to Standard without error.
    pub fn parse(s: &str) -> Self {
        if s == "Expanded" {
            Format::Expanded
        } else {
            Format::Standard
        }
    }

    pub fn allows(self, card: &OwnedCard) -> bool {
        match self {
            Format::Expanded => card.legal_expanded,
            Format::Standard => card.legal_standard,
        }
    }
}

/// Keep the cards legal in `format`, preserving input order.
pub fn filter_eligible(cards: &[OwnedCard], format: Format) -> Vec<&OwnedCard> {
    cards.iter().filter(|c| format.allows(c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autobuild::{card, CardType};

    fn pool() -> Vec<OwnedCard> {
        let mut std_only = card(1, CardType::Pokemon);
        std_only.legal_expanded = false;
        let mut exp_only = card(2, CardType::Trainer);
        exp_only.legal_standard = false;
        let both = card(3, CardType::Energy);
        vec![std_only, exp_only, both]
    }

    fn ids(v: Vec<&OwnedCard>) -> Vec<i64> {
        v.into_iter().map(|c| c.card_id).collect()
    }

    #[test]
    fn expanded_uses_expanded_flag() {
        let p = pool();
        assert_eq!(ids(filter_eligible(&p, Format::parse("Expanded"))), vec![2, 3]);
    }

    #[test]
    fn standard_uses_standard_flag() {
        let p = pool();
        assert_eq!(ids(filter_eligible(&p, Format::parse("Standard"))), vec![1, 3]);
    }

    #[test]
    fn unknown_and_miscased_names_fall_back_to_standard() {
        assert_eq!(Format::parse("expanded"), Format::Standard);
        assert_eq!(Format::parse("Unlimited"), Format::Standard);
        assert_eq!(Format::parse(""), Format::Standard);
    }
}
