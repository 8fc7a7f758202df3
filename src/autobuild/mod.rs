//! # Deck Auto-Builder
//! Pure, testable logic that maps `(owned cards, format)` → a 60-card-shaped deck.
//! No I/O: the caller loads the owned pool and persists the result.
//!
//! Pipeline: eligibility filter → scoring → greedy selection → assembly.

pub mod eligibility;
pub mod scoring;
pub mod selector;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use eligibility::{filter_eligible, Format};
pub use scoring::{score, ScoredCard};
pub use selector::{select, SelectionTarget, DECK_SIZE};

/// Closed set of card types the builder understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardType {
    Pokemon,
    Trainer,
    Energy,
}

impl CardType {
    pub const ALL: [CardType; 3] = [CardType::Pokemon, CardType::Trainer, CardType::Energy];

    pub fn as_str(self) -> &'static str {
        match self {
            CardType::Pokemon => "Pokemon",
            CardType::Trainer => "Trainer",
            CardType::Energy => "Energy",
        }
    }
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCardType(pub String);

impl fmt::Display for UnknownCardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown card type '{}'", self.0)
    }
}

impl std::error::Error for UnknownCardType {}

impl FromStr for CardType {
    type Err = UnknownCardType;

    /// Catalog data is inconsistent about case and the accented "Pokémon".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pokemon" | "pokémon" => Ok(CardType::Pokemon),
            "trainer" => Ok(CardType::Trainer),
            "energy" => Ok(CardType::Energy),
            _ => Err(UnknownCardType(s.to_string())),
        }
    }
}

/// One owned card as seen by the builder.
///
/// The signals are read-only inputs computed elsewhere; the builder never
/// updates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnedCard {
    pub card_id: i64,
    pub card_type: CardType,
    pub is_basic_energy: bool,
    pub legal_standard: bool,
    pub legal_expanded: bool,
    #[serde(default)]
    pub times_in_decks: f64,
    #[serde(default)]
    pub meta_win_rate: f64,
}

impl OwnedCard {
    /// Copy limit for a single card in one deck.
    pub fn copy_limit(&self) -> u32 {
        copy_limit(self.is_basic_energy)
    }
}

/// Basic energy is effectively unlimited (bounded by deck size); everything
/// else is capped at four copies.
pub fn copy_limit(is_basic_energy: bool) -> u32 {
    if is_basic_energy {
        DECK_SIZE
    } else {
        4
    }
}

/// One step of the selector: a single copy of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChosenEntry {
    pub card_id: i64,
    pub count: u32,
}

/// Per-type totals of a selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeCounts {
    pub pokemon: u32,
    pub trainer: u32,
    pub energy: u32,
}

impl TypeCounts {
    pub fn get(&self, t: CardType) -> u32 {
        match t {
            CardType::Pokemon => self.pokemon,
            CardType::Trainer => self.trainer,
            CardType::Energy => self.energy,
        }
    }

    pub fn bump(&mut self, t: CardType) {
        match t {
            CardType::Pokemon => self.pokemon += 1,
            CardType::Trainer => self.trainer += 1,
            CardType::Energy => self.energy += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.pokemon + self.trainer + self.energy
    }
}

/// Output of one auto-build run, ready for the storage layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckAssemblyResult {
    /// Filled in by the caller once the deck row exists.
    pub deck_id: Option<i64>,
    pub deck_name: String,
    pub format: Format,
    pub chosen: Vec<ChosenEntry>,
    pub total_added: usize,
    pub counts: TypeCounts,
}

impl DeckAssemblyResult {
    /// Collapse repeated copies into `(card_id, count)` pairs, in order of
    /// first appearance. This is the shape the deck-card table stores.
    pub fn card_counts(&self) -> Vec<(i64, u32)> {
        let mut out: Vec<(i64, u32)> = Vec::new();
        for entry in &self.chosen {
            match out.iter_mut().find(|(id, _)| *id == entry.card_id) {
                Some((_, n)) => *n += entry.count,
                None => out.push((entry.card_id, entry.count)),
            }
        }
        out
    }
}

/// Run the full pipeline on an in-memory snapshot of a user's cards.
///
/// `deck_name` is carried through untouched; `deck_id` stays `None`.
pub fn auto_build(owned_cards: &[OwnedCard], format: &str, deck_name: &str) -> DeckAssemblyResult {
    let format = Format::parse(format);
    let scored = filter_eligible(owned_cards, format)
        .into_iter()
        .map(|c| ScoredCard {
            score: score(c),
            card: c.clone(),
        })
        .collect::<Vec<_>>();

    let (chosen, counts) = select(scored, &SelectionTarget::DEFAULT);

    DeckAssemblyResult {
        deck_id: None,
        deck_name: deck_name.to_string(),
        format,
        total_added: chosen.len(),
        chosen,
        counts,
    }
}

#[cfg(test)]
pub(crate) fn card(id: i64, card_type: CardType) -> OwnedCard {
    OwnedCard {
        card_id: id,
        card_type,
        is_basic_energy: false,
        legal_standard: true,
        legal_expanded: true,
        times_in_decks: 0.0,
        meta_win_rate: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_pool_builds_empty_deck() {
        let res = auto_build(&[], "Standard", "Empty");
        assert_eq!(res.total_added, 0);
        assert!(res.chosen.is_empty());
        assert_eq!(res.deck_id, None);
        assert_eq!(res.deck_name, "Empty");
    }

    #[test]
    fn undersized_trainer_pool_is_taken_whole() {
        let pool = (1..=5).map(|i| card(i, CardType::Trainer)).collect::<Vec<_>>();
        let res = auto_build(&pool, "Standard", "Trainers");
        assert_eq!(res.total_added, 5);
        let mut ids = res.chosen.iter().map(|e| e.card_id).collect::<Vec<_>>();
        ids.sort();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(res.counts.trainer, 5);
    }

    #[test]
    fn duplicate_entries_collapse_to_capped_count() {
        let pool = vec![card(7, CardType::Pokemon); 5];
        let res = auto_build(&pool, "Standard", "Dupes");
        assert_eq!(res.total_added, 4);
        assert_eq!(res.card_counts(), vec![(7, 4)]);
    }

    #[test]
    fn card_type_parsing_is_lenient_on_case_and_accent() {
        assert_eq!("Pokémon".parse::<CardType>(), Ok(CardType::Pokemon));
        assert_eq!(" trainer ".parse::<CardType>(), Ok(CardType::Trainer));
        assert_eq!("ENERGY".parse::<CardType>(), Ok(CardType::Energy));
        assert!("Stadium".parse::<CardType>().is_err());
    }

    #[test]
    fn card_counts_keeps_first_appearance_order() {
        let res = DeckAssemblyResult {
            deck_id: None,
            deck_name: "x".into(),
            format: Format::Standard,
            chosen: vec![
                ChosenEntry { card_id: 3, count: 1 },
                ChosenEntry { card_id: 1, count: 1 },
                ChosenEntry { card_id: 3, count: 1 },
            ],
            total_added: 3,
            counts: TypeCounts::default(),
        };
        assert_eq!(res.card_counts(), vec![(3, 2), (1, 1)]);
    }
}
