//! Desirability score for one owned card.
//!
//! score = W_FREQUENCY*times_in_decks + W_WIN_RATE*meta_win_rate + W_SYNERGY*synergy
//!
//! Missing or garbage signals count as 0 so a card without statistics still
//! ranks on its synergy bonus alone.

use super::{CardType, OwnedCard};

pub const W_FREQUENCY: f64 = 0.5;
pub const W_WIN_RATE: f64 = 0.3;
pub const W_SYNERGY: f64 = 0.2;

const TRAINER_BONUS: f64 = 0.15;
const BASIC_ENERGY_BONUS: f64 = 0.05;
const POKEMON_BONUS: f64 = 0.03;

/// An eligible card annotated with its score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCard {
    pub card: OwnedCard,
    pub score: f64,
}

/// Fixed role bonus. Types are disjoint so at most one rule fires.
pub fn synergy(card: &OwnedCard) -> f64 {
    match (card.card_type, card.is_basic_energy) {
        (CardType::Trainer, _) => TRAINER_BONUS,
        (CardType::Energy, true) => BASIC_ENERGY_BONUS,
        (CardType::Pokemon, false) => POKEMON_BONUS,
        _ => 0.0,
    }
}

pub fn score(card: &OwnedCard) -> f64 {
    W_FREQUENCY * sanitize_frequency(card.times_in_decks)
        + W_WIN_RATE * sanitize_win_rate(card.meta_win_rate)
        + W_SYNERGY * synergy(card)
}

/// Non-finite or negative → 0.
pub fn sanitize_frequency(x: f64) -> f64 {
    if x.is_finite() && x > 0.0 {
        x
    } else {
        0.0
    }
}

/// Non-finite → 0, then clamp into [0,1].
pub fn sanitize_win_rate(x: f64) -> f64 {
    if x.is_finite() {
        x.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autobuild::card;

    #[test]
    fn trainer_score_matches_weighted_formula() {
        let mut c = card(1, CardType::Trainer);
        c.times_in_decks = 10.0;
        c.meta_win_rate = 0.6;
        assert!((score(&c) - 5.21).abs() < 1e-9, "got {}", score(&c));
    }

    #[test]
    fn synergy_table() {
        let trainer = card(1, CardType::Trainer);
        let mut basic_energy = card(2, CardType::Energy);
        basic_energy.is_basic_energy = true;
        let special_energy = card(3, CardType::Energy);
        let pokemon = card(4, CardType::Pokemon);

        assert_eq!(synergy(&trainer), 0.15);
        assert_eq!(synergy(&basic_energy), 0.05);
        assert_eq!(synergy(&special_energy), 0.0);
        assert_eq!(synergy(&pokemon), 0.03);
    }

    #[test]
    fn missing_signals_degrade_to_synergy_only() {
        let mut c = card(1, CardType::Pokemon);
        c.times_in_decks = f64::NAN;
        c.meta_win_rate = f64::INFINITY;
        assert!((score(&c) - 0.2 * 0.03).abs() < 1e-12);

        c.times_in_decks = -3.0;
        c.meta_win_rate = 7.0;
        assert!((score(&c) - (0.3 + 0.2 * 0.03)).abs() < 1e-12);
    }
}
