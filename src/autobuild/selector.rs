//! Greedy single-pass selection over score-sorted candidates.

use std::collections::HashMap;

use super::{CardType, ChosenEntry, ScoredCard, TypeCounts};

/// Nominal deck size; also the hard ceiling on selected copies.
pub const DECK_SIZE: u32 = 60;

/// Per-type quota. The three quotas sum to `DECK_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionTarget {
    pub pokemon: u32,
    pub trainer: u32,
    pub energy: u32,
}

impl SelectionTarget {
    pub const DEFAULT: SelectionTarget = SelectionTarget {
        pokemon: 18,
        trainer: 30,
        energy: 12,
    };

    pub fn quota(&self, t: CardType) -> u32 {
        match t {
            CardType::Pokemon => self.pokemon,
            CardType::Trainer => self.trainer,
            CardType::Energy => self.energy,
        }
    }
}

/// Order candidates best-first. Ties on score go to the lower card id rather
/// than to input order, so the deck does not depend on how the inventory rows
/// were ordered. Equal score and id keep input order (the sort is stable).
pub fn rank(candidates: &mut [ScoredCard]) {
    candidates.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.card.card_id.cmp(&b.card.card_id))
    });
}

/// Walk the ranked candidates once, taking one copy per candidate while its
/// type quota, its copy limit and the deck ceiling all allow it.
pub fn select(
    mut candidates: Vec<ScoredCard>,
    target: &SelectionTarget,
) -> (Vec<ChosenEntry>, TypeCounts) {
    rank(&mut candidates);

    let mut counts = TypeCounts::default();
    let mut copies: HashMap<i64, u32> = HashMap::new();
    let mut chosen = Vec::with_capacity(candidates.len().min(DECK_SIZE as usize));

    for c in &candidates {
        let t = c.card.card_type;
        if counts.get(t) >= target.quota(t) {
            continue;
        }

        let have = copies.entry(c.card.card_id).or_insert(0);
        if *have >= c.card.copy_limit() {
            continue;
        }

        chosen.push(ChosenEntry {
            card_id: c.card.card_id,
            count: 1,
        });
        *have += 1;
        counts.bump(t);

        if counts.total() >= DECK_SIZE {
            break;
        }
    }

    (chosen, counts)
}
