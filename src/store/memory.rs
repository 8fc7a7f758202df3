use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use super::{Result, Store, StoreError};
use crate::model::{
    Card, Deck, DeckCard, DeckWithCards, Expansion, InventoryEntry, NewCard, NewExpansion,
    OwnedRow, User,
};

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    expansions: Vec<Expansion>,
    cards: Vec<Card>,
    // (user_id, card_id) -> count
    inventory: BTreeMap<(i64, i64), i32>,
    decks: Vec<Deck>,
    // (deck_id, card_id) -> count
    deck_cards: BTreeMap<(i64, i64), i32>,
    // card_id -> (times_in_decks, meta_win_rate)
    stats: HashMap<i64, (f64, f64)>,
    next_id: i64,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn card_name(&self, card_id: i64) -> String {
        self.cards
            .iter()
            .find(|c| c.id == card_id)
            .map(|c| c.name.clone())
            .unwrap_or_default()
    }
}

/// In-process store with the same observable behavior as `PgStore`.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Meta statistics are produced outside this service; this stands in for
    /// that pipeline in tests and local runs.
    pub fn set_card_stats(&self, card_id: i64, times_in_decks: f64, meta_win_rate: f64) {
        self.inner
            .lock()
            .stats
            .insert(card_id, (times_in_decks, meta_win_rate));
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<i64> {
        let mut g = self.inner.lock();
        if g.users.iter().any(|u| u.email == email) {
            return Err(StoreError::Conflict(format!("email '{email}' already registered")));
        }
        let id = g.next_id();
        g.users.push(User {
            id,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.inner.lock().users.iter().find(|u| u.email == email).cloned())
    }

    async fn list_expansions(&self) -> Result<Vec<Expansion>> {
        let mut out = self.inner.lock().expansions.clone();
        // release_date DESC NULLS LAST
        out.sort_by(|a, b| match (a.release_date, b.release_date) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.id.cmp(&b.id),
        });
        Ok(out)
    }

    async fn search_cards(&self, query: Option<&str>) -> Result<Vec<Card>> {
        let g = self.inner.lock();
        let needle = query.map(str::to_lowercase);
        let mut out = g
            .cards
            .iter()
            .filter(|c| match &needle {
                Some(n) => c.name.to_lowercase().contains(n.as_str()),
                None => true,
            })
            .cloned()
            .collect::<Vec<_>>();
        out.sort_by_key(|c| c.id);
        Ok(out)
    }

    async fn card_exists(&self, card_id: i64) -> Result<bool> {
        Ok(self.inner.lock().cards.iter().any(|c| c.id == card_id))
    }

    async fn find_card_by_set_number(&self, set_code: &str, card_number: &str) -> Result<Option<i64>> {
        let g = self.inner.lock();
        let Some(exp) = g.expansions.iter().find(|e| e.set_code == set_code) else {
            return Ok(None);
        };
        Ok(g
            .cards
            .iter()
            .find(|c| c.expansion_id == exp.id && c.card_number.as_deref() == Some(card_number))
            .map(|c| c.id))
    }

    async fn upsert_expansion(&self, e: &NewExpansion) -> Result<i64> {
        let mut g = self.inner.lock();
        if let Some(existing) = g.expansions.iter_mut().find(|x| x.set_code == e.set_code) {
            existing.name = e.name.clone();
            existing.series = e.series.clone();
            existing.release_date = e.release_date;
            existing.total_cards = e.total_cards;
            existing.official_url = e.official_url.clone();
            return Ok(existing.id);
        }
        let id = g.next_id();
        g.expansions.push(Expansion {
            id,
            name: e.name.clone(),
            series: e.series.clone(),
            set_code: e.set_code.clone(),
            release_date: e.release_date,
            total_cards: e.total_cards,
            official_url: e.official_url.clone(),
        });
        Ok(id)
    }

    async fn upsert_card(&self, c: &NewCard) -> Result<Option<i64>> {
        let mut g = self.inner.lock();
        let Some(expansion_id) = g
            .expansions
            .iter()
            .find(|e| e.set_code == c.set_code)
            .map(|e| e.id)
        else {
            return Ok(None);
        };

        let existing = g
            .cards
            .iter()
            .position(|x| {
                // NULL card numbers never collide, as under the UNIQUE constraint.
                x.expansion_id == expansion_id
                    && c.card_number.is_some()
                    && x.card_number == c.card_number
            });
        let id = match existing {
            Some(i) => g.cards[i].id,
            None => g.next_id(),
        };
        let row = Card {
            id,
            name: c.name.clone(),
            expansion_id,
            card_number: c.card_number.clone(),
            rarity: c.rarity.clone(),
            card_type: c.card_type.clone(),
            subtype: c.subtype.clone(),
            hp: c.hp,
            retreat_cost: c.retreat_cost,
            weakness: c.weakness.clone(),
            resistance: c.resistance.clone(),
            illustrator: c.illustrator.clone(),
            image_url: c.image_url.clone(),
            legal_standard: c.legal_standard,
            legal_expanded: c.legal_expanded,
            is_basic_energy: c.is_basic_energy,
        };
        match existing {
            Some(i) => g.cards[i] = row,
            None => g.cards.push(row),
        }
        Ok(Some(id))
    }

    async fn list_inventory(&self, user_id: i64) -> Result<Vec<InventoryEntry>> {
        let g = self.inner.lock();
        Ok(g.inventory
            .range((user_id, i64::MIN)..=(user_id, i64::MAX))
            .map(|(&(_, card_id), &count)| InventoryEntry {
                card_id,
                card_name: g.card_name(card_id),
                count,
            })
            .collect())
    }

    async fn add_inventory(&self, user_id: i64, card_id: i64, count: i32) -> Result<()> {
        let mut g = self.inner.lock();
        if !g.cards.iter().any(|c| c.id == card_id) {
            return Err(StoreError::NotFound(format!("card {card_id}")));
        }
        let slot = g.inventory.entry((user_id, card_id)).or_insert(0);
        *slot = slot.checked_add(count).ok_or_else(|| {
            StoreError::OutOfRange(format!("inventory count for card {card_id}"))
        })?;
        Ok(())
    }

    async fn owned_cards(&self, user_id: i64) -> Result<Vec<OwnedRow>> {
        let g = self.inner.lock();
        let mut out = Vec::new();
        for (&(_, card_id), &count) in g.inventory.range((user_id, i64::MIN)..=(user_id, i64::MAX)) {
            let Some(card) = g.cards.iter().find(|c| c.id == card_id) else {
                continue;
            };
            let stats = g.stats.get(&card_id).copied();
            out.push(OwnedRow {
                card_id,
                card_type: card.card_type.clone(),
                is_basic_energy: card.is_basic_energy,
                legal_standard: card.legal_standard,
                legal_expanded: card.legal_expanded,
                count,
                times_in_decks: stats.map(|s| s.0),
                meta_win_rate: stats.map(|s| s.1),
            });
        }
        Ok(out)
    }

    async fn create_deck(&self, user_id: i64, name: &str, cards: &[(i64, u32)]) -> Result<Deck> {
        let mut g = self.inner.lock();
        if let Some((missing, _)) = cards.iter().find(|(id, _)| !g.cards.iter().any(|c| c.id == *id)) {
            return Err(StoreError::NotFound(format!("card {missing}")));
        }
        let deck = Deck {
            id: g.next_id(),
            user_id,
            name: name.to_string(),
            created_at: Utc::now(),
        };
        for &(card_id, count) in cards {
            // last write wins on a repeated card
            g.deck_cards.insert((deck.id, card_id), count as i32);
        }
        g.decks.push(deck.clone());
        Ok(deck)
    }

    async fn list_decks(&self, user_id: i64) -> Result<Vec<Deck>> {
        Ok(self
            .inner
            .lock()
            .decks
            .iter()
            .filter(|d| d.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn get_deck(&self, user_id: i64, deck_id: i64) -> Result<Option<DeckWithCards>> {
        let g = self.inner.lock();
        let Some(deck) = g.decks.iter().find(|d| d.id == deck_id && d.user_id == user_id) else {
            return Ok(None);
        };
        let cards = g
            .deck_cards
            .range((deck_id, i64::MIN)..=(deck_id, i64::MAX))
            .map(|(&(_, card_id), &count)| DeckCard {
                card_id,
                card_name: g.card_name(card_id),
                count,
            })
            .collect();
        Ok(Some(DeckWithCards {
            deck: deck.clone(),
            cards,
        }))
    }
}
