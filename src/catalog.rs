//! Bulk catalog import: expansions first (keyed by `set_code`), then cards
//! (keyed by expansion + card number). Re-running an import updates in place.

use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use tracing::{debug, info};

use crate::model::{NewCard, NewExpansion};
use crate::store::{Result, Store};

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub expansions: usize,
    pub cards: usize,
    /// Cards whose `set_code` matched no expansion.
    pub skipped_cards: usize,
}

pub async fn import_catalog(
    store: &dyn Store,
    sets: &[NewExpansion],
    cards: &[NewCard],
) -> Result<ImportReport> {
    let mut report = ImportReport::default();

    for set in sets {
        store.upsert_expansion(set).await?;
        report.expansions += 1;
    }

    for card in cards {
        match store.upsert_card(card).await? {
            Some(_) => report.cards += 1,
            None => {
                debug!(set_code = %card.set_code, name = %card.name, "no expansion for card");
                report.skipped_cards += 1;
            }
        }
    }

    info!(
        expansions = report.expansions,
        cards = report.cards,
        skipped = report.skipped_cards,
        "catalog import finished"
    );
    Ok(report)
}

/// Read a JSON array dump from disk.
pub fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("parsing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn sets() -> Vec<NewExpansion> {
        serde_json::from_value(serde_json::json!([
            { "name": "Scarlet & Violet", "series": "SV", "set_code": "SVI", "release_date": "2023-03-31" },
            { "name": "Paldea Evolved", "series": "SV", "set_code": "PAL" }
        ]))
        .unwrap()
    }

    fn cards() -> Vec<NewCard> {
        serde_json::from_value(serde_json::json!([
            { "name": "Sprigatito", "set_code": "SVI", "card_number": "13", "card_type": "Pokemon", "legal_standard": true },
            { "name": "Nest Ball", "set_code": "SVI", "card_number": "181", "card_type": "Trainer", "legal_standard": true, "legal_expanded": true },
            { "name": "Ghost", "set_code": "NOPE", "card_number": "1" }
        ]))
        .unwrap()
    }

    #[tokio::test]
    async fn imports_and_skips_orphans() {
        let store = MemoryStore::new();
        let report = import_catalog(&store, &sets(), &cards()).await.unwrap();
        assert_eq!(
            report,
            ImportReport { expansions: 2, cards: 2, skipped_cards: 1 }
        );
        assert_eq!(store.search_cards(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn reimport_is_idempotent() {
        let store = MemoryStore::new();
        import_catalog(&store, &sets(), &cards()).await.unwrap();
        import_catalog(&store, &sets(), &cards()).await.unwrap();
        assert_eq!(store.list_expansions().await.unwrap().len(), 2);
        assert_eq!(store.search_cards(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn expansions_list_newest_first_with_undated_last() {
        let store = MemoryStore::new();
        import_catalog(&store, &sets(), &[]).await.unwrap();
        let codes = store
            .list_expansions()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.set_code)
            .collect::<Vec<_>>();
        assert_eq!(codes, vec!["SVI", "PAL"]);
    }
}
