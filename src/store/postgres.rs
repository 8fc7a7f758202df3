use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{debug, info};

use super::{Result, Store, StoreError};
use crate::model::{
    Card, Deck, DeckCard, DeckWithCards, Expansion, InventoryEntry, NewCard, NewExpansion,
    OwnedRow, User,
};

const CARD_COLUMNS: &str = r#"
    id, name, expansion_id, card_number, rarity, card_type, subtype, hp,
    retreat_cost, weakness, resistance, illustrator, image_url,
    legal_standard, legal_expanded, is_basic_energy
"#;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool and check it with a round trip.
    pub async fn connect(database_url: &str) -> Result<Self> {
        info!("Initializing database connection pool");

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .idle_timeout(Duration::from_secs(60))
            .connect(database_url)
            .await
            .map_err(|e| StoreError::Connection(format!("Failed to create pool: {e}")))?;

        sqlx::query("SELECT 1")
            .execute(&pool)
            .await
            .map_err(|e| StoreError::Connection(format!("Failed to test connection: {e}")))?;

        info!("Database connection pool initialized");
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations applied");
        Ok(())
    }
}

/// Escape LIKE metacharacters so user input matches literally.
fn like_pattern(q: &str) -> String {
    let escaped = q
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[async_trait]
impl Store for PgStore {
    #[tracing::instrument(skip(self, password_hash))]
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO users (email, password_hash) VALUES ($1, $2) RETURNING id",
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;
        info!(user_id = id, "Created user");
        Ok(id)
    }

    #[tracing::instrument(skip(self))]
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    #[tracing::instrument(skip(self))]
    async fn list_expansions(&self) -> Result<Vec<Expansion>> {
        let rows = sqlx::query_as::<_, Expansion>(
            r#"
            SELECT id, name, series, set_code, release_date, total_cards, official_url
            FROM expansions
            ORDER BY release_date DESC NULLS LAST, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    #[tracing::instrument(skip(self))]
    async fn search_cards(&self, query: Option<&str>) -> Result<Vec<Card>> {
        let rows = match query {
            Some(q) => {
                sqlx::query_as::<_, Card>(&format!(
                    "SELECT {CARD_COLUMNS} FROM cards WHERE name ILIKE $1 ORDER BY id"
                ))
                .bind(like_pattern(q))
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Card>(&format!("SELECT {CARD_COLUMNS} FROM cards ORDER BY id"))
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        debug!(count = rows.len(), "Card search");
        Ok(rows)
    }

    async fn card_exists(&self, card_id: i64) -> Result<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM cards WHERE id = $1)")
                .bind(card_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn find_card_by_set_number(&self, set_code: &str, card_number: &str) -> Result<Option<i64>> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT c.id
            FROM cards c
            JOIN expansions e ON c.expansion_id = e.id
            WHERE e.set_code = $1 AND c.card_number = $2
            "#,
        )
        .bind(set_code)
        .bind(card_number)
        .fetch_optional(&self.pool)
        .await?;
        Ok(id)
    }

    #[tracing::instrument(skip(self, e), fields(set_code = %e.set_code))]
    async fn upsert_expansion(&self, e: &NewExpansion) -> Result<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO expansions (name, series, set_code, release_date, total_cards, official_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (set_code) DO UPDATE SET
                name = EXCLUDED.name,
                series = EXCLUDED.series,
                release_date = EXCLUDED.release_date,
                total_cards = EXCLUDED.total_cards,
                official_url = EXCLUDED.official_url
            RETURNING id
            "#,
        )
        .bind(&e.name)
        .bind(&e.series)
        .bind(&e.set_code)
        .bind(e.release_date)
        .bind(e.total_cards)
        .bind(&e.official_url)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    #[tracing::instrument(skip(self, c), fields(set_code = %c.set_code, name = %c.name))]
    async fn upsert_card(&self, c: &NewCard) -> Result<Option<i64>> {
        let Some(expansion_id) =
            sqlx::query_scalar::<_, i64>("SELECT id FROM expansions WHERE set_code = $1")
                .bind(&c.set_code)
                .fetch_optional(&self.pool)
                .await?
        else {
            return Ok(None);
        };

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO cards (name, expansion_id, card_number, rarity, card_type, subtype, hp,
                               retreat_cost, weakness, resistance, illustrator, image_url,
                               legal_standard, legal_expanded, is_basic_energy)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            ON CONFLICT (expansion_id, card_number) DO UPDATE SET
                name = EXCLUDED.name,
                rarity = EXCLUDED.rarity,
                card_type = EXCLUDED.card_type,
                subtype = EXCLUDED.subtype,
                hp = EXCLUDED.hp,
                retreat_cost = EXCLUDED.retreat_cost,
                weakness = EXCLUDED.weakness,
                resistance = EXCLUDED.resistance,
                illustrator = EXCLUDED.illustrator,
                image_url = EXCLUDED.image_url,
                legal_standard = EXCLUDED.legal_standard,
                legal_expanded = EXCLUDED.legal_expanded,
                is_basic_energy = EXCLUDED.is_basic_energy
            RETURNING id
            "#,
        )
        .bind(&c.name)
        .bind(expansion_id)
        .bind(&c.card_number)
        .bind(&c.rarity)
        .bind(&c.card_type)
        .bind(&c.subtype)
        .bind(c.hp)
        .bind(c.retreat_cost)
        .bind(&c.weakness)
        .bind(&c.resistance)
        .bind(&c.illustrator)
        .bind(&c.image_url)
        .bind(c.legal_standard)
        .bind(c.legal_expanded)
        .bind(c.is_basic_energy)
        .fetch_one(&self.pool)
        .await?;
        Ok(Some(id))
    }

    #[tracing::instrument(skip(self))]
    async fn list_inventory(&self, user_id: i64) -> Result<Vec<InventoryEntry>> {
        let rows = sqlx::query_as::<_, InventoryEntry>(
            r#"
            SELECT i.card_id, c.name AS card_name, i.count
            FROM inventory i
            JOIN cards c ON i.card_id = c.id
            WHERE i.user_id = $1
            ORDER BY i.card_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    #[tracing::instrument(skip(self))]
    async fn add_inventory(&self, user_id: i64, card_id: i64, count: i32) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO inventory (user_id, card_id, count)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, card_id) DO UPDATE SET count = inventory.count + EXCLUDED.count
            "#,
        )
        .bind(user_id)
        .bind(card_id)
        .bind(count)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn owned_cards(&self, user_id: i64) -> Result<Vec<OwnedRow>> {
        let rows = sqlx::query_as::<_, OwnedRow>(
            r#"
            SELECT c.id AS card_id, c.card_type, c.is_basic_energy,
                   c.legal_standard, c.legal_expanded, i.count,
                   s.times_in_decks, s.meta_win_rate
            FROM inventory i
            JOIN cards c ON i.card_id = c.id
            LEFT JOIN card_stats s ON s.card_id = c.id
            WHERE i.user_id = $1 AND i.count > 0
            ORDER BY c.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        info!("Loaded {} owned card rows for user {}", rows.len(), user_id);
        Ok(rows)
    }

    #[tracing::instrument(skip(self, cards), fields(cards = cards.len()))]
    async fn create_deck(&self, user_id: i64, name: &str, cards: &[(i64, u32)]) -> Result<Deck> {
        let mut tx = self.pool.begin().await?;

        let deck = sqlx::query_as::<_, Deck>(
            "INSERT INTO decks (user_id, name) VALUES ($1, $2) RETURNING id, user_id, name, created_at",
        )
        .bind(user_id)
        .bind(name)
        .fetch_one(&mut *tx)
        .await?;

        for &(card_id, count) in cards {
            sqlx::query(
                r#"
                INSERT INTO deck_cards (deck_id, card_id, count) VALUES ($1, $2, $3)
                ON CONFLICT (deck_id, card_id) DO UPDATE SET count = EXCLUDED.count
                "#,
            )
            .bind(deck.id)
            .bind(card_id)
            .bind(count as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        info!(deck_id = deck.id, "Created deck");
        Ok(deck)
    }

    #[tracing::instrument(skip(self))]
    async fn list_decks(&self, user_id: i64) -> Result<Vec<Deck>> {
        let rows = sqlx::query_as::<_, Deck>(
            "SELECT id, user_id, name, created_at FROM decks WHERE user_id = $1 ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    #[tracing::instrument(skip(self))]
    async fn get_deck(&self, user_id: i64, deck_id: i64) -> Result<Option<DeckWithCards>> {
        let Some(deck) = sqlx::query_as::<_, Deck>(
            "SELECT id, user_id, name, created_at FROM decks WHERE id = $1 AND user_id = $2",
        )
        .bind(deck_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let cards = sqlx::query_as::<_, DeckCard>(
            r#"
            SELECT dc.card_id, c.name AS card_name, dc.count
            FROM deck_cards dc
            JOIN cards c ON dc.card_id = c.id
            WHERE dc.deck_id = $1
            ORDER BY dc.card_id
            "#,
        )
        .bind(deck_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(DeckWithCards { deck, cards }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("pika"), "%pika%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
    }
}
