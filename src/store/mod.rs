//! # Storage
//! `Store` is the seam between the HTTP layer and persistence. `PgStore`
//! backs production; `MemoryStore` backs tests and database-less local runs.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{
    Card, Deck, DeckWithCards, Expansion, InventoryEntry, NewCard, NewExpansion, OwnedRow, User,
};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Value out of range: {0}")]
    OutOfRange(String),

    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Query execution error: {0}")]
    Query(sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            match db_err.code().as_deref() {
                // unique_violation
                Some("23505") => return StoreError::Conflict(db_err.message().to_string()),
                // foreign_key_violation
                Some("23503") => return StoreError::NotFound(db_err.message().to_string()),
                // numeric_value_out_of_range
                Some("22003") => return StoreError::OutOfRange(db_err.message().to_string()),
                _ => {}
            }
        }
        StoreError::Query(err)
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[async_trait]
pub trait Store: Send + Sync {
    // --- users ---
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<i64>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    // --- catalog ---
    async fn list_expansions(&self) -> Result<Vec<Expansion>>;
    /// Case-insensitive substring match on name; `None` lists everything.
    async fn search_cards(&self, query: Option<&str>) -> Result<Vec<Card>>;
    async fn card_exists(&self, card_id: i64) -> Result<bool>;
    async fn find_card_by_set_number(&self, set_code: &str, card_number: &str) -> Result<Option<i64>>;
    async fn upsert_expansion(&self, expansion: &NewExpansion) -> Result<i64>;
    /// Returns `None` when the card's `set_code` has no expansion.
    async fn upsert_card(&self, card: &NewCard) -> Result<Option<i64>>;

    // --- inventory ---
    async fn list_inventory(&self, user_id: i64) -> Result<Vec<InventoryEntry>>;
    /// Adds `count` to the user's existing count for the card. A sum past
    /// `i32::MAX` fails with `OutOfRange` and leaves the row unchanged.
    async fn add_inventory(&self, user_id: i64, card_id: i64, count: i32) -> Result<()>;
    /// Owned cards joined with metadata and stats, ordered by card id.
    async fn owned_cards(&self, user_id: i64) -> Result<Vec<OwnedRow>>;

    // --- decks ---
    /// Creates the deck and its card rows atomically.
    async fn create_deck(&self, user_id: i64, name: &str, cards: &[(i64, u32)]) -> Result<Deck>;
    async fn list_decks(&self, user_id: i64) -> Result<Vec<Deck>>;
    async fn get_deck(&self, user_id: i64, deck_id: i64) -> Result<Option<DeckWithCards>>;
}
