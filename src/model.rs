//! Rows and payloads shared by the storage layer and the HTTP handlers.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Expansion {
    pub id: i64,
    pub name: String,
    pub series: Option<String>,
    pub set_code: String,
    pub release_date: Option<NaiveDate>,
    pub total_cards: Option<i32>,
    pub official_url: Option<String>,
}

/// Catalog card. `card_type` is kept verbatim from the import; the deck
/// builder parses it into a closed enum when loading the owned pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Card {
    pub id: i64,
    pub name: String,
    pub expansion_id: i64,
    pub card_number: Option<String>,
    pub rarity: Option<String>,
    pub card_type: Option<String>,
    pub subtype: Option<String>,
    pub hp: Option<i32>,
    pub retreat_cost: Option<i32>,
    pub weakness: Option<String>,
    pub resistance: Option<String>,
    pub illustrator: Option<String>,
    pub image_url: Option<String>,
    pub legal_standard: bool,
    pub legal_expanded: bool,
    pub is_basic_energy: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct InventoryEntry {
    pub card_id: i64,
    pub card_name: String,
    pub count: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Deck {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct DeckCard {
    pub card_id: i64,
    pub card_name: String,
    pub count: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckWithCards {
    #[serde(flatten)]
    pub deck: Deck,
    pub cards: Vec<DeckCard>,
}

/// One inventory row joined with card metadata and meta statistics, as the
/// storage layer hands it to the deck builder.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct OwnedRow {
    pub card_id: i64,
    pub card_type: Option<String>,
    pub is_basic_energy: bool,
    pub legal_standard: bool,
    pub legal_expanded: bool,
    pub count: i32,
    pub times_in_decks: Option<f64>,
    pub meta_win_rate: Option<f64>,
}

/// Expansion record from a catalog dump.
#[derive(Debug, Clone, Deserialize)]
pub struct NewExpansion {
    pub name: String,
    #[serde(default)]
    pub series: Option<String>,
    pub set_code: String,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub total_cards: Option<i32>,
    #[serde(default)]
    pub official_url: Option<String>,
}

/// Card record from a catalog dump, keyed to its expansion by `set_code`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCard {
    pub name: String,
    pub set_code: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub card_number: Option<String>,
    #[serde(default)]
    pub rarity: Option<String>,
    #[serde(default)]
    pub card_type: Option<String>,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub hp: Option<i32>,
    #[serde(default)]
    pub retreat_cost: Option<i32>,
    #[serde(default)]
    pub weakness: Option<String>,
    #[serde(default)]
    pub resistance: Option<String>,
    #[serde(default)]
    pub illustrator: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "truthy")]
    pub legal_standard: bool,
    #[serde(default, deserialize_with = "truthy")]
    pub legal_expanded: bool,
    #[serde(default, deserialize_with = "truthy")]
    pub is_basic_energy: bool,
}

/// Dumps encode flags as bools, 0/1 or strings; anything "present and
/// non-empty" counts as true.
fn truthy<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    use serde_json::Value;
    Ok(match Value::deserialize(d)? {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|x| x != 0.0),
        Value::String(s) => !s.is_empty() && s != "0" && !s.eq_ignore_ascii_case("false"),
        Value::Null => false,
        Value::Array(_) | Value::Object(_) => true,
    })
}

/// Card numbers show up as "25", 25 or "TG05".
fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    use serde_json::Value;
    Ok(match Value::deserialize(d)? {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}
