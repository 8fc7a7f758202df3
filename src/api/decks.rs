use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::extract::ApiJson;
use super::AppState;
use crate::auth::AuthUser;
use crate::autobuild::{self, Format, TypeCounts};
use crate::error::{ApiError, ApiResult};
use crate::inventory::owned_pool;
use crate::metrics;
use crate::model::{Deck, DeckWithCards};

const DEFAULT_AUTO_DECK_NAME: &str = "Auto Deck";
const DEFAULT_FORMAT: &str = "Standard";

#[derive(Deserialize)]
pub struct CreateDeck {
    name: String,
}

#[derive(Serialize)]
pub struct Created {
    id: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct AutoBuildReq {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    format: Option<String>,
}

#[derive(Serialize)]
pub struct AutoBuildCard {
    card_id: i64,
    count: u32,
}

#[derive(Serialize)]
pub struct AutoBuildResp {
    deck_id: i64,
    name: String,
    format: Format,
    cards_added: usize,
    counts: TypeCounts,
    cards: Vec<AutoBuildCard>,
}

fn validate_name(name: &str) -> ApiResult<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::Validation("deck name must not be empty".into()));
    }
    Ok(name)
}

pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(body): ApiJson<CreateDeck>,
) -> ApiResult<Json<Created>> {
    let name = validate_name(&body.name)?;
    let deck = state.store.create_deck(user.user_id, name, &[]).await?;
    Ok(Json(Created { id: deck.id }))
}

pub async fn list(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<Vec<Deck>>> {
    Ok(Json(state.store.list_decks(user.user_id).await?))
}

pub async fn get(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<DeckWithCards>> {
    state
        .store
        .get_deck(user.user_id, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("deck {id}")))
}

/// Build a deck from the caller's inventory and persist it.
///
/// The body is optional; an empty body builds "Auto Deck" for Standard.
pub async fn auto_build(
    State(state): State<AppState>,
    user: AuthUser,
    body: Bytes,
) -> ApiResult<Json<AutoBuildResp>> {
    let req: AutoBuildReq = if body.iter().all(u8::is_ascii_whitespace) {
        AutoBuildReq::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::BadRequest(format!("invalid JSON body: {e}")))?
    };

    let name = match req.name.as_deref() {
        Some(n) => validate_name(n)?,
        None => DEFAULT_AUTO_DECK_NAME,
    };
    let format = req.format.as_deref().unwrap_or(DEFAULT_FORMAT);

    let rows = state.store.owned_cards(user.user_id).await?;
    let pool = owned_pool(&rows);
    let mut result = autobuild::auto_build(&pool, format, name);

    let card_counts = result.card_counts();
    let deck = state
        .store
        .create_deck(user.user_id, &result.deck_name, &card_counts)
        .await?;
    result.deck_id = Some(deck.id);

    metrics::record_auto_build(result.total_added);
    info!(
        user_id = user.user_id,
        deck_id = deck.id,
        format = ?result.format,
        pool = pool.len(),
        cards_added = result.total_added,
        "auto-built deck"
    );

    Ok(Json(AutoBuildResp {
        deck_id: deck.id,
        name: result.deck_name,
        format: result.format,
        cards_added: result.total_added,
        counts: result.counts,
        cards: card_counts
            .into_iter()
            .map(|(card_id, count)| AutoBuildCard { card_id, count })
            .collect(),
    }))
}
