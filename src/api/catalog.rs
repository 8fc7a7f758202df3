use axum::{
    extract::State,
    Json,
};
use serde::Deserialize;

use super::extract::ApiQuery;
use super::AppState;
use crate::error::ApiResult;
use crate::model::{Card, Expansion};

#[derive(Deserialize)]
pub struct CardQuery {
    #[serde(default)]
    q: Option<String>,
}

pub async fn list_expansions(State(state): State<AppState>) -> ApiResult<Json<Vec<Expansion>>> {
    Ok(Json(state.store.list_expansions().await?))
}

pub async fn search_cards(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CardQuery>,
) -> ApiResult<Json<Vec<Card>>> {
    let q = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty());
    Ok(Json(state.store.search_cards(q).await?))
}
