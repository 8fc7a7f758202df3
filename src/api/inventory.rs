use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use super::extract::ApiJson;
use super::AppState;
use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::inventory::csv::parse_inventory_csv;
use crate::metrics;
use crate::model::InventoryEntry;
use crate::store::StoreError;

#[derive(Deserialize)]
pub struct AddInventory {
    card_id: i64,
    #[serde(default)]
    count: Option<i32>,
}

#[derive(Serialize)]
pub struct ImportSummary {
    added: u64,
    skipped: u64,
}

pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Vec<InventoryEntry>>> {
    Ok(Json(state.store.list_inventory(user.user_id).await?))
}

pub async fn add(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(body): ApiJson<AddInventory>,
) -> ApiResult<Json<Value>> {
    let count = body.count.unwrap_or(1);
    if count < 1 {
        return Err(ApiError::Validation("count must be at least 1".into()));
    }
    if !state.store.card_exists(body.card_id).await? {
        return Err(ApiError::NotFound(format!("card {}", body.card_id)));
    }
    state
        .store
        .add_inventory(user.user_id, body.card_id, count)
        .await?;
    Ok(Json(json!({ "ok": true })))
}

/// Multipart upload with a `file` field holding `set_code,card_number,count`
/// lines. Unknown cards, malformed lines and lines whose count would overflow
/// the stored total are skipped, not fatal.
pub async fn import_csv(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> ApiResult<Json<ImportSummary>> {
    let mut content = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        if field.name() == Some("file") {
            let text = field
                .text()
                .await
                .map_err(|e| ApiError::BadRequest(format!("unreadable file field: {e}")))?;
            content = Some(text);
            break;
        }
    }
    let content = content.ok_or_else(|| ApiError::BadRequest("missing 'file' field".into()))?;

    let parsed = parse_inventory_csv(&content);
    let mut added = 0u64;
    let mut skipped = parsed.malformed;
    for line in &parsed.lines {
        match state
            .store
            .find_card_by_set_number(&line.set_code, &line.card_number)
            .await?
        {
            Some(card_id) => match state
                .store
                .add_inventory(user.user_id, card_id, line.count)
                .await
            {
                Ok(()) => added += 1,
                Err(StoreError::OutOfRange(msg)) => {
                    warn!(user_id = user.user_id, card_id, %msg, "csv line would overflow inventory count");
                    skipped += 1;
                }
                Err(e) => return Err(e.into()),
            },
            None => skipped += 1,
        }
    }

    metrics::record_csv_import(added, skipped);
    info!(user_id = user.user_id, added, skipped, "inventory csv import");
    Ok(Json(ImportSummary { added, skipped }))
}
