//! Cart endpoints. All of them operate on the caller's own cart.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use bistro_core::types::MenuItemId;
use serde::Deserialize;
use tracing::instrument;

use crate::db::CartRepository;
use crate::error::ApiError;
use crate::middleware::RequireUser;
use crate::models::CartLine;
use crate::state::AppState;

/// Add-to-cart payload. A client-sent price would be ignored, so the field
/// does not even exist here; the server snapshots the menu item's current
/// price itself.
#[derive(Debug, Deserialize)]
pub struct AddLinePayload {
    pub menu_item: Option<i64>,
    pub quantity: Option<i64>,
}

#[instrument(skip(current, state))]
pub async fn list(
    RequireUser(current): RequireUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<CartLine>>, ApiError> {
    let lines = CartRepository::new(state.pool()).list(current.id()).await?;
    Ok(Json(lines))
}

#[instrument(skip(current, state, payload))]
pub async fn add(
    RequireUser(current): RequireUser,
    State(state): State<AppState>,
    Json(payload): Json<AddLinePayload>,
) -> Result<(StatusCode, Json<CartLine>), ApiError> {
    let menu_item = payload
        .menu_item
        .ok_or(ApiError::MissingField("menu_item"))?;
    let quantity = payload.quantity.unwrap_or(1);
    if quantity < 1 {
        return Err(ApiError::Validation("quantity must be at least 1".to_owned()));
    }

    let line = CartRepository::new(state.pool())
        .upsert(current.id(), MenuItemId::new(menu_item), quantity)
        .await?
        .ok_or_else(|| ApiError::Validation("menu item does not exist".to_owned()))?;

    Ok((StatusCode::CREATED, Json(line)))
}

#[instrument(skip(current, state))]
pub async fn clear(
    RequireUser(current): RequireUser,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let removed = CartRepository::new(state.pool()).clear(current.id()).await?;
    Ok(Json(serde_json::json!({
        "message": format!("{removed} cart line(s) removed")
    })))
}
