//! Staff group roster endpoints, manager-only.
//!
//! Users are added by username and removed by id. Adding an existing member
//! is idempotent; removing a user who is not in the group is a 404, not a
//! silent no-op.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use bistro_core::types::{StaffGroup, UserId};
use serde::Deserialize;
use tracing::instrument;

use crate::db::UserRepository;
use crate::error::ApiError;
use crate::middleware::RequireUser;
use crate::models::{CurrentUser, User};
use crate::policy::require_manager;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RosterAddPayload {
    pub username: Option<String>,
}

async fn list_group(
    current: &CurrentUser,
    state: &AppState,
    group: StaffGroup,
) -> Result<Json<Vec<User>>, ApiError> {
    require_manager(current)?;
    let members = UserRepository::new(state.pool()).list_in_group(group).await?;
    Ok(Json(members))
}

async fn add_to_group(
    current: &CurrentUser,
    state: &AppState,
    group: StaffGroup,
    payload: RosterAddPayload,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    require_manager(current)?;
    let username = payload.username.ok_or(ApiError::MissingField("username"))?;

    let repo = UserRepository::new(state.pool());
    let user = repo
        .get_by_username(&username)
        .await?
        .ok_or_else(ApiError::not_found)?;
    repo.add_to_group(user.id, group).await?;
    tracing::info!(user = %user.id, %group, "user added to group");

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": format!("{username} added to {group}")
        })),
    ))
}

async fn remove_from_group(
    current: &CurrentUser,
    state: &AppState,
    group: StaffGroup,
    user_id: i64,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_manager(current)?;

    let repo = UserRepository::new(state.pool());
    let user = repo
        .get_by_id(UserId::new(user_id))
        .await?
        .ok_or_else(ApiError::not_found)?;
    if !repo.remove_from_group(user.id, group).await? {
        // The user exists but is not a member.
        return Err(ApiError::not_found());
    }
    tracing::info!(user = %user.id, %group, "user removed from group");

    Ok(Json(serde_json::json!({
        "message": format!("{} removed from {group}", user.username)
    })))
}

#[instrument(skip(current, state))]
pub async fn list_managers(
    RequireUser(current): RequireUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<User>>, ApiError> {
    list_group(&current, &state, StaffGroup::Manager).await
}

#[instrument(skip(current, state, payload))]
pub async fn add_manager(
    RequireUser(current): RequireUser,
    State(state): State<AppState>,
    Json(payload): Json<RosterAddPayload>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    add_to_group(&current, &state, StaffGroup::Manager, payload).await
}

#[instrument(skip(current, state))]
pub async fn remove_manager(
    RequireUser(current): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    remove_from_group(&current, &state, StaffGroup::Manager, id).await
}

#[instrument(skip(current, state))]
pub async fn list_delivery_crew(
    RequireUser(current): RequireUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<User>>, ApiError> {
    list_group(&current, &state, StaffGroup::DeliveryCrew).await
}

#[instrument(skip(current, state, payload))]
pub async fn add_delivery_crew(
    RequireUser(current): RequireUser,
    State(state): State<AppState>,
    Json(payload): Json<RosterAddPayload>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    add_to_group(&current, &state, StaffGroup::DeliveryCrew, payload).await
}

#[instrument(skip(current, state))]
pub async fn remove_delivery_crew(
    RequireUser(current): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    remove_from_group(&current, &state, StaffGroup::DeliveryCrew, id).await
}
