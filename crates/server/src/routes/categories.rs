//! Category endpoints. Reads are public; writes are manager-only.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use bistro_core::types::{CategoryId, Slug, Title};
use serde::Deserialize;
use tracing::instrument;

use crate::db::CategoryRepository;
use crate::error::ApiError;
use crate::middleware::{MaybeUser, RequireUser};
use crate::models::Category;
use crate::policy::require_manager;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CategoryPayload {
    pub title: Option<String>,
    pub slug: Option<String>,
}

impl CategoryPayload {
    fn validate(self) -> Result<(Title, Slug), ApiError> {
        let title = self.title.ok_or(ApiError::MissingField("title"))?;
        let slug = self.slug.ok_or(ApiError::MissingField("slug"))?;

        let title =
            Title::parse_category(&title).map_err(|e| ApiError::Validation(e.to_string()))?;
        let slug = Slug::parse(&slug).map_err(|e| ApiError::Validation(e.to_string()))?;
        Ok((title, slug))
    }
}

#[instrument(skip(state))]
pub async fn list(
    MaybeUser(_): MaybeUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, ApiError> {
    let categories = CategoryRepository::new(state.pool()).list().await?;
    Ok(Json(categories))
}

#[instrument(skip(current, state, payload))]
pub async fn create(
    RequireUser(current): RequireUser,
    State(state): State<AppState>,
    Json(payload): Json<CategoryPayload>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    require_manager(&current)?;
    let (title, slug) = payload.validate()?;

    let category = CategoryRepository::new(state.pool()).create(&title, &slug).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

#[instrument(skip(current, state, payload))]
pub async fn update(
    RequireUser(current): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<CategoryPayload>,
) -> Result<Json<Category>, ApiError> {
    require_manager(&current)?;
    let (title, slug) = payload.validate()?;

    let category = CategoryRepository::new(state.pool())
        .update(CategoryId::new(id), &title, &slug)
        .await?;
    Ok(Json(category))
}

#[instrument(skip(current, state))]
pub async fn destroy(
    RequireUser(current): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    require_manager(&current)?;

    CategoryRepository::new(state.pool()).delete(CategoryId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
