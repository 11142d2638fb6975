//! Order endpoints: role-scoped listing, checkout, and lifecycle updates.
//!
//! Listing, retrieve, and delete resolve orders through the caller's read
//! scope. PATCH instead looks the order up globally and applies the role
//! ladder from the order workflow: the delivery-crew branch is evaluated
//! before the manager branch, so a user in both groups gets crew semantics.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, Uri};
use bistro_core::types::{OrderId, OrderStatus, UserId};
use serde::Deserialize;
use tracing::instrument;

use crate::db::{OrderRepository, UserRepository};
use crate::db::orders::{OrderFilter, OrderOrdering, OrderSort};
use crate::error::ApiError;
use crate::middleware::RequireUser;
use crate::models::{CurrentUser, Order};
use crate::pagination::{Page, PageQuery, Paginated, paginate};
use crate::policy::order_scope;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<String>,
    pub delivery_crew: Option<String>,
    pub search: Option<String>,
    pub ordering: Option<String>,
    #[serde(flatten)]
    pub page: PageQuery,
}

fn parse_filter(query: &OrderListQuery) -> Result<OrderFilter, ApiError> {
    let status = query
        .status
        .as_ref()
        .map(|raw| {
            raw.parse::<i64>()
                .map(OrderStatus::new)
                .map_err(|_| ApiError::Validation("status must be an integer".to_owned()))
        })
        .transpose()?;

    let delivery_crew = query
        .delivery_crew
        .as_ref()
        .map(|raw| {
            raw.parse::<i64>()
                .map(UserId::new)
                .map_err(|_| ApiError::Validation("delivery_crew must be an integer".to_owned()))
        })
        .transpose()?;

    Ok(OrderFilter {
        status,
        delivery_crew,
        search: query.search.clone(),
    })
}

fn parse_ordering(raw: Option<&str>) -> Result<OrderOrdering, ApiError> {
    let Some(raw) = raw else {
        return Ok(OrderOrdering::default());
    };
    let (descending, field) = raw
        .strip_prefix('-')
        .map_or((false, raw), |rest| (true, rest));

    let field = match field {
        "created_at" => OrderSort::CreatedAt,
        "total" => OrderSort::Total,
        "status" => OrderSort::Status,
        _ => return Err(ApiError::Validation(format!("cannot order by {field}"))),
    };
    Ok(OrderOrdering { field, descending })
}

/// PATCH body. Unknown fields are ignored; the status value's range is
/// deliberately not validated.
#[derive(Debug, Deserialize)]
pub struct OrderPatch {
    pub status: Option<OrderStatus>,
    pub delivery_crew: Option<i64>,
}

#[instrument(skip(current, state))]
pub async fn list(
    RequireUser(current): RequireUser,
    State(state): State<AppState>,
    uri: Uri,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<Paginated<Order>>, ApiError> {
    let filter = parse_filter(&query)?;
    let ordering = parse_ordering(query.ordering.as_deref())?;
    let page = Page::resolve(&query.page)?;
    let scope = order_scope(&current);

    let repo = OrderRepository::new(state.pool());
    let count = repo.count(scope, &filter).await?;
    let orders = repo
        .list(scope, &filter, ordering, page.limit(), page.offset())
        .await?;

    Ok(Json(paginate(&uri, page, count, orders)?))
}

/// Checkout. The per-user lock is held across the whole transaction so a
/// duplicate concurrent request finds the cart already consumed instead of
/// producing a second order.
#[instrument(skip(current, state), fields(user = %current.id()))]
pub async fn create(
    RequireUser(current): RequireUser,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    let lock = state.checkout_lock(current.id());
    let _guard = lock.lock().await;

    let order = OrderRepository::new(state.pool()).checkout(current.id()).await?;
    tracing::info!(order = %order.id, total = %order.total, "order placed");

    Ok((StatusCode::CREATED, Json(order)))
}

#[instrument(skip(current, state))]
pub async fn retrieve(
    RequireUser(current): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Order>, ApiError> {
    let order = OrderRepository::new(state.pool())
        .get_in_scope(OrderId::new(id), order_scope(&current))
        .await?
        .ok_or_else(ApiError::not_found)?;
    Ok(Json(order))
}

#[instrument(skip(current, state, patch))]
pub async fn update(
    RequireUser(current): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<OrderPatch>,
) -> Result<Json<Order>, ApiError> {
    let repo = OrderRepository::new(state.pool());
    let order = repo
        .get(OrderId::new(id))
        .await?
        .ok_or_else(ApiError::not_found)?;

    let (status, delivery_crew) = apply_role_ladder(&current, &patch)?;
    if let Some(crew) = delivery_crew {
        UserRepository::new(state.pool())
            .get_by_id(crew)
            .await?
            .ok_or_else(ApiError::not_found)?;
    }

    let updated = repo.update_fields(order.id, status, delivery_crew).await?;
    Ok(Json(updated))
}

/// Role-dependent patch rules, re-evaluated from current membership on every
/// call. Returns the (status, delivery_crew) changes the actor may apply.
fn apply_role_ladder(
    current: &CurrentUser,
    patch: &OrderPatch,
) -> Result<(Option<OrderStatus>, Option<UserId>), ApiError> {
    if current.is_delivery_crew() {
        // Crew may only touch the status; other fields are ignored. Whether
        // this order is actually assigned to them is not checked.
        let status = patch.status.ok_or(ApiError::MissingField("status"))?;
        return Ok((Some(status), None));
    }
    if current.is_manager() {
        return Ok((patch.status, patch.delivery_crew.map(UserId::new)));
    }
    Err(ApiError::Forbidden)
}

#[instrument(skip(current, state))]
pub async fn destroy(
    RequireUser(current): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let repo = OrderRepository::new(state.pool());
    let order = repo
        .get_in_scope(OrderId::new(id), order_scope(&current))
        .await?
        .ok_or_else(ApiError::not_found)?;

    repo.delete(order.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
