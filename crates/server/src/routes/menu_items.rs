//! Menu item endpoints. Reads are public; writes are manager-only.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, Uri};
use bistro_core::types::{CategoryId, MenuItemId, Money, Title};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use crate::db::MenuItemRepository;
use crate::db::catalog::{MenuItemFilter, MenuItemOrdering, MenuItemSort};
use crate::error::ApiError;
use crate::middleware::{MaybeUser, RequireUser};
use crate::models::{MenuItem, NewMenuItem};
use crate::pagination::{Page, PageQuery, Paginated, paginate};
use crate::policy::require_manager;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MenuItemListQuery {
    pub category: Option<String>,
    pub featured: Option<String>,
    pub search: Option<String>,
    pub ordering: Option<String>,
    #[serde(flatten)]
    pub page: PageQuery,
}

fn parse_filter(query: &MenuItemListQuery) -> Result<MenuItemFilter, ApiError> {
    let category = query
        .category
        .as_ref()
        .map(|raw| {
            raw.parse::<i64>()
                .map(CategoryId::new)
                .map_err(|_| ApiError::Validation("category must be an integer".to_owned()))
        })
        .transpose()?;

    let featured = query
        .featured
        .as_ref()
        .map(|raw| match raw.to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(ApiError::Validation("featured must be a boolean".to_owned())),
        })
        .transpose()?;

    Ok(MenuItemFilter {
        category,
        featured,
        search: query.search.clone(),
    })
}

fn parse_ordering(raw: Option<&str>) -> Result<MenuItemOrdering, ApiError> {
    let Some(raw) = raw else {
        return Ok(MenuItemOrdering::default());
    };
    let (descending, field) = raw
        .strip_prefix('-')
        .map_or((false, raw), |rest| (true, rest));

    let field = match field {
        "price" => MenuItemSort::Price,
        "title" => MenuItemSort::Title,
        "id" => MenuItemSort::Id,
        _ => {
            return Err(ApiError::Validation(format!(
                "cannot order by {field}"
            )));
        }
    };
    Ok(MenuItemOrdering { field, descending })
}

/// Patch-style payload shared by create, PUT, and PATCH. Create and PUT
/// require title, price, and category; PATCH takes any subset.
#[derive(Debug, Deserialize)]
pub struct MenuItemPayload {
    pub title: Option<String>,
    pub price: Option<Decimal>,
    pub inventory: Option<i64>,
    pub category: Option<i64>,
    pub featured: Option<bool>,
}

impl MenuItemPayload {
    fn validate_full(self) -> Result<NewMenuItem, ApiError> {
        let title = self.title.ok_or(ApiError::MissingField("title"))?;
        let price = self.price.ok_or(ApiError::MissingField("price"))?;
        let category = self.category.ok_or(ApiError::MissingField("category"))?;

        let inventory = self.inventory.unwrap_or(0);
        validate_inventory(inventory)?;

        Ok(NewMenuItem {
            title: parse_title(&title)?,
            price: parse_price(price)?,
            inventory,
            category: CategoryId::new(category),
            featured: self.featured.unwrap_or(false),
        })
    }

    fn merge_into(self, existing: MenuItem) -> Result<NewMenuItem, ApiError> {
        let title = match self.title {
            Some(raw) => parse_title(&raw)?,
            None => existing.title,
        };
        let price = match self.price {
            Some(raw) => parse_price(raw)?,
            None => existing.price,
        };
        let inventory = self.inventory.unwrap_or(existing.inventory);
        validate_inventory(inventory)?;

        Ok(NewMenuItem {
            title,
            price,
            inventory,
            category: self.category.map_or(existing.category, CategoryId::new),
            featured: self.featured.unwrap_or(existing.featured),
        })
    }
}

fn parse_title(raw: &str) -> Result<Title, ApiError> {
    Title::parse_menu_item(raw).map_err(|e| ApiError::Validation(e.to_string()))
}

fn parse_price(raw: Decimal) -> Result<Money, ApiError> {
    Money::parse(raw).map_err(|e| ApiError::Validation(e.to_string()))
}

fn validate_inventory(inventory: i64) -> Result<(), ApiError> {
    if inventory < 0 {
        return Err(ApiError::Validation("inventory cannot be negative".to_owned()));
    }
    Ok(())
}

#[instrument(skip(state))]
pub async fn list(
    MaybeUser(_): MaybeUser,
    State(state): State<AppState>,
    uri: Uri,
    Query(query): Query<MenuItemListQuery>,
) -> Result<Json<Paginated<MenuItem>>, ApiError> {
    let filter = parse_filter(&query)?;
    let ordering = parse_ordering(query.ordering.as_deref())?;
    let page = Page::resolve(&query.page)?;

    let repo = MenuItemRepository::new(state.pool());
    let count = repo.count(&filter).await?;
    let items = repo.list(&filter, ordering, page.limit(), page.offset()).await?;

    Ok(Json(paginate(&uri, page, count, items)?))
}

#[instrument(skip(state))]
pub async fn retrieve(
    MaybeUser(_): MaybeUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MenuItem>, ApiError> {
    let item = MenuItemRepository::new(state.pool())
        .get(MenuItemId::new(id))
        .await?
        .ok_or_else(ApiError::not_found)?;
    Ok(Json(item))
}

#[instrument(skip(current, state, payload))]
pub async fn create(
    RequireUser(current): RequireUser,
    State(state): State<AppState>,
    Json(payload): Json<MenuItemPayload>,
) -> Result<(StatusCode, Json<MenuItem>), ApiError> {
    require_manager(&current)?;
    let item = payload.validate_full()?;

    let created = MenuItemRepository::new(state.pool()).create(&item).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[instrument(skip(current, state, payload))]
pub async fn replace(
    RequireUser(current): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<MenuItemPayload>,
) -> Result<Json<MenuItem>, ApiError> {
    require_manager(&current)?;
    let item = payload.validate_full()?;

    let updated = MenuItemRepository::new(state.pool())
        .update(MenuItemId::new(id), &item)
        .await?;
    Ok(Json(updated))
}

#[instrument(skip(current, state, payload))]
pub async fn partial_update(
    RequireUser(current): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<MenuItemPayload>,
) -> Result<Json<MenuItem>, ApiError> {
    require_manager(&current)?;

    let repo = MenuItemRepository::new(state.pool());
    let existing = repo
        .get(MenuItemId::new(id))
        .await?
        .ok_or_else(ApiError::not_found)?;
    let item = payload.merge_into(existing)?;

    let updated = repo.update(MenuItemId::new(id), &item).await?;
    Ok(Json(updated))
}

#[instrument(skip(current, state))]
pub async fn destroy(
    RequireUser(current): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    require_manager(&current)?;

    MenuItemRepository::new(state.pool()).delete(MenuItemId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ordering() {
        let ordering = parse_ordering(Some("-price")).unwrap();
        assert_eq!(ordering.field, MenuItemSort::Price);
        assert!(ordering.descending);

        let ordering = parse_ordering(Some("title")).unwrap();
        assert_eq!(ordering.field, MenuItemSort::Title);
        assert!(!ordering.descending);

        let ordering = parse_ordering(None).unwrap();
        assert_eq!(ordering.field, MenuItemSort::Id);

        assert!(parse_ordering(Some("inventory")).is_err());
    }

    #[test]
    fn test_parse_filter_featured() {
        let query = MenuItemListQuery {
            category: None,
            featured: Some("True".to_owned()),
            search: None,
            ordering: None,
            page: PageQuery::default(),
        };
        assert_eq!(parse_filter(&query).unwrap().featured, Some(true));

        let query = MenuItemListQuery {
            featured: Some("maybe".to_owned()),
            category: None,
            search: None,
            ordering: None,
            page: PageQuery::default(),
        };
        assert!(parse_filter(&query).is_err());
    }

    #[test]
    fn test_full_payload_requires_fields() {
        let payload = MenuItemPayload {
            title: Some("Pasta".to_owned()),
            price: None,
            inventory: None,
            category: Some(1),
            featured: None,
        };
        assert!(matches!(
            payload.validate_full(),
            Err(ApiError::MissingField("price"))
        ));
    }

    #[test]
    fn test_negative_price_rejected() {
        let payload = MenuItemPayload {
            title: Some("Pasta".to_owned()),
            price: Some(Decimal::from(-1)),
            inventory: Some(0),
            category: Some(1),
            featured: None,
        };
        assert!(matches!(
            payload.validate_full(),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn test_negative_inventory_rejected() {
        let payload = MenuItemPayload {
            title: Some("Pasta".to_owned()),
            price: Some(Decimal::ONE),
            inventory: Some(-5),
            category: Some(1),
            featured: None,
        };
        assert!(matches!(
            payload.validate_full(),
            Err(ApiError::Validation(_))
        ));
    }
}
