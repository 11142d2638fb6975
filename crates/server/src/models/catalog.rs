use bistro_core::types::{CategoryId, MenuItemId, Money, Slug, Title};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub title: Title,
    pub slug: Slug,
}

/// Menu item as served by the API. `category` serializes as the bare
/// category id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub id: MenuItemId,
    pub title: Title,
    pub price: Money,
    pub inventory: i64,
    pub category: CategoryId,
    pub featured: bool,
}

/// Fully validated menu item payload, ready for insertion or replacement.
#[derive(Debug, Clone)]
pub struct NewMenuItem {
    pub title: Title,
    pub price: Money,
    pub inventory: i64,
    pub category: CategoryId,
    pub featured: bool,
}
