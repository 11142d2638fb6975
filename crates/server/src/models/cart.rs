use bistro_core::types::{CartLineId, MenuItemId, Money};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One row of a customer's cart. `unit_price` is the snapshot taken when the
/// line was last written, not the menu item's live price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLine {
    pub id: CartLineId,
    pub menu_item: MenuItemId,
    pub quantity: i64,
    pub unit_price: Money,
    pub created_at: DateTime<Utc>,
}
