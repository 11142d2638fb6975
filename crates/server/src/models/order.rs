use bistro_core::types::{MenuItemId, Money, OrderId, OrderLineId, OrderStatus, UserId};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Immutable order line, copied from the cart at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLine {
    pub id: OrderLineId,
    pub menu_item: MenuItemId,
    pub quantity: i64,
    pub unit_price: Money,
}

/// Order header plus its lines. `user` and `delivery_crew` serialize as bare
/// user ids; `delivery_crew` is null until a manager assigns one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub user: UserId,
    pub delivery_crew: Option<UserId>,
    pub status: OrderStatus,
    pub total: Money,
    pub created_at: DateTime<Utc>,
    pub order_items: Vec<OrderLine>,
}
