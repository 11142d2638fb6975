//! Cart line repository.
//!
//! A cart is keyed by (user, menu item); writing an existing pair overwrites
//! the quantity and re-snapshots the menu item's current price. The price is
//! always read from `menu_items` inside the statement, never taken from the
//! caller.

use bistro_core::types::{CartLineId, MenuItemId, Money, UserId};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::RepositoryError;
use crate::models::CartLine;

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct CartLineRow {
    pub(crate) id: i64,
    pub(crate) menu_item_id: i64,
    pub(crate) quantity: i64,
    pub(crate) unit_price: String,
    pub(crate) created_at: DateTime<Utc>,
}

impl TryFrom<CartLineRow> for CartLine {
    type Error = RepositoryError;

    fn try_from(row: CartLineRow) -> Result<Self, Self::Error> {
        let unit_price = Money::from_db(&row.unit_price).map_err(|e| {
            RepositoryError::DataCorruption(format!("cart line {} unit price: {e}", row.id))
        })?;
        Ok(Self {
            id: CartLineId::new(row.id),
            menu_item: MenuItemId::new(row.menu_item_id),
            quantity: row.quantity,
            unit_price,
            created_at: row.created_at,
        })
    }
}

/// Repository for per-user cart lines.
pub struct CartRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CartRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// All cart lines for a user, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user: UserId) -> Result<Vec<CartLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartLineRow>(
            r"
            SELECT id, menu_item_id, quantity, unit_price, created_at
            FROM cart_items
            WHERE user_id = ?
            ORDER BY id
            ",
        )
        .bind(user.as_i64())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(CartLine::try_from).collect()
    }

    /// Insert or overwrite the line for (user, menu item).
    ///
    /// The unit price is snapshotted from the menu item's current price as
    /// part of the same statement. Returns `None` when the menu item does
    /// not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert(
        &self,
        user: UserId,
        menu_item: MenuItemId,
        quantity: i64,
    ) -> Result<Option<CartLine>, RepositoryError> {
        let row = sqlx::query_as::<_, CartLineRow>(
            r"
            INSERT INTO cart_items (user_id, menu_item_id, quantity, unit_price, created_at)
            SELECT ?, id, ?, price, ? FROM menu_items WHERE id = ?
            ON CONFLICT (user_id, menu_item_id) DO UPDATE
                SET quantity = excluded.quantity, unit_price = excluded.unit_price
            RETURNING id, menu_item_id, quantity, unit_price, created_at
            ",
        )
        .bind(user.as_i64())
        .bind(quantity)
        .bind(Utc::now())
        .bind(menu_item.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.map(CartLine::try_from).transpose()
    }

    /// Delete all of a user's cart lines, returning how many were removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear(&self, user: UserId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = ?")
            .bind(user.as_i64())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
