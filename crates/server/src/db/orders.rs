//! Order repository: checkout, scoped listing, and lifecycle updates.
//!
//! Checkout is the only multi-statement mutation in the system. It runs in
//! one transaction that opens with `DELETE ... RETURNING` on the cart, so
//! SQLite takes the write lock immediately and the emptiness check and cart
//! consumption collapse into a single statement. Totals are accumulated from
//! the deleted lines' price snapshots; the menu item's live price is never
//! consulted.

use bistro_core::types::{
    MenuItemId, Money, OrderId, OrderLineId, OrderStatus, UserId,
};
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::RepositoryError;
use super::cart::CartLineRow;
use crate::models::{Order, OrderLine};
use crate::policy::OrderScope;

/// Errors specific to converting a cart into an order.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    /// The user's cart has no lines; nothing was created.
    #[error("cart is empty")]
    EmptyCart,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for CheckoutError {
    fn from(err: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(err))
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i64,
    user_id: i64,
    delivery_crew_id: Option<i64>,
    status: i64,
    total: String,
    created_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, order_items: Vec<OrderLine>) -> Result<Order, RepositoryError> {
        let total = Money::from_db(&self.total).map_err(|e| {
            RepositoryError::DataCorruption(format!("order {} total: {e}", self.id))
        })?;
        Ok(Order {
            id: OrderId::new(self.id),
            user: UserId::new(self.user_id),
            delivery_crew: self.delivery_crew_id.map(UserId::new),
            status: OrderStatus::new(self.status),
            total,
            created_at: self.created_at,
            order_items,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderLineRow {
    id: i64,
    order_id: i64,
    menu_item_id: i64,
    quantity: i64,
    unit_price: String,
}

impl TryFrom<OrderLineRow> for OrderLine {
    type Error = RepositoryError;

    fn try_from(row: OrderLineRow) -> Result<Self, Self::Error> {
        let unit_price = Money::from_db(&row.unit_price).map_err(|e| {
            RepositoryError::DataCorruption(format!("order line {} unit price: {e}", row.id))
        })?;
        Ok(Self {
            id: OrderLineId::new(row.id),
            menu_item: MenuItemId::new(row.menu_item_id),
            quantity: row.quantity,
            unit_price,
        })
    }
}

/// Which column an order listing is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderSort {
    #[default]
    CreatedAt,
    Total,
    Status,
}

impl OrderSort {
    const fn column(self) -> &'static str {
        match self {
            Self::CreatedAt => "o.created_at",
            Self::Total => "o.total",
            Self::Status => "o.status",
        }
    }
}

/// Sort field plus direction for order listings. Defaults to newest first.
#[derive(Debug, Clone, Copy)]
pub struct OrderOrdering {
    pub field: OrderSort,
    pub descending: bool,
}

impl Default for OrderOrdering {
    fn default() -> Self {
        Self {
            field: OrderSort::CreatedAt,
            descending: true,
        }
    }
}

/// Filters applied to an order listing, inside the caller's scope.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    /// Exact status match; accepted verbatim, including out-of-enum values.
    pub status: Option<OrderStatus>,
    pub delivery_crew: Option<UserId>,
    /// Case-insensitive substring match on the owning user's username.
    pub search: Option<String>,
}

fn push_scope(builder: &mut QueryBuilder<'_, Sqlite>, scope: OrderScope) {
    match scope {
        OrderScope::All => {}
        OrderScope::AssignedTo(user) => {
            builder.push(" AND o.delivery_crew_id = ").push_bind(user.as_i64());
        }
        OrderScope::OwnedBy(user) => {
            builder.push(" AND o.user_id = ").push_bind(user.as_i64());
        }
    }
}

fn push_filter(builder: &mut QueryBuilder<'_, Sqlite>, filter: &OrderFilter) {
    if let Some(status) = filter.status {
        builder.push(" AND o.status = ").push_bind(status.as_i64());
    }
    if let Some(crew) = filter.delivery_crew {
        builder.push(" AND o.delivery_crew_id = ").push_bind(crew.as_i64());
    }
    if let Some(search) = &filter.search {
        builder
            .push(" AND u.username LIKE ")
            .push_bind(super::like_pattern(search))
            .push(" ESCAPE '\\'");
    }
}

/// Repository for orders and their lines.
pub struct OrderRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Convert the user's cart into an order, atomically.
    ///
    /// In one transaction: consume all cart lines, create the order with the
    /// accumulated total, and copy each line's menu item, quantity, and price
    /// snapshot onto an order line. Rolls back on any failure, including an
    /// empty cart, so no partial order can ever be observed.
    ///
    /// Callers must hold the user's checkout lock across this call; the
    /// transaction alone does not stop a racing duplicate request from
    /// observing the cart before it is consumed.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` if the user has no cart lines.
    /// Returns `CheckoutError::Repository` for database failures.
    pub async fn checkout(&self, user: UserId) -> Result<Order, CheckoutError> {
        let mut tx = self.pool.begin().await?;

        let cart_rows: Vec<CartLineRow> = sqlx::query_as(
            r"
            DELETE FROM cart_items
            WHERE user_id = ?
            RETURNING id, menu_item_id, quantity, unit_price, created_at
            ",
        )
        .bind(user.as_i64())
        .fetch_all(&mut *tx)
        .await?;

        if cart_rows.is_empty() {
            // Dropping the transaction rolls the delete back.
            return Err(CheckoutError::EmptyCart);
        }

        let mut total = Money::ZERO;
        for row in &cart_rows {
            let unit_price = Money::from_db(&row.unit_price).map_err(|e| {
                RepositoryError::DataCorruption(format!(
                    "cart line {} unit price: {e}",
                    row.id
                ))
            })?;
            total += unit_price.line_total(row.quantity);
        }

        let order_row: OrderRow = sqlx::query_as(
            r"
            INSERT INTO orders (user_id, delivery_crew_id, status, total, created_at)
            VALUES (?, NULL, ?, ?, ?)
            RETURNING id, user_id, delivery_crew_id, status, total, created_at
            ",
        )
        .bind(user.as_i64())
        .bind(OrderStatus::OUT_FOR_DELIVERY.as_i64())
        .bind(total.to_string())
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        let mut order_items = Vec::with_capacity(cart_rows.len());
        for row in cart_rows {
            let line_row: OrderLineRow = sqlx::query_as(
                r"
                INSERT INTO order_items (order_id, menu_item_id, quantity, unit_price)
                VALUES (?, ?, ?, ?)
                RETURNING id, order_id, menu_item_id, quantity, unit_price
                ",
            )
            .bind(order_row.id)
            .bind(row.menu_item_id)
            .bind(row.quantity)
            .bind(&row.unit_price)
            .fetch_one(&mut *tx)
            .await?;
            order_items.push(OrderLine::try_from(line_row)?);
        }

        tx.commit().await?;

        Ok(order_row.into_order(order_items)?)
    }

    /// Number of orders visible in the scope and matching the filter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(
        &self,
        scope: OrderScope,
        filter: &OrderFilter,
    ) -> Result<i64, RepositoryError> {
        let mut builder = QueryBuilder::<Sqlite>::new(
            "SELECT COUNT(*) FROM orders o JOIN users u ON u.id = o.user_id WHERE 1 = 1",
        );
        push_scope(&mut builder, scope);
        push_filter(&mut builder, filter);

        let count: i64 = builder.build_query_scalar().fetch_one(self.pool).await?;
        Ok(count)
    }

    /// One page of orders, with their lines, for the given scope.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        scope: OrderScope,
        filter: &OrderFilter,
        ordering: OrderOrdering,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Order>, RepositoryError> {
        let mut builder = QueryBuilder::<Sqlite>::new(
            r"
            SELECT o.id, o.user_id, o.delivery_crew_id, o.status, o.total, o.created_at
            FROM orders o JOIN users u ON u.id = o.user_id
            WHERE 1 = 1
            ",
        );
        push_scope(&mut builder, scope);
        push_filter(&mut builder, filter);
        builder.push(" ORDER BY ");
        builder.push(ordering.field.column());
        if ordering.descending {
            builder.push(" DESC");
        }
        builder.push(", o.id");
        builder.push(" LIMIT ").push_bind(limit);
        builder.push(" OFFSET ").push_bind(offset);

        let rows: Vec<OrderRow> = builder.build_query_as().fetch_all(self.pool).await?;
        let mut lines = self.lines_for(rows.iter().map(|r| r.id).collect()).await?;

        rows.into_iter()
            .map(|row| {
                let order_items = lines.remove(&row.id).unwrap_or_default();
                row.into_order(order_items)
            })
            .collect()
    }

    /// Get an order by id regardless of scope. Used by the role-gated PATCH,
    /// whose authorization lives in the handler's role ladder, not here.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        self.get_where(id, OrderScope::All).await
    }

    /// Get an order by id if it falls inside the caller's scope.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_in_scope(
        &self,
        id: OrderId,
        scope: OrderScope,
    ) -> Result<Option<Order>, RepositoryError> {
        self.get_where(id, scope).await
    }

    async fn get_where(
        &self,
        id: OrderId,
        scope: OrderScope,
    ) -> Result<Option<Order>, RepositoryError> {
        let mut builder = QueryBuilder::<Sqlite>::new(
            r"
            SELECT o.id, o.user_id, o.delivery_crew_id, o.status, o.total, o.created_at
            FROM orders o
            WHERE o.id = ",
        );
        builder.push_bind(id.as_i64());
        push_scope(&mut builder, scope);

        let row: Option<OrderRow> = builder.build_query_as().fetch_optional(self.pool).await?;
        let Some(row) = row else {
            return Ok(None);
        };

        let mut lines = self.lines_for(vec![row.id]).await?;
        let order_items = lines.remove(&row.id).unwrap_or_default();
        Some(row.into_order(order_items)).transpose()
    }

    /// Apply a status and/or delivery crew change. Absent fields are left
    /// unchanged; the total is never touched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_fields(
        &self,
        id: OrderId,
        status: Option<OrderStatus>,
        delivery_crew: Option<UserId>,
    ) -> Result<Order, RepositoryError> {
        if status.is_some() || delivery_crew.is_some() {
            let mut builder = QueryBuilder::<Sqlite>::new("UPDATE orders SET ");
            let mut fields = builder.separated(", ");
            if let Some(status) = status {
                fields.push("status = ").push_bind_unseparated(status.as_i64());
            }
            if let Some(crew) = delivery_crew {
                fields
                    .push("delivery_crew_id = ")
                    .push_bind_unseparated(crew.as_i64());
            }
            builder.push(" WHERE id = ").push_bind(id.as_i64());

            let result = builder.build().execute(self.pool).await?;
            if result.rows_affected() == 0 {
                return Err(RepositoryError::NotFound);
            }
        }

        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Delete an order; its lines cascade.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: OrderId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = ?")
            .bind(id.as_i64())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Lines for a set of orders, grouped by order id.
    async fn lines_for(
        &self,
        order_ids: Vec<i64>,
    ) -> Result<std::collections::HashMap<i64, Vec<OrderLine>>, RepositoryError> {
        let mut grouped: std::collections::HashMap<i64, Vec<OrderLine>> =
            std::collections::HashMap::new();
        if order_ids.is_empty() {
            return Ok(grouped);
        }

        let mut builder = QueryBuilder::<Sqlite>::new(
            "SELECT id, order_id, menu_item_id, quantity, unit_price FROM order_items WHERE order_id IN (",
        );
        let mut ids = builder.separated(", ");
        for order_id in order_ids {
            ids.push_bind(order_id);
        }
        builder.push(") ORDER BY id");

        let rows: Vec<OrderLineRow> = builder.build_query_as().fetch_all(self.pool).await?;
        for row in rows {
            let order_id = row.order_id;
            grouped
                .entry(order_id)
                .or_default()
                .push(OrderLine::try_from(row)?);
        }
        Ok(grouped)
    }
}
