//! HTTP route handlers.
//!
//! One module per resource:
//!
//! | Path | Module |
//! |---|---|
//! | `/categories/` | [`categories`] |
//! | `/menu-items/` | [`menu_items`] |
//! | `/cart/menu-items` | [`cart`] |
//! | `/orders/` | [`orders`] |
//! | `/groups/...` | [`groups`] |

use axum::Router;
use axum::routing::{delete, get};

use crate::state::AppState;

pub mod cart;
pub mod categories;
pub mod groups;
pub mod menu_items;
pub mod orders;

/// All API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/categories/", get(categories::list).post(categories::create))
        .route(
            "/categories/{id}",
            axum::routing::put(categories::update).delete(categories::destroy),
        )
        .route("/menu-items/", get(menu_items::list).post(menu_items::create))
        .route(
            "/menu-items/{id}",
            get(menu_items::retrieve)
                .put(menu_items::replace)
                .patch(menu_items::partial_update)
                .delete(menu_items::destroy),
        )
        .route(
            "/cart/menu-items",
            get(cart::list).post(cart::add).delete(cart::clear),
        )
        .route("/orders/", get(orders::list).post(orders::create))
        .route(
            "/orders/{id}",
            get(orders::retrieve)
                .patch(orders::update)
                .delete(orders::destroy),
        )
        .route(
            "/groups/manager/users",
            get(groups::list_managers).post(groups::add_manager),
        )
        .route("/groups/manager/users/{id}", delete(groups::remove_manager))
        .route(
            "/groups/delivery-crew/users",
            get(groups::list_delivery_crew).post(groups::add_delivery_crew),
        )
        .route(
            "/groups/delivery-crew/users/{id}",
            delete(groups::remove_delivery_crew),
        )
}
