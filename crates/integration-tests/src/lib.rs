//! Integration test support for Bistro.
//!
//! [`TestApp`] builds the real router in-process against a throwaway
//! temp-file `SQLite` database, so tests exercise the full stack (extractors,
//! policy, repositories, migrations) without binding a socket. Each test gets
//! its own database; requests are driven with `tower::ServiceExt::oneshot`.

#![cfg_attr(not(test), forbid(unsafe_code))]
// Test support: panicking on setup failure is the desired behavior.
#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use axum::Router;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, StatusCode};
use bistro_core::types::{CategoryId, MenuItemId, StaffGroup, UserId};
use bistro_server::app;
use bistro_server::config::ServerConfig;
use bistro_server::db::{self, CategoryRepository, MenuItemRepository, UserRepository};
use bistro_server::state::AppState;
use secrecy::SecretString;
use sqlx::SqlitePool;
use tower::ServiceExt;

/// An in-process application instance over its own fresh database.
pub struct TestApp {
    pub app: Router,
    pub pool: SqlitePool,
}

impl TestApp {
    /// Create a migrated database and build the router around it.
    pub async fn spawn() -> Self {
        let path = std::env::temp_dir().join(format!("bistro-test-{}.db", uuid::Uuid::new_v4()));
        let url = format!("sqlite://{}?mode=rwc", path.display());

        let database_url = SecretString::from(url);
        let pool = db::create_pool(&database_url).await.unwrap();
        db::MIGRATOR.run(&pool).await.unwrap();

        let config = ServerConfig {
            database_url,
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
            sentry_dsn: None,
            sentry_environment: None,
        };

        let state = AppState::new(config, pool.clone());
        Self {
            app: app(state),
            pool,
        }
    }

    /// Create a user, optionally in a staff group, and issue them a token.
    pub async fn create_user(&self, username: &str, group: Option<StaffGroup>) -> (UserId, String) {
        let repo = UserRepository::new(&self.pool);
        let user = repo.create(username, "").await.unwrap();
        if let Some(group) = group {
            repo.add_to_group(user.id, group).await.unwrap();
        }
        let token = uuid::Uuid::new_v4().simple().to_string();
        repo.store_token(user.id, &token).await.unwrap();
        (user.id, token)
    }

    /// Create a category directly in the store.
    pub async fn seed_category(&self, slug: &str) -> CategoryId {
        use bistro_core::types::{Slug, Title};
        CategoryRepository::new(&self.pool)
            .create(&Title::parse_category(slug).unwrap(), &Slug::parse(slug).unwrap())
            .await
            .unwrap()
            .id
    }

    /// Create a menu item directly in the store.
    pub async fn seed_menu_item(
        &self,
        title: &str,
        price: &str,
        category: CategoryId,
    ) -> MenuItemId {
        use bistro_core::types::{Money, Title};
        use bistro_server::models::NewMenuItem;
        MenuItemRepository::new(&self.pool)
            .create(&NewMenuItem {
                title: Title::parse_menu_item(title).unwrap(),
                price: Money::parse(price.parse().unwrap()).unwrap(),
                inventory: 100,
                category,
                featured: false,
            })
            .await
            .unwrap()
            .id
    }

    /// Drive one request through the router and decode the JSON body.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Token {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, serde_json::Value) {
        self.request(Method::GET, path, token, None).await
    }

    pub async fn post(
        &self,
        path: &str,
        token: Option<&str>,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        self.request(Method::POST, path, token, Some(body)).await
    }

    pub async fn put(
        &self,
        path: &str,
        token: Option<&str>,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        self.request(Method::PUT, path, token, Some(body)).await
    }

    pub async fn patch(
        &self,
        path: &str,
        token: Option<&str>,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        self.request(Method::PATCH, path, token, Some(body)).await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> (StatusCode, serde_json::Value) {
        self.request(Method::DELETE, path, token, None).await
    }
}
