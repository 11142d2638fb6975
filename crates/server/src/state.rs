//! Shared application state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use bistro_core::types::UserId;
use sqlx::SqlitePool;

use crate::config::ServerConfig;

/// Application state handed to every handler. Cloning is cheap; all clones
/// share the same pool and lock table.
#[derive(Debug, Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

#[derive(Debug)]
struct AppStateInner {
    config: ServerConfig,
    pool: SqlitePool,
    /// One async mutex per user. Checkout holds it across the whole
    /// transaction so a user's concurrent checkouts are serialized.
    checkout_locks: Mutex<HashMap<UserId, Arc<tokio::sync::Mutex<()>>>>,
}

impl AppState {
    #[must_use]
    pub fn new(config: ServerConfig, pool: SqlitePool) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                checkout_locks: Mutex::new(HashMap::new()),
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.inner.pool
    }

    /// Returns the checkout lock for `user`, creating it on first use.
    ///
    /// The table mutex only guards the map itself; a poisoned guard still
    /// holds a usable map, so the poison is discarded.
    #[must_use]
    pub fn checkout_lock(&self, user: UserId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .inner
            .checkout_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        locks.entry(user).or_default().clone()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn test_config() -> ServerConfig {
        ServerConfig {
            database_url: SecretString::from("sqlite::memory:"),
            host: "127.0.0.1".parse().unwrap(),
            port: 8000,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    #[tokio::test]
    async fn test_checkout_lock_is_stable_per_user() {
        let pool = crate::db::test_pool().await;
        let state = AppState::new(test_config(), pool);

        let first = state.checkout_lock(UserId::new(1));
        let again = state.checkout_lock(UserId::new(1));
        let other = state.checkout_lock(UserId::new(2));

        assert!(Arc::ptr_eq(&first, &again));
        assert!(!Arc::ptr_eq(&first, &other));
    }
}
