//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::Keys;
use crate::config::ServerConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the database connection pool and the token keys.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: PgPool,
    keys: Keys,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: ServerConfig, pool: PgPool) -> Self {
        let keys = Keys::new(config.jwt_secret_bytes());

        Self {
            inner: Arc::new(AppStateInner { config, pool, keys }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the JWT signing/verification keys.
    #[must_use]
    pub fn keys(&self) -> &Keys {
        &self.inner.keys
    }
}
