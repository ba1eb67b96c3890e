//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ServerConfig;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; provides access to the configuration, the
/// primary store pool and (when configured) the read-only legacy pool.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: PgPool,
    legacy_pool: Option<PgPool>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: ServerConfig, pool: PgPool, legacy_pool: Option<PgPool>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                legacy_pool,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the primary store connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get the legacy vAptekeSync pool, if configured.
    #[must_use]
    pub fn legacy_pool(&self) -> Option<&PgPool> {
        self.inner.legacy_pool.as_ref()
    }
}
