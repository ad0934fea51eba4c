//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::db;
use crate::directory::{DirectoryService, DirectoryStore, PgDirectoryStore};

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Listing service over the configured store.
    directory: DirectoryService,
}

impl AppState {
    /// Connect to PostgreSQL, apply migrations and build the services.
    pub async fn new(config: &Config) -> Result<Self> {
        let pool = db::create_pool(config)
            .await
            .context("failed to create database pool")?;

        db::run_migrations(&pool)
            .await
            .context("failed to run migrations")?;

        let store = Arc::new(PgDirectoryStore::new(pool));

        Ok(Self {
            inner: Arc::new(AppStateInner {
                directory: DirectoryService::new(store, config.page_key.clone()),
            }),
        })
    }

    /// Build state over an arbitrary store.
    pub fn with_store(store: Arc<dyn DirectoryStore>, page_key: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                directory: DirectoryService::new(store, page_key),
            }),
        }
    }

    /// Get the directory listing service.
    pub fn directory(&self) -> &DirectoryService {
        &self.inner.directory
    }

    /// Check if the backing store is reachable.
    pub async fn store_healthy(&self) -> bool {
        self.inner.directory.store().healthy().await
    }
}
