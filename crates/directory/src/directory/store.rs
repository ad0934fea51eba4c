//! Storage seam for the directory listing.
//!
//! The listing service only reads: pages by slug, taxonomy terms, and the
//! filtered entry set of one page. [`PgDirectoryStore`] backs it with
//! PostgreSQL; [`MemoryDirectoryStore`](super::memory::MemoryDirectoryStore)
//! serves tests and local demos.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;

use super::pager::PageWindow;
use super::query_builder::EntryQueryBuilder;
use super::types::EntryFilters;
use crate::models::{DirectoryPage, EntrySummary, TaxonomyTerm, Vocabulary};

/// Read access to pages, terms and entries.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    /// Live page served under `slug`.
    async fn find_page_by_slug(&self, slug: &str) -> Result<Option<DirectoryPage>>;

    /// Term of `vocabulary` with the given ID.
    async fn find_term(&self, vocabulary: Vocabulary, id: i64) -> Result<Option<TaxonomyTerm>>;

    /// Every term of `vocabulary`, ordered by title.
    async fn list_terms(&self, vocabulary: Vocabulary) -> Result<Vec<TaxonomyTerm>>;

    /// Number of visible entries of a page matching `filters`.
    async fn count_entries(&self, page_id: i64, filters: &EntryFilters) -> Result<u64>;

    /// Visible entries of a page matching `filters`, ordered by title, limited
    /// to `window` when given.
    async fn fetch_entries(
        &self,
        page_id: i64,
        filters: &EntryFilters,
        window: Option<PageWindow>,
    ) -> Result<Vec<EntrySummary>>;

    /// Whether the backing storage answers.
    async fn healthy(&self) -> bool;
}

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgDirectoryStore {
    pool: PgPool,
}

impl PgDirectoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DirectoryStore for PgDirectoryStore {
    async fn find_page_by_slug(&self, slug: &str) -> Result<Option<DirectoryPage>> {
        let page = DirectoryPage::find_by_slug(&self.pool, slug).await?;
        Ok(page.filter(|p| p.live))
    }

    async fn find_term(&self, vocabulary: Vocabulary, id: i64) -> Result<Option<TaxonomyTerm>> {
        TaxonomyTerm::find_by_id(&self.pool, vocabulary, id).await
    }

    async fn list_terms(&self, vocabulary: Vocabulary) -> Result<Vec<TaxonomyTerm>> {
        TaxonomyTerm::list_all(&self.pool, vocabulary).await
    }

    async fn count_entries(&self, page_id: i64, filters: &EntryFilters) -> Result<u64> {
        let sql = EntryQueryBuilder::new(page_id, filters).build_count();
        tracing::debug!(sql = %sql, "counting directory entries");

        let total: i64 = sqlx::query_scalar(&sql)
            .fetch_one(&self.pool)
            .await
            .context("failed to execute count query")?;

        Ok(u64::try_from(total).unwrap_or(0))
    }

    async fn fetch_entries(
        &self,
        page_id: i64,
        filters: &EntryFilters,
        window: Option<PageWindow>,
    ) -> Result<Vec<EntrySummary>> {
        let sql = EntryQueryBuilder::new(page_id, filters).build(window);
        tracing::debug!(sql = %sql, "fetching directory entries");

        let entries = sqlx::query_as::<_, EntrySummary>(&sql)
            .fetch_all(&self.pool)
            .await
            .context("failed to execute entry query")?;

        Ok(entries)
    }

    async fn healthy(&self) -> bool {
        crate::db::check_health(&self.pool).await
    }
}
