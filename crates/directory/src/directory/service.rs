//! Directory listing service.
//!
//! Turns a page view request into a render context:
//! - Filter resolution from query parameters
//! - Visible entry lookup
//! - Orphan-aware pagination with only the requested window fetched
//! - Search-index content for a page

use std::sync::Arc;

use anyhow::Result;

use super::filters;
use super::pager::Paginator;
use super::search::rich_text_to_plain;
use super::store::DirectoryStore;
use super::types::{AllFilters, DirectoryContext, DirectoryQuery, EntryFilters};
use crate::models::{DirectoryPage, EntrySummary, Vocabulary};

/// Service assembling directory listings.
pub struct DirectoryService {
    store: Arc<dyn DirectoryStore>,
    /// Query-string key carrying the requested listing page.
    page_key: String,
}

impl DirectoryService {
    pub fn new(store: Arc<dyn DirectoryStore>, page_key: impl Into<String>) -> Self {
        Self {
            store,
            page_key: page_key.into(),
        }
    }

    pub fn store(&self) -> &Arc<dyn DirectoryStore> {
        &self.store
    }

    pub fn page_key(&self) -> &str {
        &self.page_key
    }

    /// Live page served under `slug`.
    pub async fn find_page(&self, slug: &str) -> Result<Option<DirectoryPage>> {
        self.store.find_page_by_slug(slug).await
    }

    /// Derive the entry filters for a request.
    pub async fn filters_from_query(&self, query: &DirectoryQuery) -> Result<EntryFilters> {
        filters::filters_from_query(self.store.as_ref(), query).await
    }

    /// Every visible entry of `page` matching `filters`, ordered by title.
    pub async fn get_instances(
        &self,
        page: &DirectoryPage,
        filters: &EntryFilters,
    ) -> Result<Vec<EntrySummary>> {
        self.store.fetch_entries(page.id, filters, None).await
    }

    /// Assemble the render context for one view of `page`.
    pub async fn get_context(
        &self,
        page: &DirectoryPage,
        query: &DirectoryQuery,
    ) -> Result<DirectoryContext> {
        let filters = self.filters_from_query(query).await?;

        let count = self.store.count_entries(page.id, &filters).await?;
        let paginator = Paginator::new(count, page.page_size(), page.orphan_allowance());
        let number = paginator.resolve_number(query.page.as_deref());
        let window = paginator.window(number);

        let items = if window.limit == 0 {
            Vec::new()
        } else {
            self.store
                .fetch_entries(page.id, &filters, Some(window))
                .await?
        };

        tracing::debug!(
            page_id = page.id,
            count,
            number,
            num_pages = paginator.num_pages(),
            filtered = !filters.is_empty(),
            "assembled directory listing"
        );

        let all_filters = self.all_filters().await?;

        Ok(DirectoryContext {
            page: page.clone(),
            search_value: query.search.clone().unwrap_or_default(),
            entries_page: paginator.page(number, items),
            entries_filters: filters,
            paginator: paginator.state(),
            all_filters,
        })
    }

    /// Every term of every vocabulary, for the filter selectors.
    pub async fn all_filters(&self) -> Result<AllFilters> {
        let store = self.store.as_ref();
        let (languages, countries, topics) = tokio::try_join!(
            store.list_terms(Vocabulary::Language),
            store.list_terms(Vocabulary::Country),
            store.list_terms(Vocabulary::Topic),
        )?;

        Ok(AllFilters {
            languages,
            countries,
            topics,
        })
    }

    /// Text indexed for `page`: its searchable fields, then the titles of its
    /// visible entries in listing order.
    pub async fn get_search_content(&self, page: &DirectoryPage) -> Result<Vec<String>> {
        let mut content = Vec::new();

        if !page.title.trim().is_empty() {
            content.push(page.title.trim().to_string());
        }
        for rich_text in [&page.body, &page.source_warning].into_iter().flatten() {
            let text = rich_text_to_plain(rich_text);
            if !text.is_empty() {
                content.push(text);
            }
        }

        let entries = self.get_instances(page, &EntryFilters::default()).await?;
        content.extend(entries.into_iter().map(|e| e.title));

        Ok(content)
    }
}
