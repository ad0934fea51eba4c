//! In-memory directory store.
//!
//! Mirrors the PostgreSQL store's visibility, filtering and ordering rules
//! so the listing service can be exercised without a database.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::RwLock;

use super::pager::PageWindow;
use super::store::DirectoryStore;
use super::types::EntryFilters;
use crate::models::taxonomy::validate_title;
use crate::models::{
    CreateDirectoryPage, CreateEntry, DirectoryEntry, DirectoryPage, EntrySummary, TaxonomyTerm,
    Vocabulary,
};

struct StoredEntry {
    entry: DirectoryEntry,
    languages: HashSet<i64>,
    countries: HashSet<i64>,
    topics: HashSet<i64>,
}

impl StoredEntry {
    fn links(&self, vocabulary: Vocabulary) -> &HashSet<i64> {
        match vocabulary {
            Vocabulary::Language => &self.languages,
            Vocabulary::Country => &self.countries,
            Vocabulary::Topic => &self.topics,
        }
    }

    fn matches(&self, page_id: i64, filters: &EntryFilters) -> bool {
        if self.entry.page_id != page_id || !self.entry.is_visible() {
            return false;
        }
        if let Some(ref search) = filters.search {
            if !self.entry.title.to_lowercase().contains(&search.to_lowercase()) {
                return false;
            }
        }
        filters
            .terms()
            .all(|(vocabulary, term)| self.links(vocabulary).contains(&term.id))
    }
}

#[derive(Default)]
struct Inner {
    next_id: i64,
    pages: BTreeMap<i64, DirectoryPage>,
    languages: BTreeMap<i64, TaxonomyTerm>,
    countries: BTreeMap<i64, TaxonomyTerm>,
    topics: BTreeMap<i64, TaxonomyTerm>,
    entries: BTreeMap<i64, StoredEntry>,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn terms(&self, vocabulary: Vocabulary) -> &BTreeMap<i64, TaxonomyTerm> {
        match vocabulary {
            Vocabulary::Language => &self.languages,
            Vocabulary::Country => &self.countries,
            Vocabulary::Topic => &self.topics,
        }
    }

    fn terms_mut(&mut self, vocabulary: Vocabulary) -> &mut BTreeMap<i64, TaxonomyTerm> {
        match vocabulary {
            Vocabulary::Language => &mut self.languages,
            Vocabulary::Country => &mut self.countries,
            Vocabulary::Topic => &mut self.topics,
        }
    }
}

/// Directory store held in process memory.
#[derive(Default)]
pub struct MemoryDirectoryStore {
    inner: RwLock<Inner>,
    unavailable: AtomicBool,
}

impl MemoryDirectoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every read fail, as a lost database connection would.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            anyhow::bail!("directory storage unavailable");
        }
        Ok(())
    }

    /// Store a page, applying field defaults.
    pub fn insert_page(&self, input: CreateDirectoryPage) -> Result<DirectoryPage> {
        let mut page = input.into_page()?;
        let mut inner = self.inner.write();
        if inner.pages.values().any(|p| p.slug == page.slug) {
            anyhow::bail!("a directory page with slug {:?} already exists", page.slug);
        }
        page.id = inner.next_id();
        inner.pages.insert(page.id, page.clone());
        Ok(page)
    }

    /// Store a term.
    pub fn insert_term(&self, vocabulary: Vocabulary, title: &str) -> Result<TaxonomyTerm> {
        validate_title(title)?;
        let title = title.trim().to_string();
        let mut inner = self.inner.write();
        if inner.terms(vocabulary).values().any(|t| t.title == title) {
            anyhow::bail!("{} {title:?} already exists", vocabulary.query_key());
        }
        let term = TaxonomyTerm {
            id: inner.next_id(),
            title,
        };
        inner.terms_mut(vocabulary).insert(term.id, term.clone());
        Ok(term)
    }

    /// Store an entry with its term links.
    pub fn insert_entry(&self, input: CreateEntry) -> Result<DirectoryEntry> {
        input.validate()?;
        let mut inner = self.inner.write();
        if !inner.pages.contains_key(&input.page_id) {
            anyhow::bail!("directory page {} does not exist", input.page_id);
        }
        let slug = input.slug.trim().to_string();
        if inner
            .entries
            .values()
            .any(|e| e.entry.page_id == input.page_id && e.entry.slug == slug)
        {
            anyhow::bail!("an entry with slug {slug:?} already exists on this page");
        }
        for vocabulary in Vocabulary::ALL {
            if let Some(missing) = input
                .term_ids(vocabulary)
                .iter()
                .find(|id| !inner.terms(vocabulary).contains_key(*id))
            {
                anyhow::bail!("{} {missing} does not exist", vocabulary.query_key());
            }
        }

        let entry = DirectoryEntry {
            id: inner.next_id(),
            page_id: input.page_id,
            title: input.title.trim().to_string(),
            slug,
            landing_page_url: input.landing_page_url.clone(),
            onion_address: input.onion_address.clone(),
            live: input.live.unwrap_or(true),
            listed: input.listed.unwrap_or(true),
        };
        let stored = StoredEntry {
            entry: entry.clone(),
            languages: input.language_ids.iter().copied().collect(),
            countries: input.country_ids.iter().copied().collect(),
            topics: input.topic_ids.iter().copied().collect(),
        };
        inner.entries.insert(entry.id, stored);
        Ok(entry)
    }

    fn matching(&self, page_id: i64, filters: &EntryFilters) -> Vec<EntrySummary> {
        let inner = self.inner.read();
        let mut entries: Vec<EntrySummary> = inner
            .entries
            .values()
            .filter(|e| e.matches(page_id, filters))
            .map(|e| e.entry.summary())
            .collect();
        entries.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        entries
    }
}

#[async_trait]
impl DirectoryStore for MemoryDirectoryStore {
    async fn find_page_by_slug(&self, slug: &str) -> Result<Option<DirectoryPage>> {
        self.check_available()?;
        let inner = self.inner.read();
        Ok(inner
            .pages
            .values()
            .find(|p| p.slug == slug && p.live)
            .cloned())
    }

    async fn find_term(&self, vocabulary: Vocabulary, id: i64) -> Result<Option<TaxonomyTerm>> {
        self.check_available()?;
        Ok(self.inner.read().terms(vocabulary).get(&id).cloned())
    }

    async fn list_terms(&self, vocabulary: Vocabulary) -> Result<Vec<TaxonomyTerm>> {
        self.check_available()?;
        let mut terms: Vec<TaxonomyTerm> =
            self.inner.read().terms(vocabulary).values().cloned().collect();
        terms.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(terms)
    }

    async fn count_entries(&self, page_id: i64, filters: &EntryFilters) -> Result<u64> {
        self.check_available()?;
        Ok(self.matching(page_id, filters).len() as u64)
    }

    async fn fetch_entries(
        &self,
        page_id: i64,
        filters: &EntryFilters,
        window: Option<PageWindow>,
    ) -> Result<Vec<EntrySummary>> {
        self.check_available()?;
        let entries = self.matching(page_id, filters);
        Ok(match window {
            Some(w) => entries
                .into_iter()
                .skip(usize::try_from(w.offset).unwrap_or(usize::MAX))
                .take(usize::try_from(w.limit).unwrap_or(usize::MAX))
                .collect(),
            None => entries,
        })
    }

    async fn healthy(&self) -> bool {
        !self.unavailable.load(Ordering::SeqCst)
    }
}
