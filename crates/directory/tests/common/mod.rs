#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for integration tests.
//!
//! Tests run the REAL listing service and router over the in-memory store,
//! so no database is needed.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use directory::config::DEFAULT_PAGE_KEY;
use directory::directory::{DirectoryService, MemoryDirectoryStore};
use directory::models::{CreateDirectoryPage, CreateEntry, DirectoryPage, Vocabulary};
use directory::routes;
use directory::state::AppState;
use directory_test_utils::{TestEntry, TestPage};

/// Test fixture: a seeded in-memory store plus the service and router over it.
pub struct TestApp {
    pub store: Arc<MemoryDirectoryStore>,
    pub state: AppState,
    router: Router,
    /// Term IDs by (vocabulary, title).
    terms: HashMap<(Vocabulary, String), i64>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_page_key(DEFAULT_PAGE_KEY)
    }

    pub fn with_page_key(page_key: &str) -> Self {
        let store = Arc::new(MemoryDirectoryStore::new());
        let state = AppState::with_store(store.clone(), page_key);
        let router = routes::router(state.clone());
        Self {
            store,
            state,
            router,
            terms: HashMap::new(),
        }
    }

    pub fn service(&self) -> &DirectoryService {
        self.state.directory()
    }

    /// Store a page built from a fixture.
    pub fn add_page(&self, page: TestPage) -> DirectoryPage {
        self.store
            .insert_page(CreateDirectoryPage {
                slug: page.slug,
                title: page.title,
                live: Some(page.live),
                per_page: page.per_page,
                orphans: page.orphans,
                body: page.body,
                source_warning: page.source_warning,
                ..Default::default()
            })
            .expect("failed to insert page")
    }

    /// ID of a term, creating it on first use.
    pub fn term(&mut self, vocabulary: Vocabulary, title: &str) -> i64 {
        let key = (vocabulary, title.to_string());
        if let Some(id) = self.terms.get(&key) {
            return *id;
        }
        let term = self
            .store
            .insert_term(vocabulary, title)
            .expect("failed to insert term");
        self.terms.insert(key, term.id);
        term.id
    }

    /// Store an entry built from a fixture under `page`.
    pub fn add_entry(&mut self, page: &DirectoryPage, entry: TestEntry) -> i64 {
        let language_ids = entry
            .languages
            .iter()
            .map(|t| self.term(Vocabulary::Language, t))
            .collect();
        let country_ids = entry
            .countries
            .iter()
            .map(|t| self.term(Vocabulary::Country, t))
            .collect();
        let topic_ids = entry
            .topics
            .iter()
            .map(|t| self.term(Vocabulary::Topic, t))
            .collect();

        self.store
            .insert_entry(CreateEntry {
                page_id: page.id,
                title: entry.title,
                slug: entry.slug,
                onion_address: entry.onion_address,
                live: Some(entry.live),
                listed: Some(entry.listed),
                language_ids,
                country_ids,
                topic_ids,
                ..Default::default()
            })
            .expect("failed to insert entry")
            .id
    }

    /// Store several entries under `page`.
    pub fn add_entries(&mut self, page: &DirectoryPage, entries: Vec<TestEntry>) {
        for entry in entries {
            self.add_entry(page, entry);
        }
    }

    /// Send a GET request through the real router.
    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, directory_test_utils::parse_json(&body))
    }
}
