#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Listing tests against PostgreSQL.
//!
//! These run the generated SQL for real. They need `DATABASE_URL` (read from
//! the environment or `.env`) and are skipped when it is unset. Every test
//! works on its own page and uniquely named terms, so they can share a
//! database and run in parallel.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use directory::config::{Config, DEFAULT_PAGE_KEY};
use directory::db;
use directory::directory::{DirectoryQuery, DirectoryService, DirectoryStore, PgDirectoryStore};
use directory::models::{
    CreateDirectoryPage, CreateEntry, DirectoryEntry, DirectoryPage, TaxonomyTerm,
    UpdatePagination, Vocabulary,
};
use directory::routes;
use directory::seed;
use directory::state::AppState;

fn test_config() -> Option<Config> {
    dotenvy::dotenv().ok();
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping PostgreSQL test");
        return None;
    };
    Some(Config {
        port: 0,
        database_url,
        database_max_connections: 2,
        page_key: DEFAULT_PAGE_KEY.to_string(),
        cors_allowed_origins: vec!["*".to_string()],
    })
}

async fn pool() -> Option<PgPool> {
    let config = test_config()?;
    let pool = db::create_pool(&config)
        .await
        .expect("connect to test database");
    db::run_migrations(&pool).await.expect("apply migrations");
    Some(pool)
}

fn unique() -> String {
    Uuid::now_v7().simple().to_string()
}

fn service(pool: &PgPool) -> DirectoryService {
    DirectoryService::new(Arc::new(PgDirectoryStore::new(pool.clone())), DEFAULT_PAGE_KEY)
}

async fn create_page(pool: &PgPool, per_page: i16, orphans: i16) -> DirectoryPage {
    DirectoryPage::create(
        pool,
        CreateDirectoryPage {
            slug: format!("pg-{}", unique()),
            title: "Directory".to_string(),
            per_page: Some(per_page),
            orphans: Some(orphans),
            ..Default::default()
        },
    )
    .await
    .unwrap()
}

async fn create_term(pool: &PgPool, vocabulary: Vocabulary, title: &str) -> TaxonomyTerm {
    TaxonomyTerm::create(pool, vocabulary, &format!("{title} {}", unique()))
        .await
        .unwrap()
}

fn entry(page: &DirectoryPage, title: &str) -> CreateEntry {
    CreateEntry {
        page_id: page.id,
        title: title.to_string(),
        slug: title.to_lowercase().replace(' ', "-"),
        ..Default::default()
    }
}

async fn add_entries(pool: &PgPool, page: &DirectoryPage, titles: &[&str]) {
    for title in titles {
        DirectoryEntry::create(pool, entry(page, title)).await.unwrap();
    }
}

async fn listed_titles(
    service: &DirectoryService,
    page: &DirectoryPage,
    query: &DirectoryQuery,
) -> Vec<String> {
    let filters = service.filters_from_query(query).await.unwrap();
    service
        .get_instances(page, &filters)
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.title)
        .collect()
}

fn page_query(number: &str) -> DirectoryQuery {
    DirectoryQuery {
        page: Some(number.to_string()),
        ..Default::default()
    }
}

fn search(value: &str) -> DirectoryQuery {
    DirectoryQuery {
        search: Some(value.to_string()),
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[tokio::test]
async fn search_folds_case_in_database() {
    let Some(pool) = pool().await else { return };
    let page = create_page(&pool, 10, 0).await;
    add_entries(&pool, &page, &["Onion Times", "Daily Onion", "Garden Weekly"]).await;
    let service = service(&pool);

    assert_eq!(
        listed_titles(&service, &page, &search("ONION")).await,
        vec!["Daily Onion", "Onion Times"]
    );
    assert_eq!(
        listed_titles(&service, &page, &search("garden w")).await,
        vec!["Garden Weekly"]
    );
}

#[tokio::test]
async fn search_non_ascii_title() {
    let Some(pool) = pool().await else { return };
    let page = create_page(&pool, 10, 0).await;
    add_entries(&pool, &page, &["Straße der Presse", "Strasse Nord"]).await;
    let service = service(&pool);

    for value in ["straße", "STRAßE", "Straße der"] {
        assert_eq!(
            listed_titles(&service, &page, &search(value)).await,
            vec!["Straße der Presse"],
            "search {value:?}"
        );
    }
}

#[tokio::test]
async fn search_wildcards_match_literally() {
    let Some(pool) = pool().await else { return };
    let page = create_page(&pool, 10, 0).await;
    let titles = ["100% Independent", "1000 Voices", "Under_score", "Underscore"];
    add_entries(&pool, &page, &titles).await;
    let service = service(&pool);

    assert_eq!(
        listed_titles(&service, &page, &search("100%")).await,
        vec!["100% Independent"]
    );
    assert_eq!(
        listed_titles(&service, &page, &search("under_")).await,
        vec!["Under_score"]
    );
}

// ---------------------------------------------------------------------------
// Term filters
// ---------------------------------------------------------------------------

#[tokio::test]
async fn term_filters_combine() {
    let Some(pool) = pool().await else { return };
    let page = create_page(&pool, 10, 0).await;
    let english = create_term(&pool, Vocabulary::Language, "English").await;
    let spanish = create_term(&pool, Vocabulary::Language, "Spanish").await;
    let germany = create_term(&pool, Vocabulary::Country, "Germany").await;
    let mexico = create_term(&pool, Vocabulary::Country, "Mexico").await;

    for (title, languages, countries) in [
        ("Alpha", vec![english.id], vec![germany.id]),
        ("Bravo", vec![english.id], vec![mexico.id]),
        ("Charlie", vec![spanish.id], vec![germany.id]),
        ("Delta", vec![english.id, spanish.id], vec![germany.id, mexico.id]),
    ] {
        let mut input = entry(&page, title);
        input.language_ids = languages;
        input.country_ids = countries;
        DirectoryEntry::create(&pool, input).await.unwrap();
    }
    let service = service(&pool);

    let by_language = DirectoryQuery {
        language: Some(english.id.to_string()),
        ..Default::default()
    };
    // An entry linked to several terms is listed once.
    assert_eq!(
        listed_titles(&service, &page, &by_language).await,
        vec!["Alpha", "Bravo", "Delta"]
    );

    let both = DirectoryQuery {
        language: Some(english.id.to_string()),
        country: Some(germany.id.to_string()),
        ..Default::default()
    };
    assert_eq!(
        listed_titles(&service, &page, &both).await,
        vec!["Alpha", "Delta"]
    );

    let with_search = DirectoryQuery {
        search: Some("del".to_string()),
        country: Some(mexico.id.to_string()),
        ..Default::default()
    };
    assert_eq!(
        listed_titles(&service, &page, &with_search).await,
        vec!["Delta"]
    );
}

#[tokio::test]
async fn unknown_country_lists_everything() {
    let Some(pool) = pool().await else { return };
    let page = create_page(&pool, 10, 0).await;
    let germany = create_term(&pool, Vocabulary::Country, "Germany").await;
    let mut input = entry(&page, "Alpha");
    input.country_ids = vec![germany.id];
    DirectoryEntry::create(&pool, input).await.unwrap();
    add_entries(&pool, &page, &["Bravo"]).await;
    let service = service(&pool);

    let query = DirectoryQuery {
        country: Some(i64::MAX.to_string()),
        ..Default::default()
    };
    let context = service.get_context(&page, &query).await.unwrap();

    assert!(context.entries_filters.is_empty());
    assert_eq!(context.paginator.count, 2);
    let titles: Vec<_> = context
        .entries_page
        .items
        .iter()
        .map(|e| e.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Alpha", "Bravo"]);
}

#[tokio::test]
async fn terms_looked_up_per_vocabulary() {
    let Some(pool) = pool().await else { return };
    let topic = create_term(&pool, Vocabulary::Topic, "Privacy").await;
    let store = PgDirectoryStore::new(pool.clone());

    assert_eq!(
        store.find_term(Vocabulary::Topic, topic.id).await.unwrap(),
        Some(topic.clone())
    );
    // Same ID in another vocabulary is a different table.
    let other = store.find_term(Vocabulary::Language, topic.id).await.unwrap();
    assert_ne!(other.map(|t| t.title), Some(topic.title.clone()));

    let topics = store.list_terms(Vocabulary::Topic).await.unwrap();
    assert!(topics.contains(&topic));
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

#[tokio::test]
async fn count_and_window_agree() {
    let Some(pool) = pool().await else { return };
    let created = create_page(&pool, 10, 2).await;
    let page = DirectoryPage::update_pagination(
        &pool,
        created.id,
        UpdatePagination {
            per_page: Some(2),
            orphans: Some(1),
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!((page.per_page, page.orphans), (2, 1));

    add_entries(&pool, &page, &["Echo", "Alpha", "Delta", "Charlie", "Bravo"]).await;
    let service = service(&pool);

    let first = service.get_context(&page, &page_query("1")).await.unwrap();
    assert_eq!(first.paginator.count, 5);
    assert_eq!(first.paginator.num_pages, 2);
    let titles: Vec<_> = first
        .entries_page
        .items
        .iter()
        .map(|e| e.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Alpha", "Bravo"]);

    // Last page takes the orphan.
    let last = service.get_context(&page, &page_query("99")).await.unwrap();
    assert_eq!(last.entries_page.number, 2);
    let titles: Vec<_> = last
        .entries_page
        .items
        .iter()
        .map(|e| e.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Charlie", "Delta", "Echo"]);
    assert_eq!(
        (last.entries_page.start_index, last.entries_page.end_index),
        (3, 5)
    );
}

#[tokio::test]
async fn pagination_update_validated() {
    let Some(pool) = pool().await else { return };
    let page = create_page(&pool, 10, 2).await;

    let invalid = DirectoryPage::update_pagination(
        &pool,
        page.id,
        UpdatePagination {
            per_page: Some(0),
            orphans: None,
        },
    )
    .await;
    assert!(invalid.is_err());

    let stored = DirectoryPage::find_by_id(&pool, page.id).await.unwrap().unwrap();
    assert_eq!((stored.per_page, stored.orphans), (10, 2));

    let missing = DirectoryPage::update_pagination(
        &pool,
        i64::MAX,
        UpdatePagination {
            per_page: Some(5),
            orphans: None,
        },
    )
    .await
    .unwrap();
    assert!(missing.is_none());
}

// ---------------------------------------------------------------------------
// Visibility
// ---------------------------------------------------------------------------

#[tokio::test]
async fn hidden_entries_and_pages_excluded() {
    let Some(pool) = pool().await else { return };
    let page = create_page(&pool, 10, 0).await;
    add_entries(&pool, &page, &["Shown"]).await;
    let mut draft = entry(&page, "Draft");
    draft.live = Some(false);
    DirectoryEntry::create(&pool, draft).await.unwrap();
    let mut unlisted = entry(&page, "Unlisted");
    unlisted.listed = Some(false);
    DirectoryEntry::create(&pool, unlisted).await.unwrap();
    let service = service(&pool);

    let context = service
        .get_context(&page, &DirectoryQuery::default())
        .await
        .unwrap();
    assert_eq!(context.paginator.count, 1);
    assert_eq!(
        listed_titles(&service, &page, &DirectoryQuery::default()).await,
        vec!["Shown"]
    );

    let unpublished = DirectoryPage::create(
        &pool,
        CreateDirectoryPage {
            slug: format!("pg-{}", unique()),
            title: "Draft".to_string(),
            live: Some(false),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert!(service.find_page(&unpublished.slug).await.unwrap().is_none());
    let stored = DirectoryPage::find_by_id(&pool, unpublished.id).await.unwrap();
    assert!(stored.is_some_and(|p| !p.live));
}

#[tokio::test]
async fn deleted_entry_leaves_listing() {
    let Some(pool) = pool().await else { return };
    let page = create_page(&pool, 10, 0).await;
    let kept = DirectoryEntry::create(&pool, entry(&page, "Kept")).await.unwrap();
    let gone = DirectoryEntry::create(&pool, entry(&page, "Gone")).await.unwrap();
    let service = service(&pool);

    assert!(DirectoryEntry::delete(&pool, gone.id).await.unwrap());
    assert!(!DirectoryEntry::delete(&pool, gone.id).await.unwrap());
    assert!(DirectoryEntry::find_by_id(&pool, gone.id).await.unwrap().is_none());
    assert_eq!(
        DirectoryEntry::find_by_id(&pool, kept.id).await.unwrap(),
        Some(kept)
    );
    assert_eq!(
        listed_titles(&service, &page, &DirectoryQuery::default()).await,
        vec!["Kept"]
    );
}

// ---------------------------------------------------------------------------
// Seed and HTTP
// ---------------------------------------------------------------------------

#[tokio::test]
async fn seed_is_idempotent() {
    let Some(pool) = pool().await else { return };

    let first = seed::seed_demo(&pool).await.unwrap();
    let second = seed::seed_demo(&pool).await.unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(first.slug, seed::DEMO_SLUG);
}

#[tokio::test]
async fn router_serves_database_page() {
    let Some(config) = test_config() else { return };
    let state = AppState::new(&config).await.unwrap();
    let pool = db::create_pool(&config).await.unwrap();
    let page = create_page(&pool, 10, 0).await;
    add_entries(&pool, &page, &["Bravo", "Alpha"]).await;

    assert!(state.store_healthy().await);

    let router = routes::router(state);
    let uri = format!("/directory/{}?search=a", page.slug);
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["entries_page"]["items"][0]["title"], "Alpha");
    assert_eq!(json["entries_page"]["items"][1]["title"], "Bravo");
    assert_eq!(json["search_value"], "a");
}
