//! Demo content for a fresh database.
//!
//! Creates a `directory` page with a handful of classified entries. Running
//! it again leaves existing content untouched.

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::info;

use crate::models::{
    CreateDirectoryPage, CreateEntry, DirectoryEntry, DirectoryPage, TaxonomyTerm, Vocabulary,
};

/// Slug of the demo page.
pub const DEMO_SLUG: &str = "directory";

struct DemoEntry {
    title: &'static str,
    onion_address: &'static str,
    language: &'static str,
    country: &'static str,
    topic: &'static str,
}

const DEMO_ENTRIES: &[DemoEntry] = &[
    DemoEntry {
        title: "Berliner Tagespost",
        onion_address: "tagespostxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx.onion",
        language: "German",
        country: "Germany",
        topic: "News",
    },
    DemoEntry {
        title: "El Diario Libre",
        onion_address: "diariolibrexxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx.onion",
        language: "Spanish",
        country: "Mexico",
        topic: "News",
    },
    DemoEntry {
        title: "Open Rights Watch",
        onion_address: "rightswatchxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx.onion",
        language: "English",
        country: "United Kingdom",
        topic: "Privacy",
    },
];

/// Existing term with `title`, or a new one.
async fn term_id(pool: &PgPool, vocabulary: Vocabulary, title: &str) -> Result<i64> {
    let existing = TaxonomyTerm::list_all(pool, vocabulary).await?;
    if let Some(term) = existing.into_iter().find(|t| t.title == title) {
        return Ok(term.id);
    }
    Ok(TaxonomyTerm::create(pool, vocabulary, title).await?.id)
}

/// Create the demo page and its entries unless the page already exists.
pub async fn seed_demo(pool: &PgPool) -> Result<DirectoryPage> {
    if let Some(page) = DirectoryPage::find_by_slug(pool, DEMO_SLUG).await? {
        info!(page_id = page.id, "demo directory already present");
        return Ok(page);
    }

    let page = DirectoryPage::create(
        pool,
        CreateDirectoryPage {
            slug: DEMO_SLUG.to_string(),
            title: "Directory".to_string(),
            body: Some("<p>Organizations accepting tips over onion services.</p>".to_string()),
            faq_link: Some("/faq/".to_string()),
            per_page: Some(2),
            orphans: Some(1),
            ..Default::default()
        },
    )
    .await
    .context("failed to create demo page")?;

    for demo in DEMO_ENTRIES {
        let input = CreateEntry {
            page_id: page.id,
            title: demo.title.to_string(),
            slug: demo.title.to_lowercase().replace(' ', "-"),
            onion_address: Some(demo.onion_address.to_string()),
            language_ids: vec![term_id(pool, Vocabulary::Language, demo.language).await?],
            country_ids: vec![term_id(pool, Vocabulary::Country, demo.country).await?],
            topic_ids: vec![term_id(pool, Vocabulary::Topic, demo.topic).await?],
            ..Default::default()
        };
        DirectoryEntry::create(pool, input).await?;
    }

    info!(page_id = page.id, entries = DEMO_ENTRIES.len(), "demo directory created");
    Ok(page)
}
