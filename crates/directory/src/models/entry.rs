//! Directory entry model and CRUD operations.
//!
//! Entries are children of a [`DirectoryPage`](super::DirectoryPage). Only
//! entries that are both live and listed appear in the public listing.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::taxonomy::Vocabulary;

/// Entry fields shown in a listing row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct EntrySummary {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub landing_page_url: Option<String>,
    pub onion_address: Option<String>,
}

/// Full entry record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct DirectoryEntry {
    pub id: i64,

    /// Owning directory page.
    pub page_id: i64,

    pub title: String,
    pub slug: String,
    pub landing_page_url: Option<String>,
    pub onion_address: Option<String>,

    /// Published flag.
    pub live: bool,

    /// Whether editors have approved the entry for the public listing.
    pub listed: bool,
}

impl DirectoryEntry {
    /// Whether this entry belongs in the public listing.
    pub fn is_visible(&self) -> bool {
        self.live && self.listed
    }

    /// Listing-row view of this entry.
    pub fn summary(&self) -> EntrySummary {
        EntrySummary {
            id: self.id,
            title: self.title.clone(),
            slug: self.slug.clone(),
            landing_page_url: self.landing_page_url.clone(),
            onion_address: self.onion_address.clone(),
        }
    }
}

/// Input for creating an entry under a page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateEntry {
    pub page_id: i64,
    pub title: String,
    pub slug: String,
    pub landing_page_url: Option<String>,
    pub onion_address: Option<String>,
    pub live: Option<bool>,
    pub listed: Option<bool>,
    #[serde(default)]
    pub language_ids: Vec<i64>,
    #[serde(default)]
    pub country_ids: Vec<i64>,
    #[serde(default)]
    pub topic_ids: Vec<i64>,
}

impl CreateEntry {
    /// Check the title and slug before storing.
    pub fn validate(&self) -> Result<()> {
        let title = self.title.trim();
        if title.is_empty() {
            anyhow::bail!("entry title must not be empty");
        }
        if title.chars().count() > 255 {
            anyhow::bail!("entry title must be at most 255 characters");
        }
        if self.slug.trim().is_empty() {
            anyhow::bail!("entry slug must not be empty");
        }
        Ok(())
    }

    /// Term IDs linked in the given vocabulary.
    pub fn term_ids(&self, vocabulary: Vocabulary) -> &[i64] {
        match vocabulary {
            Vocabulary::Language => &self.language_ids,
            Vocabulary::Country => &self.country_ids,
            Vocabulary::Topic => &self.topic_ids,
        }
    }
}

impl DirectoryEntry {
    /// Find an entry by ID.
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>> {
        let entry = sqlx::query_as::<_, DirectoryEntry>(
            r#"
            SELECT id, page_id, title, slug, landing_page_url, onion_address, live, listed
            FROM directory_entry WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch directory entry")?;

        Ok(entry)
    }

    /// Create an entry together with its taxonomy links.
    pub async fn create(pool: &PgPool, input: CreateEntry) -> Result<Self> {
        input.validate()?;

        let mut tx = pool.begin().await.context("failed to start transaction")?;

        let entry = sqlx::query_as::<_, DirectoryEntry>(
            r#"
            INSERT INTO directory_entry
                (page_id, title, slug, landing_page_url, onion_address, live, listed)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, page_id, title, slug, landing_page_url, onion_address, live, listed
            "#,
        )
        .bind(input.page_id)
        .bind(input.title.trim())
        .bind(input.slug.trim())
        .bind(&input.landing_page_url)
        .bind(&input.onion_address)
        .bind(input.live.unwrap_or(true))
        .bind(input.listed.unwrap_or(true))
        .fetch_one(&mut *tx)
        .await
        .context("failed to create directory entry")?;

        for vocabulary in Vocabulary::ALL {
            let sql = format!(
                "INSERT INTO {} (entry_id, {}) VALUES ($1, $2) ON CONFLICT DO NOTHING",
                vocabulary.link_table(),
                vocabulary.link_column()
            );
            for term_id in input.term_ids(vocabulary) {
                sqlx::query(&sql)
                    .bind(entry.id)
                    .bind(term_id)
                    .execute(&mut *tx)
                    .await
                    .with_context(|| {
                        format!("failed to link entry to {} {term_id}", vocabulary.query_key())
                    })?;
            }
        }

        tx.commit().await.context("failed to commit transaction")?;

        Ok(entry)
    }

    /// Delete an entry. Returns whether a row was removed.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM directory_entry WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .context("failed to delete directory entry")?;

        Ok(result.rows_affected() > 0)
    }
}
