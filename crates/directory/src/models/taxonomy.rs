//! Lookup vocabularies used to classify directory entries.
//!
//! Languages, countries and topics share one shape (id + title) and differ
//! only in the table they live in and the join table linking them to
//! entries. [`Vocabulary`] names those tables; [`TaxonomyTerm`] is the row.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// One of the three lookup vocabularies an entry can be tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vocabulary {
    Language,
    Country,
    Topic,
}

impl Vocabulary {
    /// All vocabularies, in display order.
    pub const ALL: [Vocabulary; 3] = [Vocabulary::Language, Vocabulary::Country, Vocabulary::Topic];

    /// Query-string key selecting a term of this vocabulary.
    pub fn query_key(self) -> &'static str {
        match self {
            Vocabulary::Language => "language",
            Vocabulary::Country => "country",
            Vocabulary::Topic => "topic",
        }
    }

    /// Name of the entry relation (used as the key in filter and option maps).
    pub fn relation(self) -> &'static str {
        match self {
            Vocabulary::Language => "languages",
            Vocabulary::Country => "countries",
            Vocabulary::Topic => "topics",
        }
    }

    /// Table holding the terms.
    pub fn table(self) -> &'static str {
        match self {
            Vocabulary::Language => "directory_language",
            Vocabulary::Country => "directory_country",
            Vocabulary::Topic => "directory_topic",
        }
    }

    /// Join table linking entries to terms.
    pub fn link_table(self) -> &'static str {
        match self {
            Vocabulary::Language => "directory_entry_languages",
            Vocabulary::Country => "directory_entry_countries",
            Vocabulary::Topic => "directory_entry_topics",
        }
    }

    /// Column of the join table referencing the term.
    pub fn link_column(self) -> &'static str {
        match self {
            Vocabulary::Language => "language_id",
            Vocabulary::Country => "country_id",
            Vocabulary::Topic => "topic_id",
        }
    }
}

/// A language, country or topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaxonomyTerm {
    /// Numeric identifier, as carried in query strings.
    pub id: i64,

    /// Human-readable label.
    pub title: String,
}

/// Validate that a term title is non-empty and at most 255 characters.
pub fn validate_title(title: &str) -> Result<()> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        anyhow::bail!("term title must not be empty");
    }
    if trimmed.chars().count() > 255 {
        anyhow::bail!(
            "term title must be at most 255 characters, got {}",
            trimmed.chars().count()
        );
    }
    Ok(())
}

impl TaxonomyTerm {
    /// Find a term by ID.
    pub async fn find_by_id(pool: &PgPool, vocabulary: Vocabulary, id: i64) -> Result<Option<Self>> {
        let sql = format!("SELECT id, title FROM {} WHERE id = $1", vocabulary.table());
        let term = sqlx::query_as::<_, TaxonomyTerm>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
            .with_context(|| format!("failed to fetch {} term", vocabulary.query_key()))?;

        Ok(term)
    }

    /// List every term of a vocabulary ordered by title.
    pub async fn list_all(pool: &PgPool, vocabulary: Vocabulary) -> Result<Vec<Self>> {
        let sql = format!(
            "SELECT id, title FROM {} ORDER BY title, id",
            vocabulary.table()
        );
        let terms = sqlx::query_as::<_, TaxonomyTerm>(&sql)
            .fetch_all(pool)
            .await
            .with_context(|| format!("failed to list {}", vocabulary.relation()))?;

        Ok(terms)
    }

    /// Create a term, returning the stored row.
    pub async fn create(pool: &PgPool, vocabulary: Vocabulary, title: &str) -> Result<Self> {
        validate_title(title)?;

        let sql = format!(
            "INSERT INTO {} (title) VALUES ($1) RETURNING id, title",
            vocabulary.table()
        );
        let term = sqlx::query_as::<_, TaxonomyTerm>(&sql)
            .bind(title.trim())
            .fetch_one(pool)
            .await
            .with_context(|| format!("failed to create {} term", vocabulary.query_key()))?;

        Ok(term)
    }
}
