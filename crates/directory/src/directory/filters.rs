//! Query-string to filter resolution.
//!
//! Each listing dimension is resolved on its own. Unusable values (empty,
//! non-numeric, or naming a term that does not exist) drop that dimension
//! without error; storage failures still propagate.

use anyhow::Result;

use super::store::DirectoryStore;
use super::types::{DirectoryQuery, EntryFilters};
use crate::models::{TaxonomyTerm, Vocabulary};

/// Parse a term ID from a query value. Surrounding whitespace is ignored.
pub fn parse_term_id(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

/// Search term to apply, if any. The value is kept as given.
pub fn resolve_search(raw: Option<&str>) -> Option<String> {
    raw.filter(|s| !s.is_empty()).map(str::to_string)
}

/// Resolve the term of `vocabulary` selected by a query value.
pub async fn resolve_term(
    store: &dyn DirectoryStore,
    vocabulary: Vocabulary,
    raw: Option<&str>,
) -> Result<Option<TaxonomyTerm>> {
    let Some(raw) = raw.filter(|r| !r.is_empty()) else {
        return Ok(None);
    };

    let Some(id) = parse_term_id(raw) else {
        tracing::debug!(
            vocabulary = vocabulary.query_key(),
            value = raw,
            "ignoring malformed filter id"
        );
        return Ok(None);
    };

    let term = store.find_term(vocabulary, id).await?;
    if term.is_none() {
        tracing::debug!(
            vocabulary = vocabulary.query_key(),
            id,
            "ignoring unknown filter id"
        );
    }

    Ok(term)
}

/// Build the filters for a listing request.
pub async fn filters_from_query(
    store: &dyn DirectoryStore,
    query: &DirectoryQuery,
) -> Result<EntryFilters> {
    let search = resolve_search(query.search.as_deref());

    let (language, country, topic) = tokio::try_join!(
        resolve_term(store, Vocabulary::Language, query.term_param(Vocabulary::Language)),
        resolve_term(store, Vocabulary::Country, query.term_param(Vocabulary::Country)),
        resolve_term(store, Vocabulary::Topic, query.term_param(Vocabulary::Topic)),
    )?;

    Ok(EntryFilters {
        search,
        language,
        country,
        topic,
    })
}
