//! Directory listing types.
//!
//! - DirectoryQuery: raw query-string parameters of a page view
//! - EntryFilters: validated, typed filter criteria derived from a query
//! - DirectoryContext: everything the rendering layer needs for one view

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::pager::{Page, PaginatorState};
use crate::models::{DirectoryPage, EntrySummary, TaxonomyTerm, Vocabulary};

/// Raw listing parameters taken from a request's query string.
///
/// Values are kept exactly as received; validation happens when they are
/// turned into [`EntryFilters`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryQuery {
    pub search: Option<String>,
    pub language: Option<String>,
    pub country: Option<String>,
    pub topic: Option<String>,
    /// Requested listing page, read from the configured page key.
    pub page: Option<String>,
}

impl DirectoryQuery {
    /// Pick the listing parameters out of a query-string map.
    pub fn from_params(params: &HashMap<String, String>, page_key: &str) -> Self {
        let get = |key: &str| params.get(key).cloned();
        Self {
            search: get("search"),
            language: get(Vocabulary::Language.query_key()),
            country: get(Vocabulary::Country.query_key()),
            topic: get(Vocabulary::Topic.query_key()),
            page: get(page_key),
        }
    }

    /// Raw value selecting a term of the given vocabulary.
    pub fn term_param(&self, vocabulary: Vocabulary) -> Option<&str> {
        match vocabulary {
            Vocabulary::Language => self.language.as_deref(),
            Vocabulary::Country => self.country.as_deref(),
            Vocabulary::Topic => self.topic.as_deref(),
        }
    }
}

/// Filter criteria applied to a listing.
///
/// Each dimension is independent and optional. Terms are carried whole so the
/// selected label can be shown without a second lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryFilters {
    /// Case-insensitive substring of the entry title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,

    #[serde(rename = "languages", default, skip_serializing_if = "Option::is_none")]
    pub language: Option<TaxonomyTerm>,

    #[serde(rename = "countries", default, skip_serializing_if = "Option::is_none")]
    pub country: Option<TaxonomyTerm>,

    #[serde(rename = "topics", default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<TaxonomyTerm>,
}

impl EntryFilters {
    /// True when no dimension is filtered.
    pub fn is_empty(&self) -> bool {
        self.search.is_none() && self.language.is_none() && self.country.is_none() && self.topic.is_none()
    }

    /// Selected term of a vocabulary, if any.
    pub fn term(&self, vocabulary: Vocabulary) -> Option<&TaxonomyTerm> {
        match vocabulary {
            Vocabulary::Language => self.language.as_ref(),
            Vocabulary::Country => self.country.as_ref(),
            Vocabulary::Topic => self.topic.as_ref(),
        }
    }

    /// Selected terms with their vocabulary.
    pub fn terms(&self) -> impl Iterator<Item = (Vocabulary, &TaxonomyTerm)> {
        Vocabulary::ALL
            .into_iter()
            .filter_map(|v| self.term(v).map(|t| (v, t)))
    }
}

/// Every term of every vocabulary, for populating filter selectors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllFilters {
    pub languages: Vec<TaxonomyTerm>,
    pub countries: Vec<TaxonomyTerm>,
    pub topics: Vec<TaxonomyTerm>,
}

/// Render context for one directory page view.
#[derive(Debug, Clone, Serialize)]
pub struct DirectoryContext {
    pub page: DirectoryPage,

    /// Raw search term, for redisplay in the search box.
    pub search_value: String,

    pub entries_page: Page<EntrySummary>,

    pub entries_filters: EntryFilters,

    pub paginator: PaginatorState,

    pub all_filters: AllFilters,
}
