//! Directory test utilities.
//!
//! Helpers for integration testing: page and entry fixtures, and assertion
//! utilities for inspecting rendered listing contexts.

use serde_json::Value as JsonValue;

/// Turn a title into a URL slug.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

/// Create a test directory page with default settings.
pub fn test_page(slug: &str, title: &str) -> TestPage {
    TestPage {
        slug: slug.to_string(),
        title: title.to_string(),
        live: true,
        per_page: None,
        orphans: None,
        body: None,
        source_warning: None,
    }
}

/// A test directory page builder.
#[derive(Debug, Clone)]
pub struct TestPage {
    pub slug: String,
    pub title: String,
    pub live: bool,
    pub per_page: Option<i16>,
    pub orphans: Option<i16>,
    pub body: Option<String>,
    pub source_warning: Option<String>,
}

impl TestPage {
    /// Set the page size and orphan allowance.
    pub fn paginated(mut self, per_page: i16, orphans: i16) -> Self {
        self.per_page = Some(per_page);
        self.orphans = Some(orphans);
        self
    }

    /// Set as unpublished.
    pub fn unpublished(mut self) -> Self {
        self.live = false;
        self
    }

    /// Set the rich text body.
    pub fn with_body(mut self, html: &str) -> Self {
        self.body = Some(html.to_string());
        self
    }

    /// Set the rich text source warning.
    pub fn with_source_warning(mut self, html: &str) -> Self {
        self.source_warning = Some(html.to_string());
        self
    }
}

/// Create a live, listed test entry.
pub fn test_entry(title: &str) -> TestEntry {
    TestEntry {
        title: title.to_string(),
        slug: slugify(title),
        onion_address: None,
        live: true,
        listed: true,
        languages: vec![],
        countries: vec![],
        topics: vec![],
    }
}

/// A test directory entry builder.
///
/// Taxonomy associations are given by term title; the test harness creates
/// missing terms and links them.
#[derive(Debug, Clone)]
pub struct TestEntry {
    pub title: String,
    pub slug: String,
    pub onion_address: Option<String>,
    pub live: bool,
    pub listed: bool,
    pub languages: Vec<String>,
    pub countries: Vec<String>,
    pub topics: Vec<String>,
}

impl TestEntry {
    /// Set the onion address.
    pub fn with_onion(mut self, address: &str) -> Self {
        self.onion_address = Some(address.to_string());
        self
    }

    /// Set as unpublished.
    pub fn unpublished(mut self) -> Self {
        self.live = false;
        self
    }

    /// Set as not approved for listing.
    pub fn unlisted(mut self) -> Self {
        self.listed = false;
        self
    }

    pub fn with_language(mut self, title: &str) -> Self {
        self.languages.push(title.to_string());
        self
    }

    pub fn with_country(mut self, title: &str) -> Self {
        self.countries.push(title.to_string());
        self
    }

    pub fn with_topic(mut self, title: &str) -> Self {
        self.topics.push(title.to_string());
        self
    }
}

/// Accessors for rendered listing contexts.
pub mod context {
    use serde_json::Value;

    /// Titles of the entries on the current listing page.
    pub fn entry_titles(context: &Value) -> Vec<String> {
        context["entries_page"]["items"]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item["title"].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of the current listing page.
    pub fn page_number(context: &Value) -> u64 {
        context["entries_page"]["number"].as_u64().unwrap_or(0)
    }

    /// Total number of listing pages.
    pub fn num_pages(context: &Value) -> u64 {
        context["paginator"]["num_pages"].as_u64().unwrap_or(0)
    }

    /// Titles of the terms offered for one filter relation.
    pub fn filter_options(context: &Value, relation: &str) -> Vec<String> {
        context["all_filters"][relation]
            .as_array()
            .map(|terms| {
                terms
                    .iter()
                    .filter_map(|t| t["title"].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Assertion helpers for JSON content.
pub mod assert {
    use serde_json::Value;

    /// Assert that a JSON value has a specific key.
    pub fn has_key(value: &Value, key: &str) {
        assert!(
            value.get(key).is_some(),
            "Expected JSON to have key '{key}', got: {value}"
        );
    }

    /// Assert that a JSON value lacks a specific key.
    pub fn lacks_key(value: &Value, key: &str) {
        assert!(
            value.get(key).is_none(),
            "Expected JSON to NOT have key '{key}', got: {value}"
        );
    }

    /// Assert the entry titles on the current listing page, in order.
    pub fn entry_titles(context: &Value, expected: &[&str]) {
        let actual = super::context::entry_titles(context);
        assert_eq!(
            actual, expected,
            "Listing mismatch.\nentries_page: {}",
            context["entries_page"]
        );
    }
}

/// Query strings for listing requests.
pub fn query_string(params: &[(&str, &str)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Parse a response body as JSON, or `Null` when it is not JSON.
pub fn parse_json(body: &[u8]) -> JsonValue {
    serde_json::from_slice(body).unwrap_or(JsonValue::Null)
}
