//! Entry listing query builder using SeaQuery.
//!
//! Composes the single listing query: children of a page, live, listed,
//! optionally restricted by title substring and by one term per vocabulary,
//! ordered by title. The same conditions back both the COUNT and the
//! windowed SELECT so the paginator and the page contents always agree.

use sea_query::extension::postgres::PgExpr;
use sea_query::{Alias, Asterisk, Expr, Iden, Order, PostgresQueryBuilder, Query, SelectStatement};

use super::pager::PageWindow;
use super::types::EntryFilters;

#[derive(Iden)]
#[iden = "directory_entry"]
enum Entry {
    Table,
    Id,
    PageId,
    Title,
    Slug,
    LandingPageUrl,
    OnionAddress,
    Live,
    Listed,
}

/// Join-table column referencing the entry.
const LINK_ENTRY_COLUMN: &str = "entry_id";

/// Query builder for the entries listed under one directory page.
pub struct EntryQueryBuilder<'a> {
    page_id: i64,
    filters: &'a EntryFilters,
}

impl<'a> EntryQueryBuilder<'a> {
    pub fn new(page_id: i64, filters: &'a EntryFilters) -> Self {
        Self { page_id, filters }
    }

    /// Build the SELECT of listing rows, limited to `window` when given.
    pub fn build(&self, window: Option<PageWindow>) -> String {
        let mut query = Query::select();

        query
            .columns([
                (Entry::Table, Entry::Id),
                (Entry::Table, Entry::Title),
                (Entry::Table, Entry::Slug),
                (Entry::Table, Entry::LandingPageUrl),
                (Entry::Table, Entry::OnionAddress),
            ])
            .from(Entry::Table);

        self.add_conditions(&mut query);

        // Id breaks ties between equal titles so paging is stable.
        query
            .order_by((Entry::Table, Entry::Title), Order::Asc)
            .order_by((Entry::Table, Entry::Id), Order::Asc);

        if let Some(window) = window {
            query.limit(window.limit);
            query.offset(window.offset);
        }

        query.to_string(PostgresQueryBuilder)
    }

    /// Build a COUNT query over the same rows.
    pub fn build_count(&self) -> String {
        let mut query = Query::select();

        query
            .expr(Expr::col(Asterisk).count())
            .from(Entry::Table);

        self.add_conditions(&mut query);

        query.to_string(PostgresQueryBuilder)
    }

    fn add_conditions(&self, query: &mut SelectStatement) {
        query
            .and_where(Expr::col((Entry::Table, Entry::PageId)).eq(self.page_id))
            .and_where(Expr::col((Entry::Table, Entry::Live)).eq(true))
            .and_where(Expr::col((Entry::Table, Entry::Listed)).eq(true));

        // Case is folded by the database on both sides; the value is only
        // escaped, never case-mapped here.
        if let Some(ref search) = self.filters.search {
            let pattern = format!("%{}%", escape_like_wildcards(search));
            query.and_where(Expr::col((Entry::Table, Entry::Title)).ilike(pattern));
        }

        for (vocabulary, term) in self.filters.terms() {
            let linked = Query::select()
                .column(Alias::new(LINK_ENTRY_COLUMN))
                .from(Alias::new(vocabulary.link_table()))
                .and_where(Expr::col(Alias::new(vocabulary.link_column())).eq(term.id))
                .to_owned();

            query.and_where(Expr::col((Entry::Table, Entry::Id)).in_subquery(linked));
        }
    }
}

/// Escape SQL LIKE wildcard characters (`%`, `_`, `\`) in a value.
fn escape_like_wildcards(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
