//! Listing pagination with orphan folding.
//!
//! A trailing page holding `orphans` entries or fewer is merged into the page
//! before it, so readers never land on a near-empty last page. Requested
//! page numbers that cannot be served fall back to a page that can: missing
//! or non-numeric values go to the first page, values below one to the first
//! page, values beyond the end to the last page.

use std::num::IntErrorKind;
use std::ops::RangeInclusive;

use serde::Serialize;

/// Slice of the full result set backing one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: u64,
    pub limit: u64,
}

/// Page-count arithmetic for a result set of known size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    count: u64,
    per_page: u32,
    orphans: u32,
}

impl Paginator {
    /// Create a paginator. A zero `per_page` is treated as one.
    pub fn new(count: u64, per_page: u32, orphans: u32) -> Self {
        Self {
            count,
            per_page: per_page.max(1),
            orphans,
        }
    }

    /// Total number of items.
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub fn orphans(&self) -> u32 {
        self.orphans
    }

    /// Number of pages; an empty result set still has one (empty) page.
    pub fn num_pages(&self) -> u32 {
        let hits = self.count.saturating_sub(u64::from(self.orphans)).max(1);
        let pages = hits.div_ceil(u64::from(self.per_page));
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    /// 1-based page numbers.
    pub fn page_range(&self) -> RangeInclusive<u32> {
        1..=self.num_pages()
    }

    /// Turn a raw page parameter into a servable page number.
    pub fn resolve_number(&self, raw: Option<&str>) -> u32 {
        let last = self.num_pages();
        let requested = match raw.map(|r| r.trim().parse::<i64>()) {
            Some(Ok(n)) => n,
            Some(Err(e)) if *e.kind() == IntErrorKind::PosOverflow => return last,
            _ => return 1,
        };
        if requested < 1 {
            1
        } else if requested > i64::from(last) {
            last
        } else {
            // In range 1..=last, so the conversion cannot fail.
            u32::try_from(requested).unwrap_or(last)
        }
    }

    /// Offset and limit of the given page, with the orphan remainder folded
    /// into the last page.
    pub fn window(&self, number: u32) -> PageWindow {
        let per_page = u64::from(self.per_page);
        let bottom = u64::from(number.saturating_sub(1)) * per_page;
        let mut top = bottom + per_page;
        if top + u64::from(self.orphans) >= self.count {
            top = self.count;
        }
        PageWindow {
            offset: bottom,
            limit: top.saturating_sub(bottom),
        }
    }

    /// Wrap the items fetched for `number` into a page.
    pub fn page<T>(&self, number: u32, items: Vec<T>) -> Page<T> {
        let num_pages = self.num_pages();
        let has_next = number < num_pages;
        let has_previous = number > 1;

        let start_index = if self.count == 0 {
            0
        } else {
            u64::from(self.per_page) * u64::from(number.saturating_sub(1)) + 1
        };
        let end_index = if number >= num_pages {
            self.count
        } else {
            u64::from(number) * u64::from(self.per_page)
        };

        Page {
            number,
            items,
            has_next,
            has_previous,
            has_other_pages: has_next || has_previous,
            next_page_number: has_next.then(|| number + 1),
            previous_page_number: has_previous.then(|| number - 1),
            start_index,
            end_index,
        }
    }

    /// Serializable snapshot for render contexts.
    pub fn state(&self) -> PaginatorState {
        PaginatorState {
            count: self.count,
            per_page: self.per_page,
            orphans: self.orphans,
            num_pages: self.num_pages(),
            page_range: self.page_range().collect(),
        }
    }
}

/// Paginator metadata exposed to the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginatorState {
    pub count: u64,
    pub per_page: u32,
    pub orphans: u32,
    pub num_pages: u32,
    pub page_range: Vec<u32>,
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    /// 1-based page number.
    pub number: u32,
    pub items: Vec<T>,
    pub has_next: bool,
    pub has_previous: bool,
    pub has_other_pages: bool,
    pub next_page_number: Option<u32>,
    pub previous_page_number: Option<u32>,
    /// 1-based index of the first item on this page (0 when empty).
    pub start_index: u64,
    /// 1-based index of the last item on this page.
    pub end_index: u64,
}
