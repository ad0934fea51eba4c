//! Directory listing.
//!
//! Resolves query-string filters, looks up the visible entries of a page,
//! paginates them and assembles the context the rendering layer consumes.

pub mod filters;
pub mod memory;
pub mod pager;
pub mod query_builder;
pub mod search;
pub mod service;
pub mod store;
pub mod types;

pub use memory::MemoryDirectoryStore;
pub use pager::{Page, PageWindow, Paginator, PaginatorState};
pub use query_builder::EntryQueryBuilder;
pub use service::DirectoryService;
pub use store::{DirectoryStore, PgDirectoryStore};
pub use types::{AllFilters, DirectoryContext, DirectoryQuery, EntryFilters};
