//! Database models.

pub mod entry;
pub mod page;
pub mod taxonomy;

pub use entry::{CreateEntry, DirectoryEntry, EntrySummary};
pub use page::{CreateDirectoryPage, DirectoryPage, UpdatePagination};
pub use taxonomy::{TaxonomyTerm, Vocabulary};
