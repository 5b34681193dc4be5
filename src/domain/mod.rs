//! Domain layer: item and history records, listing pipeline primitives.
//!
//! Everything in here is pure data and algorithms with no I/O: filter
//! reduction, client-side sorting, snapshot diffing, pagination arithmetic,
//! the listing state machine and the request generation tokens that guard
//! it against out-of-order responses.

pub mod filter;
pub mod generation;
pub mod history;
pub mod ids;
pub mod item;
pub mod listing;
pub mod pagination;
pub mod report;
pub mod sort;

pub use filter::{ListingFilter, SortOrder, StatusFilter, TypeFilter};
pub use generation::{Generation, GenerationTracker};
pub use history::{
    DiffScope, FieldChange, HistoryAction, HistoryFilter, HistoryRecord, HistoryView, Snapshot,
};
pub use ids::{HistoryId, ItemId};
pub use item::{Item, ItemStatus, ItemType};
pub use listing::{ListingState, ListingStats, Panel};
pub use pagination::Pagination;
pub use report::{ItemUpdate, NewItem, PhotoUpload};
pub use sort::{recent_feed, sort_items};
