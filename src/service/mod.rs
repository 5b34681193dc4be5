//! Service layer: listing orchestration over injected data sources.
//!
//! The services never talk HTTP themselves. They depend on the
//! [`ItemSource`], [`ItemModerator`] and [`HistorySource`] seams, which the
//! API modules implement and tests replace with in-memory fakes.

pub mod admin_service;
pub mod debounce;
pub mod driver;
pub mod history_service;
pub mod listing_service;

#[cfg(test)]
pub(crate) mod fake;

use std::future::Future;

pub use admin_service::AdminService;
pub use debounce::Debouncer;
pub use driver::{FilterChange, Trigger, run_listing_driver};
pub use history_service::{AdminHistoryBrowser, ItemHistory};
pub use listing_service::{FetchOutcome, ListingService};

use crate::api::{HistoryApi, ItemsApi, ListPage};
use crate::domain::{HistoryFilter, HistoryRecord, Item, ItemId, ItemStatus, ListingFilter, Pagination};
use crate::error::ClientError;

/// Where listing pages come from.
pub trait ItemSource: Send + Sync {
    /// Fetches one page of items matching `filter`.
    fn list_items(
        &self,
        filter: &ListingFilter,
        page: Option<&Pagination>,
    ) -> impl Future<Output = Result<ListPage<Item>, ClientError>> + Send;
}

/// Moderation actions on single items.
pub trait ItemModerator: Send + Sync {
    /// Removes an item.
    fn delete_item(&self, id: &ItemId) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Moves an item to `status`.
    fn set_item_status(
        &self,
        id: &ItemId,
        status: &ItemStatus,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;
}

/// Where audit records come from.
pub trait HistorySource: Send + Sync {
    /// History of one item.
    fn item_history(
        &self,
        id: &ItemId,
        limit: u32,
        offset: u64,
    ) -> impl Future<Output = Result<ListPage<HistoryRecord>, ClientError>> + Send;

    /// History across every item.
    fn all_history(
        &self,
        filter: &HistoryFilter,
        limit: u32,
        offset: u64,
    ) -> impl Future<Output = Result<ListPage<HistoryRecord>, ClientError>> + Send;
}

impl ItemSource for ItemsApi {
    async fn list_items(
        &self,
        filter: &ListingFilter,
        page: Option<&Pagination>,
    ) -> Result<ListPage<Item>, ClientError> {
        self.list(filter, page).await
    }
}

impl ItemModerator for ItemsApi {
    async fn delete_item(&self, id: &ItemId) -> Result<(), ClientError> {
        self.delete(id).await
    }

    async fn set_item_status(&self, id: &ItemId, status: &ItemStatus) -> Result<(), ClientError> {
        self.update_status(id, status).await
    }
}

impl HistorySource for HistoryApi {
    async fn item_history(
        &self,
        id: &ItemId,
        limit: u32,
        offset: u64,
    ) -> Result<ListPage<HistoryRecord>, ClientError> {
        HistoryApi::item_history(self, id, limit, offset).await
    }

    async fn all_history(
        &self,
        filter: &HistoryFilter,
        limit: u32,
        offset: u64,
    ) -> Result<ListPage<HistoryRecord>, ClientError> {
        HistoryApi::all_history(self, filter, limit, offset).await
    }
}
