//! Admin dashboard: the item table, its counters and moderation actions.

use super::{FetchOutcome, ItemModerator, ItemSource, ListingService};
use crate::domain::{Item, ItemId, ItemStatus, ListingFilter, ListingStats, Pagination};
use crate::error::ClientError;

/// Admin view over all reports.
///
/// Moderation actions patch the loaded table only after the service
/// confirmed them; a failed action leaves the table untouched.
#[derive(Debug)]
pub struct AdminService<S> {
    listing: ListingService<S>,
    page_limit: u32,
}

impl<S: ItemSource + ItemModerator> AdminService<S> {
    /// Creates an admin view loading `page_limit` rows per page.
    #[must_use]
    pub fn new(source: S, page_limit: u32) -> Self {
        Self {
            listing: ListingService::new(source),
            page_limit,
        }
    }

    /// Underlying listing, for state inspection.
    #[must_use]
    pub const fn listing(&self) -> &ListingService<S> {
        &self.listing
    }

    /// Loads one page of the table, clamped to the last page once the
    /// server total is known. Returns the outcome and the cursor it ended on.
    pub async fn load(&self, filter: &ListingFilter, page: u32) -> (FetchOutcome, Pagination) {
        let mut cursor = Pagination::requested(page, self.page_limit);
        let outcome = self.listing.fetch_page(filter, &mut cursor).await;
        (outcome, cursor)
    }

    /// Counters computed from the loaded page.
    #[must_use]
    pub fn stats(&self) -> ListingStats {
        ListingStats::from_items(&self.listing.items())
    }

    /// Rows currently loaded.
    #[must_use]
    pub fn items(&self) -> Vec<Item> {
        self.listing.items()
    }

    /// Deletes an item and drops its row. Confirmation is the caller's job.
    ///
    /// # Errors
    ///
    /// Returns the service's [`ClientError`]; the table is not modified.
    pub async fn delete(&self, id: &ItemId) -> Result<(), ClientError> {
        self.listing.source().delete_item(id).await?;
        if !self.listing.remove(id) {
            tracing::debug!(item_id = %id, "deleted item was not in the loaded table");
        }
        Ok(())
    }

    /// Moves an item to `status` and patches its row.
    ///
    /// # Errors
    ///
    /// Returns the service's [`ClientError`]; the table is not modified.
    pub async fn set_status(&self, id: &ItemId, status: &ItemStatus) -> Result<(), ClientError> {
        self.listing.source().set_item_status(id, status).await?;
        let _ = self.listing.set_status(id, status);
        Ok(())
    }
}
