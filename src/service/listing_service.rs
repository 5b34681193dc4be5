//! Listing service: fetches a listing page and commits it to view state.

use tokio::sync::watch;

use super::ItemSource;
use crate::domain::{
    GenerationTracker, Item, ItemId, ItemStatus, ListingFilter, ListingState, Pagination,
    sort_items,
};

/// What happened to the result of one fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The result (success or failure) was written to the listing state.
    Committed {
        /// Server-reported total, when the response carried one.
        total: Option<u64>,
        /// `false` if the fetch failed and the state holds the error.
        ok: bool,
    },
    /// A newer fetch was issued before this one resolved; dropped.
    Stale,
    /// The view was torn down before this fetch resolved; dropped.
    Detached,
}

/// Owns one listing view's state and keeps it consistent under overlapping
/// fetches.
///
/// Every fetch moves the state to [`ListingState::Loading`] and takes a
/// generation. When it resolves, its result is committed only if no newer
/// fetch was issued in the meantime and [`ListingService::detach`] has not
/// been called.
///
/// State changes are published on a [`watch`] channel; renderers follow them
/// through [`ListingService::subscribe`].
#[derive(Debug)]
pub struct ListingService<S> {
    source: S,
    state: watch::Sender<ListingState>,
    committed_filter: watch::Sender<ListingFilter>,
    generations: GenerationTracker,
}

impl<S: ItemSource> ListingService<S> {
    /// Creates an idle listing over `source`.
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            source,
            state: watch::Sender::new(ListingState::Idle),
            committed_filter: watch::Sender::new(ListingFilter::default()),
            generations: GenerationTracker::new(),
        }
    }

    /// The data source, for callers that need its other operations.
    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Fetches the listing for `filter` and commits it, sorted by
    /// `filter.sort`, unless superseded or detached.
    pub async fn fetch(&self, filter: &ListingFilter, page: Option<&Pagination>) -> FetchOutcome {
        let generation = self.generations.issue();
        if self.generations.is_attached() {
            self.state.send_replace(ListingState::Loading);
        }

        let result = self.source.list_items(filter, page).await;

        if !self.generations.is_attached() {
            tracing::debug!(generation = generation.get(), "listing detached, result dropped");
            return FetchOutcome::Detached;
        }
        let mut outcome = FetchOutcome::Stale;
        // The generation is checked while the channel is locked, so a newer
        // fetch cannot move the state between the check and the commit.
        self.state.send_if_modified(|state| {
            if !self.generations.is_current(generation) {
                return false;
            }
            self.committed_filter.send_replace(filter.clone());
            outcome = match result {
                Ok(page) => {
                    let items = sort_items(page.records, filter.sort);
                    tracing::debug!(generation = generation.get(), records = items.len(), "listing committed");
                    *state = ListingState::Loaded(items);
                    FetchOutcome::Committed {
                        total: page.total,
                        ok: true,
                    }
                }
                Err(e) => {
                    tracing::warn!(generation = generation.get(), error = %e, "listing fetch failed");
                    *state = ListingState::Failed(e.user_message());
                    FetchOutcome::Committed {
                        total: None,
                        ok: false,
                    }
                }
            };
            true
        });
        if outcome == FetchOutcome::Stale {
            tracing::debug!(generation = generation.get(), "stale listing response dropped");
        }
        outcome
    }

    /// Fetches the page under `cursor` and records the reported total.
    ///
    /// A page past the end is clamped by that total; the clamped page is
    /// then fetched so the view never shows an empty page out of range.
    pub async fn fetch_page(&self, filter: &ListingFilter, cursor: &mut Pagination) -> FetchOutcome {
        let outcome = self.fetch(filter, Some(&*cursor)).await;
        let FetchOutcome::Committed {
            total: Some(total),
            ok: true,
        } = outcome
        else {
            return outcome;
        };
        if !cursor.set_total(total) {
            return outcome;
        }
        tracing::debug!(
            page = cursor.page(),
            total,
            "requested page past the end, loading last page"
        );
        let outcome = self.fetch(filter, Some(&*cursor)).await;
        if let FetchOutcome::Committed {
            total: Some(total), ..
        } = outcome
        {
            let _ = cursor.set_total(total);
        }
        outcome
    }

    /// Filter of the last committed fetch, for rendering alongside
    /// [`ListingService::state`].
    #[must_use]
    pub fn committed_filter(&self) -> ListingFilter {
        self.committed_filter.borrow().clone()
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> ListingState {
        self.state.borrow().clone()
    }

    /// Follows state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ListingState> {
        self.state.subscribe()
    }

    /// Records currently loaded; empty unless the state is `Loaded`.
    #[must_use]
    pub fn items(&self) -> Vec<Item> {
        self.state.borrow().items().to_vec()
    }

    /// Drops a deleted row without refetching.
    pub fn remove(&self, id: &ItemId) -> bool {
        self.state.send_if_modified(|state| state.remove(id))
    }

    /// Patches a row's status without refetching.
    pub fn set_status(&self, id: &ItemId, status: &ItemStatus) -> bool {
        self.state.send_if_modified(|state| state.set_status(id, status))
    }

    /// Replaces a row with its edited copy without refetching.
    pub fn replace(&self, item: Item) -> bool {
        self.state.send_if_modified(|state| state.replace(item))
    }

    /// Tears the view down. Fetches still in flight run to completion but
    /// their results are discarded.
    pub fn detach(&self) {
        self.generations.detach();
    }
}
