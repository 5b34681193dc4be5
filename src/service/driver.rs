//! Event loop turning filter edits into listing fetches.
//!
//! Type, status, sort and page edits fetch immediately. Search edits go
//! through a [`Debouncer`] and fetch once typing has paused. Fetches run
//! concurrently with further edits; the [`ListingService`] generation guard
//! keeps only the newest result.

use std::time::Duration;

use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;
use tokio::sync::mpsc;

use super::{Debouncer, FetchOutcome, ItemSource, ListingService};
use crate::domain::{ListingFilter, Pagination, SortOrder, StatusFilter, TypeFilter};

/// One user edit of a listing's filter controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterChange {
    /// Lost/found/all tab.
    Type(TypeFilter),
    /// Status dropdown.
    Status(StatusFilter),
    /// Search box content, untrimmed.
    Search(String),
    /// Sort dropdown.
    Sort(SortOrder),
    /// Page navigation.
    Page(u32),
}

/// When a change should reach the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Fetch right away.
    Immediate,
    /// Fetch after the debounce delay.
    Debounced,
}

impl FilterChange {
    /// How this change is scheduled.
    #[must_use]
    pub const fn trigger(&self) -> Trigger {
        match self {
            Self::Search(_) => Trigger::Debounced,
            _ => Trigger::Immediate,
        }
    }

    /// Applies the change. Criteria that change the server-side result set
    /// (type, status, search) move the cursor back to page 1.
    ///
    /// Returns `false` if the filter and cursor are unchanged.
    pub fn apply(self, filter: &mut ListingFilter, mut pagination: Option<&mut Pagination>) -> bool {
        let before = (filter.clone(), pagination.as_deref().copied());
        let narrows = !matches!(self, Self::Sort(_) | Self::Page(_));
        match self {
            Self::Type(t) => filter.item_type = t,
            Self::Status(s) => filter.status = s,
            Self::Search(text) => filter.search = text.trim().to_string(),
            Self::Sort(order) => filter.sort = order,
            Self::Page(page) => {
                if let Some(cursor) = pagination.as_deref_mut() {
                    let _ = cursor.go_to(page);
                }
            }
        }
        if narrows && *filter != before.0 {
            if let Some(cursor) = pagination.as_deref_mut() {
                cursor.reset();
            }
        }
        (filter.clone(), pagination.as_deref().copied()) != before
    }
}

/// Drives `service` from a stream of filter edits until `changes` closes.
///
/// Fetches once on start (view mount). When a committed total clamps the
/// cursor, the clamped page is fetched.
///
/// Closing `changes` ends editing, not the view: a search still inside its
/// debounce window is fetched at once and fetches in flight are awaited.
/// Tearing the view down is [`ListingService::detach`], which stops their
/// commits without aborting the requests. Returns the final filter.
pub async fn run_listing_driver<S: ItemSource>(
    service: &ListingService<S>,
    mut filter: ListingFilter,
    mut pagination: Option<Pagination>,
    mut changes: mpsc::Receiver<FilterChange>,
    delay: Duration,
) -> ListingFilter {
    let mut debouncer = Debouncer::new(delay);
    let mut in_flight = FuturesUnordered::new();
    in_flight.push(fetch_snapshot(service, filter.clone(), pagination));

    loop {
        tokio::select! {
            change = changes.recv() => {
                let Some(change) = change else {
                    break;
                };
                match change {
                    FilterChange::Search(text) => debouncer.push(text),
                    other => {
                        tracing::debug!(change = ?other, "filter changed");
                        if other.apply(&mut filter, pagination.as_mut()) {
                            in_flight.push(fetch_snapshot(service, filter.clone(), pagination));
                        }
                    }
                }
            }
            text = debouncer.ready() => {
                if FilterChange::Search(text).apply(&mut filter, pagination.as_mut()) {
                    tracing::debug!(search = %filter.search, "search settled");
                    in_flight.push(fetch_snapshot(service, filter.clone(), pagination));
                }
            }
            Some(outcome) = in_flight.next(), if !in_flight.is_empty() => {
                if clamps_cursor(outcome, pagination.as_mut()) {
                    in_flight.push(fetch_snapshot(service, filter.clone(), pagination));
                }
            }
        }
    }

    if let Some(text) = debouncer.flush() {
        if FilterChange::Search(text).apply(&mut filter, pagination.as_mut()) {
            tracing::debug!(search = %filter.search, "input closed, fetching pending search");
            in_flight.push(fetch_snapshot(service, filter.clone(), pagination));
        }
    }
    while let Some(outcome) = in_flight.next().await {
        if clamps_cursor(outcome, pagination.as_mut()) {
            in_flight.push(fetch_snapshot(service, filter.clone(), pagination));
        }
    }
    filter
}

/// Records a committed total on the cursor. Returns `true` if the fetched
/// page lay past the end and the clamped page must be fetched.
fn clamps_cursor(outcome: FetchOutcome, pagination: Option<&mut Pagination>) -> bool {
    match (outcome, pagination) {
        (
            FetchOutcome::Committed {
                total: Some(total),
                ok: true,
            },
            Some(cursor),
        ) => cursor.set_total(total),
        _ => false,
    }
}

async fn fetch_snapshot<S: ItemSource>(
    service: &ListingService<S>,
    filter: ListingFilter,
    pagination: Option<Pagination>,
) -> FetchOutcome {
    service.fetch(&filter, pagination.as_ref()).await
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::time::Duration;

    use tokio::time::sleep;

    use super::*;
    use crate::domain::{ItemStatus, ItemType};
    use crate::service::fake::FakeSource;

    const DELAY: Duration = Duration::from_millis(500);

    #[tokio::test(start_paused = true)]
    async fn keystroke_burst_fetches_once_with_final_text() {
        let service = ListingService::new(FakeSource::new());
        let (tx, rx) = mpsc::channel(16);
        let script = async move {
            for text in ["a", "ab", "abc"] {
                sleep(Duration::from_millis(100)).await;
                let _ = tx.send(FilterChange::Search(text.to_string())).await;
            }
            sleep(Duration::from_secs(1)).await;
        };

        let (filter, ()) = tokio::join!(
            run_listing_driver(&service, ListingFilter::default(), None, rx, DELAY),
            script
        );

        assert_eq!(filter.search, "abc");
        let calls = service.source().calls.lock().await.clone();
        let searches: Vec<_> = calls.iter().map(|(s, _, _)| s.as_str()).collect();
        assert_eq!(searches, vec!["", "abc"]);
        let Some((_, _, at)) = calls.get(1) else {
            panic!("debounced fetch recorded");
        };
        assert!(*at >= Duration::from_millis(800), "fetched early: {at:?}");
        assert!(*at < Duration::from_millis(810), "fetched late: {at:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn type_change_fetches_immediately_and_resets_page() {
        let service = ListingService::new(FakeSource::new().with_items(Vec::new(), Some(95)));
        let (tx, rx) = mpsc::channel(16);
        let script = async move {
            sleep(Duration::from_millis(10)).await;
            let _ = tx.send(FilterChange::Page(3)).await;
            sleep(Duration::from_millis(10)).await;
            let _ = tx.send(FilterChange::Type(TypeFilter::Only(ItemType::Lost))).await;
            sleep(Duration::from_millis(10)).await;
        };

        let (filter, ()) = tokio::join!(
            run_listing_driver(
                &service,
                ListingFilter::default(),
                Some(Pagination::new(30)),
                rx,
                DELAY
            ),
            script
        );

        assert_eq!(filter.item_type, TypeFilter::Only(ItemType::Lost));
        let calls = service.source().calls.lock().await.clone();
        let times: Vec<_> = calls.iter().map(|(_, _, at)| at.as_millis()).collect();
        assert_eq!(times, vec![0, 10, 20]);
        let pages: Vec<_> = calls.iter().map(|(_, page, _)| *page).collect();
        assert_eq!(pages, vec![Some(1), Some(3), Some(1)]);
    }

    #[tokio::test(start_paused = true)]
    async fn closed_input_fetches_pending_search() {
        let service = ListingService::new(FakeSource::new());
        let (tx, rx) = mpsc::channel(16);
        let script = async move {
            let _ = tx.send(FilterChange::Search("wallet".to_string())).await;
        };

        let (filter, ()) = tokio::join!(
            run_listing_driver(&service, ListingFilter::default(), None, rx, DELAY),
            script
        );

        assert_eq!(filter.search, "wallet");
        assert_eq!(service.source().searches().await, vec!["", "wallet"]);
        let titles: Vec<_> = service.items().into_iter().map(|i| i.title).collect();
        assert_eq!(titles, vec!["wallet"]);
    }

    #[tokio::test(start_paused = true)]
    async fn closed_input_awaits_fetch_in_flight() {
        let service =
            ListingService::new(FakeSource::new().with_delay("", Duration::from_millis(300)));
        let (tx, rx) = mpsc::channel::<FilterChange>(16);
        drop(tx);

        let _ = run_listing_driver(&service, ListingFilter::default(), None, rx, DELAY).await;

        assert_eq!(service.items().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn page_change_fetches_while_total_unknown() {
        let service = ListingService::new(FakeSource::new());
        let (tx, rx) = mpsc::channel(16);
        let script = async move {
            sleep(Duration::from_millis(10)).await;
            let _ = tx.send(FilterChange::Page(2)).await;
            sleep(Duration::from_millis(10)).await;
        };

        let _ = tokio::join!(
            run_listing_driver(
                &service,
                ListingFilter::default(),
                Some(Pagination::new(10)),
                rx,
                DELAY
            ),
            script
        );

        assert_eq!(service.source().pages().await, vec![Some(1), Some(2)]);
    }

    #[tokio::test(start_paused = true)]
    async fn page_past_end_is_refetched_at_last_page() {
        let service = ListingService::new(FakeSource::new().with_items(Vec::new(), Some(25)));
        let (tx, rx) = mpsc::channel::<FilterChange>(16);
        drop(tx);

        let _ = run_listing_driver(
            &service,
            ListingFilter::default(),
            Some(Pagination::requested(5, 10)),
            rx,
            DELAY,
        )
        .await;

        assert_eq!(service.source().pages().await, vec![Some(5), Some(3)]);
    }

    #[tokio::test(start_paused = true)]
    async fn settled_search_equal_to_current_does_not_refetch() {
        let service = ListingService::new(FakeSource::new());
        let (tx, rx) = mpsc::channel(16);
        let script = async move {
            let _ = tx.send(FilterChange::Search("  ".to_string())).await;
            sleep(Duration::from_secs(1)).await;
        };
        let _ = tokio::join!(
            run_listing_driver(&service, ListingFilter::default(), None, rx, DELAY),
            script
        );
        assert_eq!(service.source().searches().await, vec![""]);
    }

    #[test]
    fn search_is_debounced_everything_else_immediate() {
        assert_eq!(FilterChange::Search("x".into()).trigger(), Trigger::Debounced);
        assert_eq!(FilterChange::Sort(SortOrder::Oldest).trigger(), Trigger::Immediate);
        assert_eq!(FilterChange::Page(2).trigger(), Trigger::Immediate);
    }

    #[test]
    fn sort_change_keeps_page() {
        let mut filter = ListingFilter::default();
        let mut cursor = Pagination::requested(3, 10);
        assert!(FilterChange::Sort(SortOrder::Oldest).apply(&mut filter, Some(&mut cursor)));
        assert_eq!(cursor.page(), 3);
        let claimed = FilterChange::Status(StatusFilter::Only(ItemStatus::Claimed));
        assert!(claimed.apply(&mut filter, Some(&mut cursor)));
        assert_eq!(cursor.page(), 1);
    }
}
