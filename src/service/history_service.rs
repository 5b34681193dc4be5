//! Audit trail views: the per-item timeline and the admin-wide browser.

use super::HistorySource;
use crate::api::ListPage;
use crate::domain::{
    DiffScope, HistoryAction, HistoryFilter, HistoryRecord, HistoryView, ItemId, Pagination,
};
use crate::error::ClientError;

/// One rendered timeline row.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    /// The audit record as received.
    pub record: HistoryRecord,
    /// What the row shows for it.
    pub view: HistoryView,
}

/// Timeline of a single item.
#[derive(Debug)]
pub struct ItemHistory<H> {
    source: H,
    limit: u32,
    scope: DiffScope,
}

impl<H: HistorySource> ItemHistory<H> {
    /// Loads up to `limit` records per item, diffing over all keys.
    #[must_use]
    pub fn new(source: H, limit: u32) -> Self {
        Self {
            source,
            limit,
            scope: DiffScope::default(),
        }
    }

    /// Overrides which snapshot keys are diffed.
    #[must_use]
    pub const fn with_scope(mut self, scope: DiffScope) -> Self {
        self.scope = scope;
        self
    }

    /// Fetches and renders an item's history.
    ///
    /// # Errors
    ///
    /// Returns the source's [`ClientError`].
    pub async fn load(&self, id: &ItemId) -> Result<Vec<HistoryEntry>, ClientError> {
        let page = self.source.item_history(id, self.limit, 0).await?;
        tracing::debug!(item_id = %id, records = page.records.len(), "item history loaded");
        Ok(page
            .records
            .into_iter()
            .map(|record| {
                let view = record.view(self.scope);
                HistoryEntry { record, view }
            })
            .collect())
    }
}

/// Paginated, filterable admin history.
///
/// Changing a filter returns to page 1; the page count comes from the
/// server-reported total.
#[derive(Debug)]
pub struct AdminHistoryBrowser<H> {
    source: H,
    filter: HistoryFilter,
    pagination: Pagination,
    records: Vec<HistoryRecord>,
}

impl<H: HistorySource> AdminHistoryBrowser<H> {
    /// Creates a browser on page 1 with no filters.
    #[must_use]
    pub fn new(source: H, page_limit: u32) -> Self {
        Self {
            source,
            filter: HistoryFilter::default(),
            pagination: Pagination::new(page_limit),
            records: Vec::new(),
        }
    }

    /// Current filters.
    #[must_use]
    pub const fn filter(&self) -> &HistoryFilter {
        &self.filter
    }

    /// Current cursor.
    #[must_use]
    pub const fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    /// Records of the last loaded page.
    #[must_use]
    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    /// Filters by action (`None` for all) and returns to page 1.
    pub fn set_action(&mut self, action: Option<HistoryAction>) {
        self.filter.action = action;
        self.pagination.reset();
    }

    /// Filters by actor and returns to page 1.
    pub fn set_changed_by(&mut self, changed_by: impl Into<String>) {
        self.filter.changed_by = changed_by.into();
        self.pagination.reset();
    }

    /// Jumps to `page`, clamped to the known page range. Returns `true` if
    /// the page changed and a reload is due.
    pub fn go_to(&mut self, page: u32) -> bool {
        self.pagination.go_to(page)
    }

    /// Next page; `false` on the last page.
    pub fn next(&mut self) -> bool {
        self.pagination.next()
    }

    /// Previous page; `false` on the first page.
    pub fn prev(&mut self) -> bool {
        self.pagination.prev()
    }

    /// Positions the cursor on `page` before the total is known.
    pub fn request_page(&mut self, page: u32) {
        self.pagination = Pagination::requested(page, self.pagination.limit());
    }

    /// Fetches the current page and records the server total. A requested
    /// page past the end is clamped by that total and the clamped page is
    /// fetched instead.
    ///
    /// # Errors
    ///
    /// Returns the source's [`ClientError`]; the previous page is cleared.
    pub async fn load(&mut self) -> Result<&[HistoryRecord], ClientError> {
        self.records.clear();
        let mut page = self.fetch_current().await?;
        if self.pagination.set_total(page.total.unwrap_or(page.records.len() as u64)) {
            tracing::debug!(
                page = self.pagination.page(),
                "history page past the end, loading last page"
            );
            page = self.fetch_current().await?;
            if let Some(total) = page.total {
                let _ = self.pagination.set_total(total);
            }
        }
        self.records = page.records;
        Ok(&self.records)
    }

    async fn fetch_current(&self) -> Result<ListPage<HistoryRecord>, ClientError> {
        self.source
            .all_history(&self.filter, self.pagination.limit(), self.pagination.offset())
            .await
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::service::fake::{FAILING_ID, FakeHistory};

    fn record(value: serde_json::Value) -> HistoryRecord {
        let Ok(record) = serde_json::from_value(value) else {
            panic!("valid record");
        };
        record
    }

    fn many(n: u64) -> Vec<HistoryRecord> {
        (1..=n)
            .map(|id| record(json!({"id": id, "action": "updated", "changed_by": "1"})))
            .collect()
    }

    #[tokio::test]
    async fn item_history_renders_union_diff() {
        let source = FakeHistory {
            records: vec![record(json!({
                "id": 1,
                "action": "updated",
                "old_data": {"title": "Bag"},
                "new_data": {"title": "Bag", "location": "Gate"}
            }))],
            ..FakeHistory::default()
        };
        let Ok(entries) = ItemHistory::new(source, 50).load(&ItemId::from("4")).await else {
            panic!("history loads");
        };
        let Some(HistoryEntry {
            view: HistoryView::Changes(changes),
            ..
        }) = entries.first()
        else {
            panic!("update renders as changes");
        };
        let fields: Vec<_> = changes.iter().map(|c| c.field.as_str()).collect();
        assert_eq!(fields, vec!["location"]);
    }

    #[tokio::test]
    async fn item_history_error_is_returned() {
        let history = ItemHistory::new(FakeHistory::default(), 50);
        let Err(err) = history.load(&ItemId::from(FAILING_ID)).await else {
            panic!("history should fail");
        };
        assert!(err.user_message().starts_with("Could not reach the server"));
    }

    #[tokio::test]
    async fn browser_pages_by_server_total() {
        let source = FakeHistory {
            records: many(95),
            ..FakeHistory::default()
        };
        let mut browser = AdminHistoryBrowser::new(source, 30);
        let Ok(rows) = browser.load().await else {
            panic!("page 1 loads");
        };
        assert_eq!(rows.len(), 30);
        assert_eq!(browser.pagination().page_count(), 4);

        assert!(browser.go_to(5));
        assert_eq!(browser.pagination().page(), 4);
        let Ok(rows) = browser.load().await else {
            panic!("page 4 loads");
        };
        assert_eq!(rows.len(), 5);
        assert!(!browser.next());
    }

    #[tokio::test]
    async fn filter_change_returns_to_first_page() {
        let source = FakeHistory {
            records: many(95),
            ..FakeHistory::default()
        };
        let mut browser = AdminHistoryBrowser::new(source, 30);
        let _ = browser.load().await;
        assert!(browser.next());
        browser.set_action(Some(HistoryAction::Deleted));
        assert_eq!(browser.pagination().page(), 1);
        let _ = browser.load().await;

        let calls = browser.source.calls.lock().await.clone();
        assert_eq!(
            calls.last(),
            Some(&(Some("deleted".to_string()), String::new(), 30, 0))
        );
    }

    #[tokio::test]
    async fn requested_page_past_end_loads_last_page() {
        let source = FakeHistory {
            records: many(95),
            ..FakeHistory::default()
        };
        let mut browser = AdminHistoryBrowser::new(source, 30);
        browser.request_page(5);
        let Ok(rows) = browser.load().await else {
            panic!("last page loads");
        };
        assert_eq!(rows.len(), 5);
        assert_eq!(browser.pagination().page(), 4);

        let offsets: Vec<_> = browser
            .source
            .calls
            .lock()
            .await
            .iter()
            .map(|(_, _, _, offset)| *offset)
            .collect();
        assert_eq!(offsets, vec![120, 90]);
    }
}
