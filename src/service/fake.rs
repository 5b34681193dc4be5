//! In-memory sources for service tests.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use super::{HistorySource, ItemModerator, ItemSource};
use crate::api::ListPage;
use crate::domain::{
    HistoryFilter, HistoryRecord, Item, ItemId, ItemStatus, ListingFilter, Pagination,
};
use crate::error::ClientError;

/// Search text that makes [`FakeSource::list_items`] fail.
pub(crate) const FAILING_SEARCH: &str = "boom";

/// Item id that makes moderation calls fail.
pub(crate) const FAILING_ID: &str = "locked";

/// Answers every listing with one item titled after the search text, after
/// a per-search delay.
#[derive(Debug)]
pub(crate) struct FakeSource {
    start: Instant,
    delays: HashMap<String, Duration>,
    items: Vec<Item>,
    total: Option<u64>,
    /// `(search, page, elapsed)` of every listing call.
    pub(crate) calls: Mutex<Vec<(String, Option<u32>, Duration)>>,
    /// Every moderation call, formatted.
    pub(crate) moderation: Mutex<Vec<String>>,
}

impl FakeSource {
    pub(crate) fn new() -> Self {
        Self {
            start: Instant::now(),
            delays: HashMap::new(),
            items: Vec::new(),
            total: None,
            calls: Mutex::new(Vec::new()),
            moderation: Mutex::new(Vec::new()),
        }
    }

    /// Delays answers for `search` by `delay`.
    pub(crate) fn with_delay(mut self, search: &str, delay: Duration) -> Self {
        self.delays.insert(search.to_string(), delay);
        self
    }

    /// Answers with `items` instead of the search-titled item.
    pub(crate) fn with_items(mut self, items: Vec<Item>, total: Option<u64>) -> Self {
        self.items = items;
        self.total = total;
        self
    }

    pub(crate) async fn searches(&self) -> Vec<String> {
        self.calls.lock().await.iter().map(|(s, _, _)| s.clone()).collect()
    }

    pub(crate) async fn pages(&self) -> Vec<Option<u32>> {
        self.calls.lock().await.iter().map(|(_, page, _)| *page).collect()
    }
}

impl ItemSource for FakeSource {
    async fn list_items(
        &self,
        filter: &ListingFilter,
        page: Option<&Pagination>,
    ) -> Result<ListPage<Item>, ClientError> {
        self.calls.lock().await.push((
            filter.search.clone(),
            page.map(Pagination::page),
            self.start.elapsed(),
        ));
        if let Some(delay) = self.delays.get(&filter.search) {
            tokio::time::sleep(*delay).await;
        }
        if filter.search == FAILING_SEARCH {
            return Err(ClientError::Status {
                status: 500,
                message: "Failed to fetch items".to_string(),
            });
        }
        let records = if self.items.is_empty() {
            vec![Item::new(filter.search.clone(), filter.search.clone())]
        } else {
            self.items.clone()
        };
        Ok(ListPage {
            records,
            total: self.total,
        })
    }
}

impl ItemModerator for FakeSource {
    async fn delete_item(&self, id: &ItemId) -> Result<(), ClientError> {
        self.moderation.lock().await.push(format!("delete {id}"));
        if id.as_str() == FAILING_ID {
            return Err(ClientError::Status {
                status: 403,
                message: "Failed to delete item".to_string(),
            });
        }
        Ok(())
    }

    async fn set_item_status(&self, id: &ItemId, status: &ItemStatus) -> Result<(), ClientError> {
        self.moderation
            .lock()
            .await
            .push(format!("status {id} {}", status.as_wire()));
        if id.as_str() == FAILING_ID {
            return Err(ClientError::Status {
                status: 403,
                message: "Failed to update item status".to_string(),
            });
        }
        Ok(())
    }
}

/// Serves a fixed set of history records with the window applied locally.
#[derive(Debug, Default)]
pub(crate) struct FakeHistory {
    pub(crate) records: Vec<HistoryRecord>,
    /// `(action, changed_by, limit, offset)` of every admin call.
    pub(crate) calls: Mutex<Vec<(Option<String>, String, u32, u64)>>,
}

impl FakeHistory {
    fn window(&self, limit: u32, offset: u64) -> ListPage<HistoryRecord> {
        let start = usize::try_from(offset).unwrap_or(usize::MAX);
        let records = self
            .records
            .iter()
            .skip(start)
            .take(limit as usize)
            .cloned()
            .collect();
        ListPage {
            records,
            total: Some(self.records.len() as u64),
        }
    }
}

impl HistorySource for FakeHistory {
    async fn item_history(
        &self,
        id: &ItemId,
        limit: u32,
        offset: u64,
    ) -> Result<ListPage<HistoryRecord>, ClientError> {
        if id.as_str() == FAILING_ID {
            return Err(ClientError::Transport("connection refused".to_string()));
        }
        Ok(self.window(limit, offset))
    }

    async fn all_history(
        &self,
        filter: &HistoryFilter,
        limit: u32,
        offset: u64,
    ) -> Result<ListPage<HistoryRecord>, ClientError> {
        self.calls.lock().await.push((
            filter.action.as_ref().map(|a| a.as_wire().to_string()),
            filter.changed_by.clone(),
            limit,
            offset,
        ));
        Ok(self.window(limit, offset))
    }
}
