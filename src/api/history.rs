//! Audit trail endpoints.

use super::ApiClient;
use super::dto::{ListPage, normalize_list};
use crate::domain::{HistoryFilter, HistoryRecord, ItemId};
use crate::error::ClientError;

/// Typed access to the item history endpoints.
#[derive(Debug, Clone)]
pub struct HistoryApi {
    client: ApiClient,
}

impl HistoryApi {
    /// Wraps a configured client.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// History of one item, newest first as returned by the service.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] on transport, status or decode failure.
    pub async fn item_history(
        &self,
        id: &ItemId,
        limit: u32,
        offset: u64,
    ) -> Result<ListPage<HistoryRecord>, ClientError> {
        let query = [("limit", limit.to_string()), ("offset", offset.to_string())];
        let body = self
            .client
            .get(
                &["items", id.as_str(), "history"],
                &query,
                "Failed to fetch item history",
            )
            .await?;
        normalize_list(unwrap_nested(body))
    }

    /// Admin-wide history across every item.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] on transport, status or decode failure.
    pub async fn all_history(
        &self,
        filter: &HistoryFilter,
        limit: u32,
        offset: u64,
    ) -> Result<ListPage<HistoryRecord>, ClientError> {
        let body = self
            .client
            .get(
                &["items", "admin", "history", "all"],
                &filter.query_params(limit, offset),
                "Failed to fetch history",
            )
            .await?;
        let page = normalize_list(unwrap_nested(body))?;
        tracing::debug!(records = page.records.len(), total = ?page.total, "history fetched");
        Ok(page)
    }
}

/// The history endpoints wrap their page one level deeper:
/// `{ "data": { "data": [...], "total": n } }`. Lift the inner page so the
/// common list normalization applies.
fn unwrap_nested(body: serde_json::Value) -> serde_json::Value {
    match body {
        serde_json::Value::Object(mut map)
            if map.get("data").is_some_and(serde_json::Value::is_object) =>
        {
            map.remove("data").unwrap_or_default()
        }
        other => other,
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;

    use axum::extract::RawQuery;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;

    use super::*;
    use crate::api::fake::{recorder, serve};
    use crate::domain::HistoryAction;

    #[tokio::test]
    async fn item_history_reads_nested_page() {
        let router = Router::new().route(
            "/api/items/{id}/history",
            get(|| async {
                Json(json!({"success": true, "data": {"data": [
                    {"id": 1, "action": "created", "changed_by": 2, "new_data": {"title": "Bag"}}
                ], "total": 1}}))
            }),
        );
        let api = HistoryApi::new(serve(router).await);
        let Ok(page) = api.item_history(&ItemId::from("4"), 50, 0).await else {
            panic!("history should load");
        };
        assert_eq!(page.total, Some(1));
        let Some(record) = page.records.first() else {
            panic!("one record");
        };
        assert_eq!(record.action, HistoryAction::Created);
        assert_eq!(record.changed_by, "2");
    }

    #[tokio::test]
    async fn all_history_sends_filters_and_window() {
        let seen = recorder();
        let log = Arc::clone(&seen);
        let router = Router::new().route(
            "/api/items/admin/history/all",
            get(move |RawQuery(query): RawQuery| async move {
                log.lock().await.push(query.unwrap_or_default());
                Json(json!({"data": [], "total": 95}))
            }),
        );
        let api = HistoryApi::new(serve(router).await);
        let filter = HistoryFilter {
            action: Some(HistoryAction::Deleted),
            changed_by: String::new(),
        };
        let Ok(page) = api.all_history(&filter, 30, 60).await else {
            panic!("history should load");
        };
        assert_eq!(page.total, Some(95));
        assert_eq!(
            seen.lock().await.as_slice(),
            ["action=deleted&limit=30&offset=60"]
        );
    }
}
