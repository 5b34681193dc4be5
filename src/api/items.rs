//! Item endpoints: listing, detail, reporting, editing and moderation.

use reqwest::Method;
use reqwest::multipart::{Form, Part};

use super::ApiClient;
use super::dto::{ListPage, StatusUpdateRequest, normalize_items, normalize_single};
use crate::domain::{
    Item, ItemId, ItemStatus, ItemUpdate, ListingFilter, ListingStats, NewItem, Pagination,
    PhotoUpload, StatusFilter, TypeFilter,
};
use crate::error::ClientError;

const ITEMS: &str = "items";

/// Typed access to `/items`.
#[derive(Debug, Clone)]
pub struct ItemsApi {
    client: ApiClient,
    max_upload_bytes: u64,
}

impl ItemsApi {
    /// Wraps a configured client. Photos larger than `max_upload_bytes` are
    /// rejected before any request is made.
    #[must_use]
    pub const fn new(client: ApiClient, max_upload_bytes: u64) -> Self {
        Self {
            client,
            max_upload_bytes,
        }
    }

    /// Fetches one listing page for `filter`.
    ///
    /// Only non-default criteria are sent; `page` adds `page` and `limit`.
    /// Records missing a type are tagged with the filter's type.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] on transport, status or decode failure.
    pub async fn list(
        &self,
        filter: &ListingFilter,
        page: Option<&Pagination>,
    ) -> Result<ListPage<Item>, ClientError> {
        let query = filter.query_params(page.map(Pagination::page), page.map(Pagination::limit));
        let body = self.client.get(&[ITEMS], &query, "Failed to fetch items").await?;
        let page = normalize_items(body, filter.item_type)?;
        tracing::debug!(records = page.records.len(), total = ?page.total, "items fetched");
        Ok(page)
    }

    /// Fetches one item.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] when the service answers with no
    /// record, or any other [`ClientError`] on failure.
    pub async fn get(&self, id: &ItemId) -> Result<Item, ClientError> {
        let body = self
            .client
            .get(&[ITEMS, id.as_str()], &[], "Failed to fetch item")
            .await?;
        normalize_single(body)?.ok_or_else(|| ClientError::NotFound(id.to_string()))
    }

    /// Submits a new report as a multipart form.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] or [`ClientError::InvalidInput`]
    /// before sending when the report is incomplete, otherwise any
    /// [`ClientError`] from the request.
    pub async fn create(&self, report: &NewItem) -> Result<Item, ClientError> {
        report.validate(self.max_upload_bytes)?;
        let mut form = text_form(report.text_fields());
        if let Some(photo) = &report.photo {
            form = form.part("photo", file_part(photo)?);
        }
        if let Some(photo) = &report.location_photo {
            form = form.part("location_photo", file_part(photo)?);
        }
        let body = self
            .client
            .send_multipart(Method::POST, &[ITEMS], form, "Failed to create item")
            .await?;
        let item = normalize_single::<Item>(body)?
            .ok_or_else(|| ClientError::Decode("create returned no item".to_string()))?;
        tracing::info!(item_id = %item.id, item_type = report.item_type.as_str(), "item reported");
        Ok(item)
    }

    /// Saves an edit. Sent as JSON, or as multipart when a replacement photo
    /// is attached.
    ///
    /// Returns the updated record when the service echoes it.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] on validation or request failure.
    pub async fn update(&self, id: &ItemId, update: &ItemUpdate) -> Result<Option<Item>, ClientError> {
        update.validate(self.max_upload_bytes)?;
        let segments = [ITEMS, id.as_str()];
        let body = match &update.photo {
            Some(photo) => {
                let form = text_form(update.text_fields()).part("photo", file_part(photo)?);
                self.client
                    .send_multipart(Method::PUT, &segments, form, "Failed to update item")
                    .await?
            }
            None => {
                self.client
                    .send_json(Method::PUT, &segments, update, "Failed to update item")
                    .await?
            }
        };
        tracing::info!(item_id = %id, "item updated");
        normalize_single(body)
    }

    /// Moves an item to `status`.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] if the service rejects the transition.
    pub async fn update_status(&self, id: &ItemId, status: &ItemStatus) -> Result<(), ClientError> {
        let body = StatusUpdateRequest {
            status: status.clone(),
        };
        self.client
            .send_json(
                Method::PUT,
                &[ITEMS, id.as_str(), "status"],
                &body,
                "Failed to update item status",
            )
            .await?;
        tracing::info!(item_id = %id, status = status.as_wire(), "item status updated");
        Ok(())
    }

    /// Deletes an item.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] if the service refuses the deletion.
    pub async fn delete(&self, id: &ItemId) -> Result<(), ClientError> {
        self.client
            .delete(&[ITEMS, id.as_str()], "Failed to delete item")
            .await?;
        tracing::info!(item_id = %id, "item deleted");
        Ok(())
    }

    /// Lists the caller's own reports.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] on transport, status or decode failure.
    pub async fn my_items(
        &self,
        item_type: TypeFilter,
        status: StatusFilter,
    ) -> Result<ListPage<Item>, ClientError> {
        let filter = ListingFilter {
            item_type,
            status,
            ..ListingFilter::default()
        };
        let query = filter.query_params(None, None);
        let body = self
            .client
            .get(&[ITEMS, "me", "items"], &query, "Failed to fetch your items")
            .await?;
        normalize_items(body, item_type)
    }

    /// Dashboard counters. Any failure yields zeroed stats.
    pub async fn stats(&self) -> ListingStats {
        let result = self
            .client
            .get(&[ITEMS, "stats"], &[], "Failed to fetch stats")
            .await
            .and_then(normalize_single::<ListingStats>);
        match result {
            Ok(stats) => stats.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "stats unavailable, showing zeros");
                ListingStats::default()
            }
        }
    }
}

fn text_form(fields: Vec<(&'static str, String)>) -> Form {
    fields
        .into_iter()
        .fold(Form::new(), |form, (name, value)| form.text(name, value))
}

fn file_part(photo: &PhotoUpload) -> Result<Part, ClientError> {
    Part::bytes(photo.bytes.clone())
        .file_name(photo.file_name.clone())
        .mime_str(&photo.content_type)
        .map_err(|e| ClientError::InvalidInput(format!("{}: {e}", photo.file_name)))
}
