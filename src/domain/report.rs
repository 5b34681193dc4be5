//! Report submission and edit payloads.
//!
//! [`NewItem`] is the content of the "report a lost/found item" form,
//! [`ItemUpdate`] the content of the edit form. Both are validated here and
//! turned into request bodies by [`crate::api::ItemsApi`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::{Item, ItemType};
use crate::error::ClientError;

/// Description sent when the reporter leaves the field empty.
pub const DEFAULT_DESCRIPTION: &str = "Tidak ada deskripsi tambahan.";

/// Photo attached to a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUpload {
    /// Original file name.
    pub file_name: String,
    /// MIME type, e.g. `image/jpeg`.
    pub content_type: String,
    /// File content.
    pub bytes: Vec<u8>,
}

impl PhotoUpload {
    /// Creates an upload, guessing the MIME type from the file extension.
    #[must_use]
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = mime_guess::from_path(&file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Self {
            file_name,
            content_type,
            bytes,
        }
    }
}

/// Content of a new lost-or-found report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    /// Which listing the report belongs to.
    pub item_type: ItemType,
    /// Item name.
    pub title: String,
    /// Where the item was lost or found.
    pub location: String,
    /// Calendar date of the loss or find.
    pub date: Option<NaiveDate>,
    /// Optional free-text description.
    pub description: String,
    /// How to reach the reporter.
    pub contact: String,
    /// Optional item photo.
    pub photo: Option<PhotoUpload>,
    /// Optional photo of the location.
    pub location_photo: Option<PhotoUpload>,
}

impl NewItem {
    /// Empty report of the given type.
    #[must_use]
    pub fn new(item_type: ItemType) -> Self {
        Self {
            item_type,
            title: String::new(),
            location: String::new(),
            date: None,
            description: String::new(),
            contact: String::new(),
            photo: None,
            location_photo: None,
        }
    }

    /// Checks required fields and photo sizes.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] listing every missing field, or
    /// [`ClientError::InvalidInput`] when a photo exceeds `max_upload_bytes`.
    pub fn validate(&self, max_upload_bytes: u64) -> Result<(), ClientError> {
        let mut missing = Vec::new();
        if self.title.trim().is_empty() {
            missing.push("title".to_string());
        }
        if self.location.trim().is_empty() {
            missing.push("location".to_string());
        }
        if self.contact.trim().is_empty() {
            missing.push("contact".to_string());
        }
        if self.date.is_none() {
            missing.push("date".to_string());
        }
        if !missing.is_empty() {
            return Err(ClientError::Validation(missing));
        }
        for photo in [&self.photo, &self.location_photo].into_iter().flatten() {
            check_size(photo, max_upload_bytes)?;
        }
        Ok(())
    }

    /// Text fields of the multipart body, in submission order.
    ///
    /// The date is sent as an RFC 3339 timestamp at UTC midnight; an empty
    /// description is replaced by [`DEFAULT_DESCRIPTION`].
    #[must_use]
    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        let description = if self.description.trim().is_empty() {
            DEFAULT_DESCRIPTION.to_string()
        } else {
            self.description.trim().to_string()
        };
        let date = self
            .date
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))
            .map(|dt| dt.to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
            .unwrap_or_default();
        vec![
            ("title", self.title.trim().to_string()),
            ("location", self.location.trim().to_string()),
            ("date", date),
            ("description", description),
            ("contact_info", self.contact.trim().to_string()),
            ("type", self.item_type.as_str().to_string()),
        ]
    }
}

/// Content of the edit form of an existing item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemUpdate {
    /// Item name.
    pub title: String,
    /// Free-text description.
    pub description: String,
    /// Category.
    pub item_type: ItemType,
    /// Where the item was lost or found.
    pub location: String,
    /// Calendar date as `YYYY-MM-DD`, empty when unknown.
    pub date: String,
    /// How to reach the reporter.
    pub contact_info: String,
    /// Replacement photo; switches the request to multipart.
    #[serde(skip)]
    pub photo: Option<PhotoUpload>,
}

impl ItemUpdate {
    /// Pre-fills the edit form from the current record.
    #[must_use]
    pub fn from_item(item: &Item) -> Self {
        Self {
            title: item.title.clone(),
            description: item.description.clone(),
            item_type: item.item_type.unwrap_or(ItemType::Lost),
            location: item.location.clone(),
            date: item
                .date
                .as_deref()
                .and_then(super::item::parse_timestamp)
                .map(|dt| dt.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            contact_info: item.contact.clone().unwrap_or_default(),
            photo: None,
        }
    }

    /// Checks the title and the replacement photo size.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] if the title is blank, or
    /// [`ClientError::InvalidInput`] when the photo exceeds
    /// `max_upload_bytes`.
    pub fn validate(&self, max_upload_bytes: u64) -> Result<(), ClientError> {
        if self.title.trim().is_empty() {
            return Err(ClientError::Validation(vec!["title".to_string()]));
        }
        if let Some(photo) = &self.photo {
            check_size(photo, max_upload_bytes)?;
        }
        Ok(())
    }

    /// Text fields of the multipart body when a photo is attached.
    #[must_use]
    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("title", self.title.clone()),
            ("description", self.description.clone()),
            ("item_type", self.item_type.as_str().to_string()),
            ("location", self.location.clone()),
            ("date", self.date.clone()),
            ("contact_info", self.contact_info.clone()),
        ]
    }
}

fn check_size(photo: &PhotoUpload, max_upload_bytes: u64) -> Result<(), ClientError> {
    if photo.bytes.len() as u64 > max_upload_bytes {
        return Err(ClientError::InvalidInput(format!(
            "{} is too large (max {} MB)",
            photo.file_name,
            max_upload_bytes / (1024 * 1024)
        )));
    }
    Ok(())
}
