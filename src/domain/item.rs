//! Item report record and its enumerations.
//!
//! [`Item`] mirrors one lost-or-found report as the service returns it. The
//! service is loose about field names (`name` vs `title`, `contact` vs
//! `contact_info`, three names for the photo), so the record accepts every
//! alias it has been seen to emit.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::ItemId;

/// Category discriminator: which listing an item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    /// Reported as lost by its owner.
    Lost,
    /// Reported as found by a finder.
    Found,
}

impl ItemType {
    /// Wire value (`"lost"` / `"found"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lost => "lost",
            Self::Found => "found",
        }
    }

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Lost => "Lost",
            Self::Found => "Found",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ItemType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lost" => Ok(Self::Lost),
            "found" => Ok(Self::Found),
            other => Err(format!("unknown item type: {other}")),
        }
    }
}

/// Lifecycle status of an item.
///
/// The service speaks Indonesian on the wire (`dicari`, `ditemukan`,
/// `diclaim`); older records use `open` / `claimed`. Anything else is kept
/// verbatim in [`ItemStatus::Unknown`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ItemStatus {
    /// Still being searched for.
    Searching,
    /// Found or matched with a report.
    Found,
    /// Handed back to its owner.
    Claimed,
    /// Status value the client does not recognise.
    Unknown(String),
}

impl ItemStatus {
    /// All statuses an item can be moved to.
    pub const SETTABLE: [Self; 3] = [Self::Searching, Self::Found, Self::Claimed];

    /// Parses a wire value, including legacy aliases. Case-insensitive.
    #[must_use]
    pub fn from_wire(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "dicari" | "open" | "searching" => Self::Searching,
            "ditemukan" | "found" => Self::Found,
            "diclaim" | "claimed" => Self::Claimed,
            _ => Self::Unknown(raw.to_string()),
        }
    }

    /// Canonical wire value.
    #[must_use]
    pub fn as_wire(&self) -> &str {
        match self {
            Self::Searching => "dicari",
            Self::Found => "ditemukan",
            Self::Claimed => "diclaim",
            Self::Unknown(raw) => raw,
        }
    }

    /// Display label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Searching => "Searching",
            Self::Found => "Found",
            Self::Claimed => "Claimed",
            Self::Unknown(_) => "Unknown",
        }
    }
}

impl Default for ItemStatus {
    fn default() -> Self {
        Self::Searching
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl std::str::FromStr for ItemStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Self::from_wire(s) {
            Self::Unknown(raw) => Err(format!("unknown status: {raw}")),
            known => Ok(known),
        }
    }
}

impl Serialize for ItemStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire())
    }
}

impl<'de> Deserialize<'de> for ItemStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map(|s| Self::from_wire(&s)).unwrap_or_default())
    }
}

/// One lost-or-found report.
///
/// Serializes with canonical field names; deserializes through
/// [`RawItem`], which tolerates every alias the service emits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawItem")]
pub struct Item {
    /// Opaque identifier.
    pub id: ItemId,

    /// Display name of the item.
    pub title: String,

    /// Free-text description.
    pub description: String,

    /// Category discriminator; attached during normalization when absent.
    #[serde(rename = "type")]
    pub item_type: Option<ItemType>,

    /// Current status.
    pub status: ItemStatus,

    /// Where the item was lost or found.
    pub location: String,

    /// Occurrence date as sent by the service.
    pub date: Option<String>,

    /// Contact string of the reporter.
    pub contact: Option<String>,

    /// Item photo reference (URL or upload path).
    pub photo: Option<String>,

    /// Photo of the location.
    pub location_photo: Option<String>,

    /// Identifier of the reporting user.
    pub user_id: Option<serde_json::Value>,

    /// Server-side creation timestamp.
    pub created_at: Option<String>,
}

/// Wire form of an [`Item`] with every known alias as its own field.
///
/// Aliases are separate fields rather than `#[serde(alias)]` because the
/// service sometimes sends two of them at once.
#[derive(Debug, Deserialize)]
struct RawItem {
    id: ItemId,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    item_type: Option<String>,
    #[serde(default)]
    status: ItemStatus,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    contact: Option<String>,
    #[serde(default)]
    contact_info: Option<String>,
    #[serde(default)]
    photo: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(rename = "photoUrl", default)]
    photo_url: Option<String>,
    #[serde(default)]
    location_photo: Option<String>,
    #[serde(default)]
    user_id: Option<serde_json::Value>,
    #[serde(rename = "userId", default)]
    user_id_camel: Option<serde_json::Value>,
    #[serde(default)]
    created_at: Option<String>,
}

impl From<RawItem> for Item {
    fn from(raw: RawItem) -> Self {
        Self {
            id: raw.id,
            title: first_present([raw.title, raw.name]).unwrap_or_default(),
            description: raw.description.unwrap_or_default(),
            item_type: first_present([raw.kind, raw.item_type]).and_then(|t| t.parse().ok()),
            status: raw.status,
            location: raw.location.unwrap_or_default(),
            date: first_present([raw.date]),
            contact: first_present([raw.contact, raw.contact_info]),
            photo: first_present([raw.photo, raw.image_url, raw.photo_url]),
            location_photo: first_present([raw.location_photo]),
            user_id: raw.user_id.or(raw.user_id_camel),
            created_at: first_present([raw.created_at]),
        }
    }
}

/// First candidate that is present and not blank.
fn first_present<const N: usize>(candidates: [Option<String>; N]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .find(|s| !s.trim().is_empty())
}

impl Item {
    /// Creates an item with the given id and title; every other field empty.
    #[must_use]
    pub fn new(id: impl Into<ItemId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            item_type: None,
            status: ItemStatus::Searching,
            location: String::new(),
            date: None,
            contact: None,
            photo: None,
            location_photo: None,
            user_id: None,
            created_at: None,
        }
    }

    /// Returns the timestamp items are ordered by: `date`, falling back to
    /// `created_at`. `None` when neither parses.
    #[must_use]
    pub fn sort_key(&self) -> Option<DateTime<Utc>> {
        self.date
            .as_deref()
            .and_then(parse_timestamp)
            .or_else(|| self.created_at.as_deref().and_then(parse_timestamp))
    }

    /// Best available photo reference.
    #[must_use]
    pub fn image_path(&self) -> Option<&str> {
        self.photo.as_deref()
    }

    /// Returns `true` if the given user reported this item.
    #[must_use]
    pub fn is_reported_by(&self, user_id: &str) -> bool {
        match &self.user_id {
            Some(serde_json::Value::String(s)) => s == user_id,
            Some(serde_json::Value::Number(n)) => n.to_string() == user_id,
            _ => false,
        }
    }
}

/// Parses a calendar timestamp in any of the forms the service emits:
/// RFC 3339, naive `YYYY-MM-DD[T ]HH:MM:SS[.f]`, or a bare `YYYY-MM-DD`
/// (taken as UTC midnight).
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn parse(json: &str) -> Item {
        match serde_json::from_str(json) {
            Ok(item) => item,
            Err(e) => panic!("item should parse: {e}"),
        }
    }

    #[test]
    fn accepts_field_aliases() {
        let item = parse(
            r#"{"id":3,"name":"Wallet","contact_info":"0812","image_url":"/uploads/w.jpg",
                "userId":11,"status":"ditemukan","item_type":"found"}"#,
        );
        assert_eq!(item.title, "Wallet");
        assert_eq!(item.contact.as_deref(), Some("0812"));
        assert_eq!(item.image_path(), Some("/uploads/w.jpg"));
        assert_eq!(item.item_type, Some(ItemType::Found));
        assert_eq!(item.status, ItemStatus::Found);
        assert!(item.is_reported_by("11"));
    }

    #[test]
    fn missing_optional_fields_default() {
        let item = parse(r#"{"id":"x","title":"Keys","description":null,"status":null}"#);
        assert_eq!(item.description, "");
        assert_eq!(item.status, ItemStatus::Searching);
        assert!(item.item_type.is_none());
        assert!(item.image_path().is_none());
    }

    #[test]
    fn status_aliases_and_unknown() {
        assert_eq!(ItemStatus::from_wire("OPEN"), ItemStatus::Searching);
        assert_eq!(ItemStatus::from_wire("claimed"), ItemStatus::Claimed);
        let odd = ItemStatus::from_wire("archived");
        assert_eq!(odd.label(), "Unknown");
        assert_eq!(odd.as_wire(), "archived");
        assert!("archived".parse::<ItemStatus>().is_err());
    }

    #[test]
    fn sort_key_falls_back_to_created_at() {
        let item = parse(r#"{"id":1,"title":"Bag","created_at":"2024-03-01T10:00:00Z"}"#);
        assert_eq!(
            item.sort_key(),
            Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).single()
        );
    }

    #[test]
    fn sort_key_prefers_date() {
        let item = parse(
            r#"{"id":1,"title":"Bag","date":"2024-02-10","created_at":"2024-03-01T10:00:00Z"}"#,
        );
        assert_eq!(
            item.sort_key(),
            Utc.with_ymd_and_hms(2024, 2, 10, 0, 0, 0).single()
        );
    }

    #[test]
    fn timestamp_forms() {
        assert!(parse_timestamp("2024-05-01T08:30:00.000Z").is_some());
        assert!(parse_timestamp("2024-05-01T08:30:00+07:00").is_some());
        assert!(parse_timestamp("2024-05-01 08:30:00").is_some());
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("").is_none());
    }
}
