//! Audit trail records and before/after snapshot diffing.
//!
//! The service appends a [`HistoryRecord`] on every mutation of an item. The
//! client only reads them: `created` and `deleted` records are rendered as a
//! flat key/value list of their snapshot, `updated` and `status_changed`
//! records as the set of fields whose values differ between the snapshots.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use super::{HistoryId, ItemId};

/// Point-in-time mapping of an item's fields.
pub type Snapshot = Map<String, Value>;

/// Placeholder rendered for null and empty values.
pub const EMPTY_VALUE: &str = "-";

/// Kind of mutation a history record describes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HistoryAction {
    /// Item was reported.
    Created,
    /// Item fields were edited.
    Updated,
    /// Item status moved.
    StatusChanged,
    /// Item was removed.
    Deleted,
    /// Action the client does not recognise, kept verbatim.
    Other(String),
}

impl HistoryAction {
    /// Parses a wire value.
    #[must_use]
    pub fn from_wire(raw: &str) -> Self {
        match raw {
            "created" => Self::Created,
            "updated" => Self::Updated,
            "status_changed" => Self::StatusChanged,
            "deleted" => Self::Deleted,
            other => Self::Other(other.to_string()),
        }
    }

    /// Wire value, also used as the `action` filter of the admin history.
    #[must_use]
    pub fn as_wire(&self) -> &str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::StatusChanged => "status_changed",
            Self::Deleted => "deleted",
            Self::Other(raw) => raw,
        }
    }

    /// Display label. Unknown actions are shown verbatim.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Created => "Created",
            Self::Updated => "Updated",
            Self::StatusChanged => "Status Changed",
            Self::Deleted => "Deleted",
            Self::Other(raw) => raw,
        }
    }
}

impl fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for HistoryAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Self::from_wire(s.trim()) {
            Self::Other(raw) => Err(format!("unknown history action: {raw}")),
            known => Ok(known),
        }
    }
}

impl Serialize for HistoryAction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire())
    }
}

impl<'de> Deserialize<'de> for HistoryAction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(|s| Self::from_wire(&s))
    }
}

/// One audited change to an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Record identifier.
    pub id: HistoryId,
    /// Item the change applies to, when the service includes it.
    #[serde(default)]
    pub item_id: Option<ItemId>,
    /// Kind of change.
    pub action: HistoryAction,
    /// Actor who made the change.
    #[serde(default, deserialize_with = "actor")]
    pub changed_by: String,
    /// When the change happened, as sent by the service.
    #[serde(default)]
    pub changed_at: Option<String>,
    /// Optional human-readable description.
    #[serde(default)]
    pub description: Option<String>,
    /// Snapshot before the change (updates and deletes).
    #[serde(default)]
    pub old_data: Option<Snapshot>,
    /// Snapshot after the change (creates and updates).
    #[serde(default)]
    pub new_data: Option<Snapshot>,
}

/// Criteria of the admin-wide history browser.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HistoryFilter {
    /// Only records of this action; `None` for every action.
    pub action: Option<HistoryAction>,
    /// Actor substring or id; sent trimmed, omitted when empty.
    pub changed_by: String,
}

impl HistoryFilter {
    /// Reduces the filter plus a page window to query parameters.
    #[must_use]
    pub fn query_params(&self, limit: u32, offset: u64) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(4);
        if let Some(action) = &self.action {
            params.push(("action", action.as_wire().to_string()));
        }
        let changed_by = self.changed_by.trim();
        if !changed_by.is_empty() {
            params.push(("changedBy", changed_by.to_string()));
        }
        params.push(("limit", limit.to_string()));
        params.push(("offset", offset.to_string()));
        params
    }
}

/// Which keys a snapshot diff walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiffScope {
    /// Only keys present in the "before" snapshot. Fields introduced by the
    /// change are not reported; matches how stored history has been shown.
    BeforeKeys,
    /// Union of keys from both snapshots.
    #[default]
    AllKeys,
}

/// One field whose value differs between two snapshots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldChange {
    /// Field name.
    pub field: String,
    /// Value before the change; `None` when the key was absent.
    pub old: Option<Value>,
    /// Value after the change; `None` when the key was absent.
    pub new: Option<Value>,
}

impl FieldChange {
    /// Rendered "before" value.
    #[must_use]
    pub fn old_display(&self) -> String {
        display_opt(self.old.as_ref())
    }

    /// Rendered "after" value.
    #[must_use]
    pub fn new_display(&self) -> String {
        display_opt(self.new.as_ref())
    }
}

/// Rendered key/value pair of a whole snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotEntry {
    /// Field name.
    pub field: String,
    /// Rendered value.
    pub value: String,
}

/// What the detail panel of a history record shows.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryView {
    /// Initial data of a `created` record.
    Initial(Vec<SnapshotEntry>),
    /// Changed fields of an `updated` / `status_changed` record.
    Changes(Vec<FieldChange>),
    /// Data of a `deleted` record.
    Removed(Vec<SnapshotEntry>),
    /// Nothing to show: missing snapshots or unknown action.
    Empty,
}

impl HistoryRecord {
    /// Builds the detail view of this record.
    ///
    /// No diff is computed for `created` and `deleted`; the respective
    /// snapshot is listed as is. Updates need both snapshots.
    #[must_use]
    pub fn view(&self, scope: DiffScope) -> HistoryView {
        match (&self.action, &self.old_data, &self.new_data) {
            (HistoryAction::Created, _, Some(new)) => HistoryView::Initial(flatten(new)),
            (HistoryAction::Deleted, Some(old), _) => HistoryView::Removed(flatten(old)),
            (HistoryAction::Updated | HistoryAction::StatusChanged, Some(old), Some(new)) => {
                HistoryView::Changes(diff_snapshots(old, new, scope))
            }
            _ => HistoryView::Empty,
        }
    }
}

/// Returns the fields whose values differ between `old` and `new`.
///
/// Values are compared with strict inequality: a number never equals a
/// string holding the same digits. Objects and arrays are compared through
/// their serialized text. Entries come out in key order of `old`, followed
/// (for [`DiffScope::AllKeys`]) by keys only present in `new`.
#[must_use]
pub fn diff_snapshots(old: &Snapshot, new: &Snapshot, scope: DiffScope) -> Vec<FieldChange> {
    let mut changes = Vec::new();
    for (key, old_value) in old {
        let new_value = new.get(key);
        if !same_value(Some(old_value), new_value) {
            changes.push(FieldChange {
                field: key.clone(),
                old: Some(old_value.clone()),
                new: new_value.cloned(),
            });
        }
    }
    if scope == DiffScope::AllKeys {
        for (key, new_value) in new {
            if !old.contains_key(key) {
                changes.push(FieldChange {
                    field: key.clone(),
                    old: None,
                    new: Some(new_value.clone()),
                });
            }
        }
    }
    changes
}

/// Renders a snapshot value for display.
///
/// Objects and arrays become JSON text, null and empty strings become
/// [`EMPTY_VALUE`], strings are shown without quotes.
#[must_use]
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => EMPTY_VALUE.to_string(),
        Value::String(s) if s.is_empty() => EMPTY_VALUE.to_string(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

fn display_opt(value: Option<&Value>) -> String {
    value.map_or_else(|| EMPTY_VALUE.to_string(), display_value)
}

fn flatten(snapshot: &Snapshot) -> Vec<SnapshotEntry> {
    snapshot
        .iter()
        .map(|(field, value)| SnapshotEntry {
            field: field.clone(),
            value: display_value(value),
        })
        .collect()
}

fn same_value(a: Option<&Value>, b: Option<&Value>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(Value::Number(x)), Some(Value::Number(y))) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        (Some(x @ (Value::Object(_) | Value::Array(_))), Some(y @ (Value::Object(_) | Value::Array(_)))) => {
            x.to_string() == y.to_string()
        }
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

fn actor<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => s,
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    })
}
