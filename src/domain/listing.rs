//! Listing view state and its local CRUD patching.
//!
//! A listing moves `Idle → Loading → Loaded | Failed`; any filter or page
//! change moves it back to `Loading`. There is no stale-while-revalidate
//! state: the previous feed is dropped when a new fetch starts.

use serde::{Deserialize, Serialize};

use super::{Item, ItemId, ItemStatus, ItemType};

/// State of one listing view.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ListingState {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// A fetch is in flight.
    Loading,
    /// The last fetch succeeded; the feed may be empty.
    Loaded(Vec<Item>),
    /// The last fetch failed with the given user-facing message.
    Failed(String),
}

/// What a listing view renders for its current state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Panel<'a> {
    /// Loading indicator.
    Loading,
    /// The item feed.
    Feed(&'a [Item]),
    /// Successful fetch with zero records.
    EmptyState,
    /// Error banner with its message.
    Error(&'a str),
}

impl ListingState {
    /// Classifies the state into the panel to render.
    ///
    /// `Idle` renders as loading: a view always starts a fetch on mount.
    #[must_use]
    pub fn panel(&self) -> Panel<'_> {
        match self {
            Self::Idle | Self::Loading => Panel::Loading,
            Self::Loaded(items) if items.is_empty() => Panel::EmptyState,
            Self::Loaded(items) => Panel::Feed(items),
            Self::Failed(message) => Panel::Error(message),
        }
    }

    /// Records currently held. Empty unless loaded.
    #[must_use]
    pub fn items(&self) -> &[Item] {
        match self {
            Self::Loaded(items) => items,
            _ => &[],
        }
    }

    /// Removes an item after the service confirmed its deletion.
    ///
    /// Returns `true` if a row was removed.
    pub fn remove(&mut self, id: &ItemId) -> bool {
        let Self::Loaded(items) = self else {
            return false;
        };
        let before = items.len();
        items.retain(|item| &item.id != id);
        items.len() != before
    }

    /// Patches an item's status after the service confirmed the transition.
    ///
    /// Returns `true` if a row was updated.
    pub fn set_status(&mut self, id: &ItemId, status: &ItemStatus) -> bool {
        let Self::Loaded(items) = self else {
            return false;
        };
        match items.iter_mut().find(|item| &item.id == id) {
            Some(item) => {
                item.status = status.clone();
                true
            }
            None => false,
        }
    }

    /// Replaces an item with its updated copy from the service.
    ///
    /// Returns `true` if a row was replaced.
    pub fn replace(&mut self, updated: Item) -> bool {
        let Self::Loaded(items) = self else {
            return false;
        };
        match items.iter_mut().find(|item| item.id == updated.id) {
            Some(slot) => {
                *slot = updated;
                true
            }
            None => false,
        }
    }
}

/// Counters shown on the admin dashboard.
///
/// Either computed from the loaded page or read from the stats endpoint,
/// which uses the same camelCase field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListingStats {
    /// Number of records.
    pub total_items: u64,
    /// Records of type lost.
    pub lost_items: u64,
    /// Records of type found.
    pub found_items: u64,
    /// Records in claimed status.
    pub claimed_items: u64,
}

impl ListingStats {
    /// Tallies the given records.
    #[must_use]
    pub fn from_items(items: &[Item]) -> Self {
        items.iter().fold(Self::default(), |mut stats, item| {
            stats.total_items += 1;
            match item.item_type {
                Some(ItemType::Lost) => stats.lost_items += 1,
                Some(ItemType::Found) => stats.found_items += 1,
                None => {}
            }
            if item.status == ItemStatus::Claimed {
                stats.claimed_items += 1;
            }
            stats
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn item(id: &str, item_type: ItemType, status: ItemStatus) -> Item {
        let mut item = Item::new(id, id);
        item.item_type = Some(item_type);
        item.status = status;
        item
    }

    fn loaded() -> ListingState {
        ListingState::Loaded(vec![
            item("1", ItemType::Lost, ItemStatus::Searching),
            item("2", ItemType::Found, ItemStatus::Claimed),
            item("3", ItemType::Found, ItemStatus::Found),
        ])
    }

    #[test]
    fn empty_success_is_empty_state_not_error() {
        let state = ListingState::Loaded(Vec::new());
        assert_eq!(state.panel(), Panel::EmptyState);
    }

    #[test]
    fn failure_is_error_panel_with_no_items() {
        let state = ListingState::Failed("boom".to_string());
        assert_eq!(state.panel(), Panel::Error("boom"));
        assert!(state.items().is_empty());
    }

    #[test]
    fn loading_and_idle_render_loading() {
        assert_eq!(ListingState::Idle.panel(), Panel::Loading);
        assert_eq!(ListingState::Loading.panel(), Panel::Loading);
    }

    #[test]
    fn remove_drops_matching_row() {
        let mut state = loaded();
        assert!(state.remove(&ItemId::from("2")));
        assert_eq!(state.items().len(), 2);
        assert!(!state.remove(&ItemId::from("2")));
    }

    #[test]
    fn set_status_patches_row() {
        let mut state = loaded();
        assert!(state.set_status(&ItemId::from("1"), &ItemStatus::Claimed));
        let Some(row) = state.items().first() else {
            panic!("row should exist");
        };
        assert_eq!(row.status, ItemStatus::Claimed);
    }

    #[test]
    fn patching_is_noop_when_not_loaded() {
        let mut state = ListingState::Loading;
        assert!(!state.remove(&ItemId::from("1")));
        assert!(!state.set_status(&ItemId::from("1"), &ItemStatus::Found));
        assert!(!state.replace(Item::new("1", "x")));
    }

    #[test]
    fn replace_swaps_row() {
        let mut state = loaded();
        let mut updated = Item::new("3", "renamed");
        updated.item_type = Some(ItemType::Found);
        assert!(state.replace(updated));
        assert_eq!(state.items().get(2).map(|i| i.title.as_str()), Some("renamed"));
    }

    #[test]
    fn stats_tally_types_and_claimed() {
        let stats = ListingStats::from_items(loaded().items());
        assert_eq!(
            stats,
            ListingStats {
                total_items: 3,
                lost_items: 1,
                found_items: 2,
                claimed_items: 1,
            }
        );
    }
}
