//! Client-side ordering of item listings.

use std::cmp::Ordering;

use super::{Item, ItemType, SortOrder};

/// Number of entries in the home page "latest reports" feed.
pub const RECENT_FEED_LEN: usize = 6;

/// Returns `items` ordered by [`Item::sort_key`].
///
/// `Newest` orders descending, `Oldest` ascending. Items without a
/// resolvable date go last in both orders. The sort is stable, so items
/// with equal keys keep their service order.
#[must_use]
pub fn sort_items(mut items: Vec<Item>, order: SortOrder) -> Vec<Item> {
    items.sort_by_cached_key(|item| SortKey {
        at: item.sort_key(),
        order,
    });
    items
}

/// Merges the lost and found listings into the "latest reports" feed.
///
/// Each side is tagged with its category, the union is sorted newest first
/// and cut to `limit` entries.
#[must_use]
pub fn recent_feed(lost: Vec<Item>, found: Vec<Item>, limit: usize) -> Vec<Item> {
    let tagged = found
        .into_iter()
        .map(|item| tag(item, ItemType::Found))
        .chain(lost.into_iter().map(|item| tag(item, ItemType::Lost)))
        .collect();
    let mut merged = sort_items(tagged, SortOrder::Newest);
    merged.truncate(limit);
    merged
}

fn tag(mut item: Item, item_type: ItemType) -> Item {
    item.item_type = Some(item_type);
    item
}

#[derive(PartialEq, Eq)]
struct SortKey {
    at: Option<chrono::DateTime<chrono::Utc>>,
    order: SortOrder,
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.at, other.at) {
            (Some(a), Some(b)) => match self.order {
                SortOrder::Newest => b.cmp(&a),
                SortOrder::Oldest => a.cmp(&b),
            },
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dated(id: &str, date: Option<&str>) -> Item {
        let mut item = Item::new(id, format!("item {id}"));
        item.date = date.map(str::to_string);
        item
    }

    fn ids(items: &[Item]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    fn sample() -> Vec<Item> {
        vec![
            dated("a", Some("2024-01-05")),
            dated("b", Some("2024-03-01T09:00:00Z")),
            dated("c", None),
            dated("d", Some("2023-12-31")),
        ]
    }

    #[test]
    fn newest_is_non_increasing() {
        let sorted = sort_items(sample(), SortOrder::Newest);
        assert_eq!(ids(&sorted), vec!["b", "a", "d", "c"]);
        let keys: Vec<_> = sorted.iter().filter_map(Item::sort_key).collect();
        assert!(keys.windows(2).all(|w| matches!(w, [x, y] if x >= y)));
    }

    #[test]
    fn oldest_is_non_decreasing() {
        let sorted = sort_items(sample(), SortOrder::Oldest);
        assert_eq!(ids(&sorted), vec!["d", "a", "b", "c"]);
        let keys: Vec<_> = sorted.iter().filter_map(Item::sort_key).collect();
        assert!(keys.windows(2).all(|w| matches!(w, [x, y] if x <= y)));
    }

    #[test]
    fn created_at_used_when_date_missing() {
        let mut late = dated("late", None);
        late.created_at = Some("2025-06-01T00:00:00Z".to_string());
        let sorted = sort_items(vec![dated("early", Some("2025-01-01")), late], SortOrder::Newest);
        assert_eq!(ids(&sorted), vec!["late", "early"]);
    }

    #[test]
    fn equal_keys_keep_service_order() {
        let items = vec![
            dated("x", Some("2024-01-01")),
            dated("y", Some("2024-01-01")),
            dated("z", Some("2024-01-01")),
        ];
        let sorted = sort_items(items, SortOrder::Oldest);
        assert_eq!(ids(&sorted), vec!["x", "y", "z"]);
    }

    #[test]
    fn recent_feed_tags_merges_and_truncates() {
        let lost = vec![dated("l1", Some("2024-05-01")), dated("l2", Some("2024-01-01"))];
        let found = vec![dated("f1", Some("2024-04-01")), dated("f2", Some("2024-06-01"))];
        let feed = recent_feed(lost, found, 3);
        assert_eq!(ids(&feed), vec!["f2", "l1", "f1"]);
        assert_eq!(feed.first().and_then(|i| i.item_type), Some(ItemType::Found));
        assert_eq!(feed.get(1).and_then(|i| i.item_type), Some(ItemType::Lost));
    }
}
