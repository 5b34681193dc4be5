//! Listing filter criteria and the query they reduce to.
//!
//! [`ListingFilter`] is the ephemeral `{ type, status, search, sort }` state
//! of a listing view. Its criteria combine as an implicit AND; the "all"
//! sentinels and an empty search are never sent to the service.

use std::fmt;

use super::{ItemStatus, ItemType};

/// Type criterion of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeFilter {
    /// Both lost and found items.
    #[default]
    All,
    /// Only items of one category.
    Only(ItemType),
}

impl TypeFilter {
    /// The concrete type records are tagged with during normalization.
    #[must_use]
    pub const fn item_type(self) -> Option<ItemType> {
        match self {
            Self::All => None,
            Self::Only(t) => Some(t),
        }
    }
}

impl From<ItemType> for TypeFilter {
    fn from(t: ItemType) -> Self {
        Self::Only(t)
    }
}

/// Status criterion of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StatusFilter {
    /// Any status.
    #[default]
    All,
    /// Only items in the given status.
    Only(ItemStatus),
}

impl std::str::FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse().map(Self::Only)
    }
}

/// Client-side ordering of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Most recent first.
    #[default]
    Newest,
    /// Oldest first.
    Oldest,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Newest => "newest",
            Self::Oldest => "oldest",
        })
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "newest" => Ok(Self::Newest),
            "oldest" => Ok(Self::Oldest),
            other => Err(format!("unknown sort order: {other}")),
        }
    }
}

/// Filter criteria of one listing view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListingFilter {
    /// Category to list.
    pub item_type: TypeFilter,
    /// Status to list.
    pub status: StatusFilter,
    /// Free-text search, sent trimmed.
    pub search: String,
    /// Client-side ordering; never sent to the service.
    pub sort: SortOrder,
}

impl ListingFilter {
    /// Filter for a single category with every other criterion at default.
    #[must_use]
    pub fn for_type(item_type: ItemType) -> Self {
        Self {
            item_type: TypeFilter::Only(item_type),
            ..Self::default()
        }
    }

    /// Returns `true` if status or search narrow the listing.
    ///
    /// Used to pick the empty-state hint ("adjust your filters" vs "nothing
    /// reported yet").
    #[must_use]
    pub fn is_narrowed(&self) -> bool {
        self.status != StatusFilter::All || !self.search.trim().is_empty()
    }

    /// Reduces the filter to request query parameters.
    ///
    /// `type` and `status` are omitted when set to "all"; `search` is trimmed
    /// and omitted when empty. `page` and `limit` are included when given.
    #[must_use]
    pub fn query_params(&self, page: Option<u32>, limit: Option<u32>) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(5);
        if let TypeFilter::Only(t) = self.item_type {
            params.push(("type", t.as_str().to_string()));
        }
        if let StatusFilter::Only(status) = &self.status {
            params.push(("status", status.as_wire().to_string()));
        }
        let search = self.search.trim();
        if !search.is_empty() {
            params.push(("search", search.to_string()));
        }
        if let Some(page) = page {
            params.push(("page", page.to_string()));
        }
        if let Some(limit) = limit {
            params.push(("limit", limit.to_string()));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(params: &[(&'static str, String)]) -> Vec<&'static str> {
        params.iter().map(|(k, _)| *k).collect()
    }

    #[test]
    fn defaults_omit_status_and_search() {
        let filter = ListingFilter::for_type(ItemType::Lost);
        let params = filter.query_params(None, None);
        assert_eq!(params, vec![("type", "lost".to_string())]);
    }

    #[test]
    fn whitespace_search_is_omitted() {
        let filter = ListingFilter {
            search: "   ".to_string(),
            ..ListingFilter::default()
        };
        assert!(filter.query_params(None, None).is_empty());
        assert!(!filter.is_narrowed());
    }

    #[test]
    fn non_default_criteria_are_sent() {
        let filter = ListingFilter {
            item_type: TypeFilter::Only(ItemType::Found),
            status: StatusFilter::Only(ItemStatus::Claimed),
            search: "  black wallet ".to_string(),
            sort: SortOrder::Oldest,
        };
        let params = filter.query_params(Some(2), Some(10));
        assert_eq!(keys(&params), vec!["type", "status", "search", "page", "limit"]);
        assert!(params.contains(&("status", "diclaim".to_string())));
        assert!(params.contains(&("search", "black wallet".to_string())));
        assert!(filter.is_narrowed());
    }

    #[test]
    fn status_filter_parses_all_sentinel() {
        assert_eq!("all".parse::<StatusFilter>(), Ok(StatusFilter::All));
        assert_eq!("".parse::<StatusFilter>(), Ok(StatusFilter::All));
        assert_eq!(
            "dicari".parse::<StatusFilter>(),
            Ok(StatusFilter::Only(ItemStatus::Searching))
        );
        assert!("lost-forever".parse::<StatusFilter>().is_err());
    }

    #[test]
    fn sort_order_round_trips_text() {
        assert_eq!("Oldest".parse::<SortOrder>(), Ok(SortOrder::Oldest));
        assert_eq!(SortOrder::Newest.to_string(), "newest");
    }
}
