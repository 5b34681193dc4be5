//! Offset pagination driven by the server-reported total.

use serde::Serialize;

/// Page cursor of a paginated view.
///
/// `total` comes from the service's reported count, not from the number of
/// records held locally, so [`Pagination::page_count`] stays correct while
/// only one page is in memory. Until a total is reported the upper bound is
/// open: listings answered with a bare array never report one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    page: u32,
    limit: u32,
    total: Option<u64>,
}

impl Pagination {
    /// Creates a cursor on page 1. A zero `limit` is raised to 1.
    #[must_use]
    pub const fn new(limit: u32) -> Self {
        Self {
            page: 1,
            limit: if limit == 0 { 1 } else { limit },
            total: None,
        }
    }

    /// Cursor on `page` before any total is known, as when a page number
    /// comes straight from user input. The next [`Pagination::set_total`]
    /// clamps it.
    #[must_use]
    pub const fn requested(page: u32, limit: u32) -> Self {
        let mut cursor = Self::new(limit);
        cursor.page = if page == 0 { 1 } else { page };
        cursor
    }

    /// Current page (1-indexed).
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Records per page.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Server-reported record count; 0 until one is reported.
    #[must_use]
    pub const fn total(&self) -> u64 {
        match self.total {
            Some(total) => total,
            None => 0,
        }
    }

    /// Returns `true` once the server has reported a total.
    #[must_use]
    pub const fn is_total_known(&self) -> bool {
        self.total.is_some()
    }

    /// Offset of the first record of the current page.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }

    /// Number of pages: `ceil(total / limit)`.
    #[must_use]
    pub const fn page_count(&self) -> u32 {
        let pages = self.total().div_ceil(self.limit as u64);
        if pages > u32::MAX as u64 {
            u32::MAX
        } else {
            pages as u32
        }
    }

    /// Highest page navigation may reach; at least 1.
    #[must_use]
    pub const fn last_page(&self) -> u32 {
        let count = self.page_count();
        if count == 0 { 1 } else { count }
    }

    /// Moves to `page`, clamped into `1..=last_page()`, or only raised to 1
    /// while the total is unknown. Returns `true` if the page changed.
    pub fn go_to(&mut self, page: u32) -> bool {
        let upper = if self.is_total_known() {
            self.last_page()
        } else {
            u32::MAX
        };
        let target = page.clamp(1, upper);
        let moved = target != self.page;
        self.page = target;
        moved
    }

    /// Advances one page; no-op on the last page.
    pub fn next(&mut self) -> bool {
        self.go_to(self.page.saturating_add(1))
    }

    /// Goes back one page; no-op on the first page.
    pub fn prev(&mut self) -> bool {
        self.go_to(self.page.saturating_sub(1))
    }

    /// Returns to page 1 (filter changes).
    pub fn reset(&mut self) {
        self.page = 1;
    }

    /// Records the server-reported total and re-clamps the current page.
    ///
    /// Returns `true` if the page moved, i.e. the page just fetched lay past
    /// the end and the clamped page still has to be loaded.
    pub fn set_total(&mut self, total: u64) -> bool {
        self.total = Some(total);
        self.go_to(self.page)
    }

    /// Returns `true` if a next page is known to exist.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.last_page()
    }

    /// Returns `true` if a previous page exists.
    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.page > 1
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(30)
    }
}
