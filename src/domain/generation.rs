//! Request generation tokens and view liveness.
//!
//! Overlapping fetches of one view may resolve out of order. Every fetch
//! takes a [`Generation`] when it is issued; on resolution the result is
//! committed only if that generation is still the latest and the view is
//! still attached.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Monotonic sequence number of one issued fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    /// Raw sequence number.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Issues generations and tracks the liveness of the owning view.
#[derive(Debug)]
pub struct GenerationTracker {
    latest: AtomicU64,
    attached: AtomicBool,
}

impl GenerationTracker {
    /// Creates an attached tracker with no fetch issued.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            latest: AtomicU64::new(0),
            attached: AtomicBool::new(true),
        }
    }

    /// Issues the next generation; it supersedes every earlier one.
    pub fn issue(&self) -> Generation {
        Generation(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Returns `true` if no fetch has been issued after `generation`.
    #[must_use]
    pub fn is_current(&self, generation: Generation) -> bool {
        self.latest.load(Ordering::Acquire) == generation.0
    }

    /// Marks the view as torn down. In-flight fetches keep running but
    /// their results are no longer committed.
    pub fn detach(&self) {
        self.attached.store(false, Ordering::Release);
    }

    /// Returns `true` until [`GenerationTracker::detach`] is called.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::Acquire)
    }
}

impl Default for GenerationTracker {
    fn default() -> Self {
        Self::new()
    }
}
