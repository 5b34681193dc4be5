//! Trailing-edge debouncer for search input.

use std::time::Duration;

use tokio::time::{Instant, sleep_until};

/// Holds the latest pushed value until `delay` passes without another push.
///
/// Each [`Debouncer::push`] replaces the pending value and restarts the
/// delay, so a burst of keystrokes releases exactly one value: the last.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    /// Creates an empty debouncer.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Configured quiet period.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Replaces the pending value and restarts the delay.
    pub fn push(&mut self, value: T) {
        self.pending = Some((value, Instant::now() + self.delay));
    }

    /// Returns `true` while a value is waiting to be released.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Takes the pending value without waiting out its delay, e.g. when the
    /// input it came from has closed.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    /// Waits until the pending value's delay has elapsed and releases it.
    /// Never resolves while nothing is pending.
    ///
    /// Cancel-safe: dropping the future keeps the pending value and its
    /// deadline, so it can be polled again from a `select!` loop.
    pub async fn ready(&mut self) -> T {
        loop {
            match &self.pending {
                Some((_, deadline)) => sleep_until(*deadline).await,
                None => std::future::pending::<()>().await,
            }
            if let Some((value, _)) = self.pending.take() {
                return value;
            }
        }
    }
}
