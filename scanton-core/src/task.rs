//! Cancellation and polling bookkeeping shared by the monitoring panels.
//!
//! The timers themselves live in the browser; this module only decides what
//! a tick should do and how a stopped task reports itself.

use std::future::Future;

use futures_util::future::{abortable, AbortHandle};

use crate::error::ScantonError;

/// Poll periods in milliseconds, one per panel.
pub mod intervals {
    pub const ENGINE_STATUS_MS: u32 = 3_000;
    pub const SHARD_PROGRESS_MS: u32 = 5_000;
    pub const BACKFILL_STATUS_MS: u32 = 10_000;
    pub const GAP_REPORT_MS: u32 = 30_000;
    pub const PRICE_FEED_MS: u32 = 30_000;
}

/// Failures in a row before a panel switches to its "unable to load" card.
pub const UNAVAILABLE_AFTER: u32 = 3;

/// Wrap a future so it can be stopped from elsewhere. A stopped future
/// resolves to [`ScantonError::Aborted`].
pub fn cancellable<F, T>(future: F) -> (impl Future<Output = Result<T, ScantonError>>, AbortHandle)
where
    F: Future<Output = Result<T, ScantonError>>,
{
    let (future, handle) = abortable(future);
    let run = async move {
        match future.await {
            Ok(result) => result,
            Err(_) => Err(ScantonError::Aborted),
        }
    };
    (run, handle)
}

/// Per-panel polling state. A tick is skipped while the previous request
/// is still outstanding; a [`PollState::restart`] supersedes it instead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollState {
    in_flight: bool,
    generation: u64,
    consecutive_failures: u32,
    succeeded_once: bool,
    last_error: Option<String>,
}

impl PollState {
    /// Returns false when a request is already outstanding.
    pub fn begin(&mut self) -> bool {
        if self.in_flight {
            return false;
        }
        self.in_flight = true;
        self.generation += 1;
        true
    }

    /// Start a request even if one is outstanding. The returned generation
    /// is the only one [`PollState::finish_if_current`] will accept.
    pub fn restart(&mut self) -> u64 {
        self.in_flight = true;
        self.generation += 1;
        self.generation
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Record a result unless a newer request has started since. Returns
    /// whether the result is current.
    pub fn finish_if_current<T>(&mut self, generation: u64, result: &Result<T, ScantonError>) -> bool {
        if generation != self.generation {
            return false;
        }
        self.finish(result);
        true
    }

    pub fn finish<T>(&mut self, result: &Result<T, ScantonError>) {
        self.in_flight = false;
        match result {
            Ok(_) => {
                self.consecutive_failures = 0;
                self.succeeded_once = true;
                self.last_error = None;
            }
            Err(e) => {
                self.consecutive_failures += 1;
                self.last_error = Some(e.to_string());
            }
        }
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Nothing usable to show: either the first load failed or the panel
    /// has been failing for a while.
    pub fn is_unavailable(&self) -> bool {
        (!self.succeeded_once && self.consecutive_failures > 0)
            || self.consecutive_failures >= UNAVAILABLE_AFTER
    }
}
