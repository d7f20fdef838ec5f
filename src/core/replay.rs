//! Replay protection: bounded-memory sliding window over record sequences.
//!
//! Set-plus-highest rather than a bitmap: memory stays `O(depth)` and
//! arbitrary gaps need no special casing; external behavior is identical.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Window depth applied when the config leaves it unset.
pub const DEFAULT_REPLAY_DEPTH: u64 = 2048;

/// Controls replay protection behaviour.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplayConfig {
    /// Accepted distance behind the highest observed sequence (0 selects
    /// the default of 2048).
    pub depth: u64,
}

/// Sliding replay window. `accept` is linearizable; an internal mutex
/// orders concurrent receivers.
#[derive(Debug)]
pub struct ReplayWindow {
    inner: Mutex<Inner>,
}

#[derive(Debug)]
struct Inner {
    depth: u64,
    highest: u64,
    seen: HashSet<u64>,
}

impl ReplayWindow {
    /// Create a window with the configured depth.
    #[must_use]
    pub fn new(cfg: ReplayConfig) -> Self {
        let depth = if cfg.depth == 0 {
            DEFAULT_REPLAY_DEPTH
        } else {
            cfg.depth
        };
        Self {
            inner: Mutex::new(Inner {
                depth,
                highest: 0,
                seen: HashSet::new(),
            }),
        }
    }

    /// Validate and record `seq`.
    ///
    /// # Errors
    /// * `ReplayError::SequenceZero`: sequences start at 1.
    /// * `ReplayError::Stale`: `seq` has fallen out of the window.
    /// * `ReplayError::Duplicate`: `seq` was already accepted.
    pub fn accept(&self, seq: u64) -> Result<(), ReplayError> {
        if seq == 0 {
            return Err(ReplayError::SequenceZero);
        }

        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);

        if inner.highest == 0 {
            inner.highest = seq;
            inner.seen.insert(seq);
            return Ok(());
        }

        if seq > inner.highest {
            inner.highest = seq;
            inner.seen.insert(seq);
            inner.prune();
            return Ok(());
        }

        if inner.highest - seq >= inner.depth {
            return Err(ReplayError::Stale);
        }
        if !inner.seen.insert(seq) {
            return Err(ReplayError::Duplicate);
        }
        Ok(())
    }

    /// Highest sequence observed so far (0 before any accept).
    #[must_use]
    pub fn highest(&self) -> u64 {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .highest
    }
}

impl Inner {
    fn prune(&mut self) {
        let threshold = self.highest.saturating_sub(self.depth);
        if threshold > 0 {
            self.seen.retain(|&seq| seq > threshold);
        }
    }
}

/// Frame-level replay verdicts. Neither corrupts the session: the frame is
/// dropped and subsequent frames proceed normally.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ReplayError {
    #[error("replay: sequence must start at 1")]
    SequenceZero,
    #[error("replay: duplicate sequence")]
    Duplicate,
    #[error("replay: stale sequence")]
    Stale,
}
