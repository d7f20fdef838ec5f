//! Rekey scheduling: packet-count and elapsed-time thresholds.
//!
//! The manager only *hints*; the transport decides when to actually run a
//! fresh handshake and install a new session. `reset` is called once the
//! new session is in place and advances the epoch.

use chrono::{DateTime, TimeDelta, Utc};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Interval applied when the config leaves it unset.
pub const DEFAULT_ROTATION_INTERVAL: Duration = Duration::from_secs(15 * 60);
/// Skew applied when the config leaves it unset.
pub const DEFAULT_ROTATION_SKEW: Duration = Duration::from_secs(5);

/// Rekey thresholds.
#[derive(Debug, Clone, Copy)]
pub struct RotationConfig {
    /// Time-based threshold; rotation is signalled `skew` early.
    pub interval: Duration,
    /// Packet-count threshold; 0 disables the count check.
    pub max_packets: u64,
    /// Early-signal margin. Ignored when `skew >= interval`.
    pub skew: Duration,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_ROTATION_INTERVAL,
            max_packets: 0,
            skew: DEFAULT_ROTATION_SKEW,
        }
    }
}

/// Tracks packet counts and elapsed time to signal rotation events.
/// All methods are safe to call concurrently with the owning session.
#[derive(Debug)]
pub struct Manager {
    cfg: RotationConfig,
    inner: Mutex<Inner>,
}

#[derive(Debug)]
struct Inner {
    start: DateTime<Utc>,
    packets: u64,
    epoch: u64,
}

impl Manager {
    /// Create a manager starting at `start` with the given initial epoch.
    /// Unset interval/skew fall back to 15 minutes / 5 seconds.
    #[must_use]
    pub fn new(cfg: RotationConfig, start: DateTime<Utc>, epoch: u64) -> Self {
        let cfg = RotationConfig {
            interval: if cfg.interval.is_zero() {
                DEFAULT_ROTATION_INTERVAL
            } else {
                cfg.interval
            },
            max_packets: cfg.max_packets,
            skew: if cfg.skew.is_zero() {
                DEFAULT_ROTATION_SKEW
            } else {
                cfg.skew
            },
        };
        Self {
            cfg,
            inner: Mutex::new(Inner {
                start,
                packets: 0,
                epoch,
            }),
        }
    }

    /// Count one sealed packet and report whether rotation is due.
    pub fn record(&self, now: DateTime<Utc>) -> bool {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.packets += 1;
        self.should_rotate_locked(&inner, now)
    }

    /// Pure threshold check; mutates nothing.
    #[must_use]
    pub fn should_rotate(&self, now: DateTime<Utc>) -> bool {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        self.should_rotate_locked(&inner, now)
    }

    /// Current epoch identifier.
    #[must_use]
    pub fn current_epoch(&self) -> u64 {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .epoch
    }

    /// Restart counters after the transport installed a new session and
    /// advance the epoch.
    pub fn reset(&self, now: DateTime<Utc>) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.start = now;
        inner.packets = 0;
        inner.epoch += 1;
    }

    fn should_rotate_locked(&self, inner: &Inner, now: DateTime<Utc>) -> bool {
        if self.cfg.max_packets > 0 && inner.packets >= self.cfg.max_packets {
            return true;
        }
        let skew = if self.cfg.skew >= self.cfg.interval {
            Duration::ZERO
        } else {
            self.cfg.skew
        };
        let window = self.cfg.interval - skew;
        let deadline = TimeDelta::from_std(window)
            .ok()
            .and_then(|delta| inner.start.checked_add_signed(delta));
        match deadline {
            Some(deadline) => now >= deadline,
            // Interval too large to represent: never time-due.
            None => false,
        }
    }
}
