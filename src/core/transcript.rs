//! Append-only handshake transcript (domain-separated BLAKE3).
//!
//! ## Responsibilities
//! - Serialize each labeled contribution to compact canonical JSON (struct
//!   fields in declaration order, map keys sorted by the `BTreeMap` wire
//!   types) and fold `label || u64_be(len) || bytes` into a running hash.
//! - Seed the hash with `"domain:" || domain` so transcripts from different
//!   protocols can never collide.
//! - Provide the current digest via [`Accumulator::snapshot`] without
//!   consuming the accumulator (the underlying hasher state is cloned).
//! - Record a `label:json` log of contributions for audit.
//!
//! ## Non-responsibilities
//! - No domain validation: callers validate messages before appending.
//! - No key derivation: the key schedule consumes `snapshot()`.
//!
//! Label + length framing makes every contribution unambiguous regardless of
//! its serialized content; canonical serialization keeps the digest
//! bit-identical across endpoints.

use crate::domain::handshake::Digest32;
use serde::Serialize;
use std::sync::{Mutex, PoisonError};

/// Transcript accumulator over the handshake control plane.
///
/// Appends are linearizable: an internal mutex orders concurrent
/// contributions (in practice the handshake is single-threaded per
/// endpoint, but the accumulator does not rely on that).
#[derive(Debug)]
pub struct Accumulator {
    inner: Mutex<Inner>,
}

#[derive(Debug)]
struct Inner {
    hasher: blake3::Hasher,
    entries: Vec<Entry>,
}

#[derive(Debug)]
struct Entry {
    label: String,
    data: Vec<u8>,
}

impl Accumulator {
    /// Create a fresh accumulator seeded with the literal domain prefix.
    #[must_use]
    pub fn new(domain: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"domain:");
        hasher.update(domain.as_bytes());
        Self {
            inner: Mutex::new(Inner {
                hasher,
                entries: Vec::with_capacity(8),
            }),
        }
    }

    /// Serialize `value` canonically and fold it into the transcript under
    /// `label`.
    ///
    /// # Errors
    /// Returns `TranscriptError::EmptyLabel` for an empty label, or
    /// `TranscriptError::Serialize` if JSON encoding fails.
    pub fn append<T: Serialize + ?Sized>(
        &self,
        label: &str,
        value: &T,
    ) -> Result<(), TranscriptError> {
        if label.is_empty() {
            return Err(TranscriptError::EmptyLabel);
        }
        let serialized =
            serde_json::to_vec(value).map_err(|source| TranscriptError::Serialize {
                label: label.to_string(),
                source,
            })?;

        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.hasher.update(label.as_bytes());
        inner.hasher.update(&(serialized.len() as u64).to_be_bytes());
        inner.hasher.update(&serialized);
        inner.entries.push(Entry {
            label: label.to_string(),
            data: serialized,
        });
        Ok(())
    }

    /// Current transcript digest. Finalization reads the hasher state
    /// without consuming it; the accumulator remains appendable.
    #[must_use]
    pub fn snapshot(&self) -> Digest32 {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.hasher.finalize().into()
    }

    /// Recorded contribution sequence (`label:json`) for auditing.
    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner
            .entries
            .iter()
            .map(|e| format!("{}:{}", e.label, String::from_utf8_lossy(&e.data)))
            .collect()
    }
}

/// Errors that can occur while folding a contribution into the transcript.
#[derive(Debug, thiserror::Error)]
pub enum TranscriptError {
    #[error("transcript label required")]
    EmptyLabel,
    #[error("transcript marshal {label}: {source}")]
    Serialize {
        label: String,
        #[source]
        source: serde_json::Error,
    },
}
