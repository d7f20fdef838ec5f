use crate::ports::aead::RecordNonce;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Record frame exchanged after the handshake.
///
/// `metadata` is a `BTreeMap` so its canonical (lexicographic) key order is
/// guaranteed at the type level: the AAD the receiver rebuilds from this map
/// is byte-identical to the one the sender authenticated.
///
/// `(epoch, sequence)` is unique per direction: sequences start at 1 and
/// never repeat within an epoch, and the epoch only moves forward on rekey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Envelope {
    /// AEAD output: ciphertext followed by the 16-byte tag.
    pub ciphertext: Vec<u8>,
    /// Derived 24-byte nonce; receivers recompute and compare in constant
    /// time before opening.
    pub nonce: RecordNonce,
    /// Sender-assigned sequence, strictly positive and monotonic. `0` is
    /// reserved/invalid.
    pub sequence: u64,
    /// Rekey epoch under which this frame was sealed.
    pub epoch: u64,
    /// Application metadata, authenticated as AAD but not encrypted.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}
