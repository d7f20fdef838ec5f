#![allow(dead_code)]
//! Deterministic fixtures for unit tests. Integration tests under `tests/`
//! build their own helpers against the public API.

use crate::core::keyschedule::{ExporterSecret, SessionId, SessionKeys};
use crate::domain::handshake::{CapabilitySet, Digest32, HandshakeNonce};
use crate::ports::aead::AeadKey;
use crate::ports::kem::SharedSecret;
use chrono::{TimeDelta, Utc};
use std::collections::BTreeMap;

/// Standard capability advertisement used across tests.
pub fn mk_caps() -> CapabilitySet {
    CapabilitySet {
        pq_kem: "Kyber768".to_string(),
        pq_sigs: "Dilithium3".to_string(),
        aead: "xchacha20poly1305".to_string(),
        transports: vec!["wss".to_string(), "quic".to_string()],
    }
}

/// Deterministic patterned handshake nonce.
pub fn mk_nonce(tag: u8) -> HandshakeNonce {
    let mut b = [0u8; 32];
    for (i, byte) in b.iter_mut().enumerate() {
        *byte = tag.wrapping_add(i as u8);
    }
    HandshakeNonce(b)
}

/// Fixture `SessionKeys` with fixed byte patterns. Both ends of a test
/// session pair are built from the same tag so their keys agree.
pub fn mk_session_keys(tag: u8) -> SessionKeys {
    let now = Utc::now();
    SessionKeys {
        session_id: SessionId([tag; 32]),
        client_to_server: AeadKey([tag.wrapping_add(1); 32]),
        server_to_client: AeadKey([tag.wrapping_add(2); 32]),
        exporter_secret: ExporterSecret(vec![tag.wrapping_add(3); 32]),
        transcript_hash: Digest32([tag.wrapping_add(4); 32]),
        shared_secret: SharedSecret(vec![tag.wrapping_add(5); 32]),
        established_at: now,
        next_rotation: now + TimeDelta::minutes(15),
    }
}

/// Build a metadata map from string pairs.
pub fn mk_metadata(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}
