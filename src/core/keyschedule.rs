//! Key schedule: shared secret + transcript digest -> session materials.
//!
//! HKDF-SHA3-512 extract-then-expand with the transcript digest bound into
//! the `info` string, so any transcript divergence yields unrelated keys.
//! The session id is a BLAKE3 digest over both inputs and doubles as the
//! keyed-hash key for record nonce derivation.

use crate::core::ct::ct_eq;
use crate::domain::handshake::Digest32;
use crate::ports::aead::{AEAD_KEY_LEN, AeadKey};
use crate::ports::kem::SharedSecret;
use chrono::{DateTime, TimeDelta, Utc};
use core::fmt;
use hkdf::Hkdf;
use sha3::Sha3_512;
use std::time::Duration;
use zeroize::Zeroize;

/// Fallback rekey interval when the config leaves it unset.
pub const DEFAULT_ROTATION_INTERVAL: Duration = Duration::from_secs(15 * 60);
/// Default exporter secret length in bytes.
pub const DEFAULT_EXPORTER_LEN: usize = 32;
/// Mode assumed when the config leaves it unset.
pub const DEFAULT_MODE: &str = "strict";

const SCHEDULE_LABEL: &[u8] = b"qsafe-handshake";
const SESSION_ID_LABEL: &[u8] = b"qsafe-session-id";

/// Tunables for key derivation. Directional key sizes are pinned at the
/// type level ([`AeadKey`] is 32 bytes); only the exporter length varies.
#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    /// Mode string woven into the HKDF info (defaults to `"strict"`).
    pub mode: String,
    /// Rekey interval recorded as `next_rotation - established_at`.
    pub rotation_interval: Duration,
    /// Exporter secret length (defaults to 32).
    pub exporter_len: usize,
    /// Optional HKDF salt; an empty salt is valid per RFC 5869.
    pub salt: Vec<u8>,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            mode: DEFAULT_MODE.to_string(),
            rotation_interval: DEFAULT_ROTATION_INTERVAL,
            exporter_len: DEFAULT_EXPORTER_LEN,
            salt: Vec::new(),
        }
    }
}

/// Public 32-byte session identifier; equal on both endpoints iff the
/// handshake agreed on transcript and shared secret.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub [u8; 32]);
impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionId(..)")
    }
}
impl SessionId {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// Exporter secret for application-level key material. Secret; zeroized on
/// drop.
#[derive(Clone, Zeroize, PartialEq, Eq)]
#[zeroize(drop)]
pub struct ExporterSecret(pub Vec<u8>);
impl fmt::Debug for ExporterSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExporterSecret(..)")
    }
}

/// Derived session materials. Created by the handshake, consumed by the
/// record session, destroyed with it; every secret member zeroizes itself
/// on drop.
pub struct SessionKeys {
    pub session_id: SessionId,
    pub client_to_server: AeadKey,
    pub server_to_client: AeadKey,
    pub exporter_secret: ExporterSecret,
    pub transcript_hash: Digest32,
    pub shared_secret: SharedSecret,
    pub established_at: DateTime<Utc>,
    pub next_rotation: DateTime<Utc>,
}

impl fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKeys")
            .field("session_id", &self.session_id)
            .field("established_at", &self.established_at)
            .field("next_rotation", &self.next_rotation)
            .finish_non_exhaustive()
    }
}

/// Derive per-direction keys, exporter secret, and session id.
///
/// `info = "qsafe-handshake" || 0x00 || mode || 0x00 || transcript_hash`;
/// the HKDF output stream is read in order: client-to-server key,
/// server-to-client key, exporter secret.
///
/// # Errors
/// Returns `ScheduleError::EmptySharedSecret` for an empty shared secret or
/// `ScheduleError::Expand` if HKDF expansion fails (oversized output).
pub fn derive(
    shared_secret: &SharedSecret,
    transcript_hash: &Digest32,
    cfg: &ScheduleConfig,
) -> Result<SessionKeys, ScheduleError> {
    if shared_secret.is_empty() {
        return Err(ScheduleError::EmptySharedSecret);
    }
    let mode = if cfg.mode.is_empty() {
        DEFAULT_MODE
    } else {
        &cfg.mode
    };
    let exporter_len = if cfg.exporter_len == 0 {
        DEFAULT_EXPORTER_LEN
    } else {
        cfg.exporter_len
    };
    let rotation_interval = if cfg.rotation_interval.is_zero() {
        DEFAULT_ROTATION_INTERVAL
    } else {
        cfg.rotation_interval
    };

    let mut info = Vec::with_capacity(SCHEDULE_LABEL.len() + mode.len() + 34);
    info.extend_from_slice(SCHEDULE_LABEL);
    info.push(0);
    info.extend_from_slice(mode.as_bytes());
    info.push(0);
    info.extend_from_slice(transcript_hash.as_bytes());

    let salt = if cfg.salt.is_empty() {
        None
    } else {
        Some(cfg.salt.as_slice())
    };
    let hk = Hkdf::<Sha3_512>::new(salt, shared_secret.as_bytes());
    let mut okm = vec![0u8; 2 * AEAD_KEY_LEN + exporter_len];
    hk.expand(&info, &mut okm)
        .map_err(|_| ScheduleError::Expand)?;

    let mut c2s = [0u8; AEAD_KEY_LEN];
    c2s.copy_from_slice(&okm[..AEAD_KEY_LEN]);
    let mut s2c = [0u8; AEAD_KEY_LEN];
    s2c.copy_from_slice(&okm[AEAD_KEY_LEN..2 * AEAD_KEY_LEN]);
    let exporter = okm[2 * AEAD_KEY_LEN..].to_vec();
    okm.zeroize();

    let now = Utc::now();
    let next_rotation = TimeDelta::from_std(rotation_interval)
        .ok()
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    Ok(SessionKeys {
        session_id: derive_session_id(shared_secret, transcript_hash),
        client_to_server: AeadKey(c2s),
        server_to_client: AeadKey(s2c),
        exporter_secret: ExporterSecret(exporter),
        transcript_hash: *transcript_hash,
        shared_secret: shared_secret.clone(),
        established_at: now,
        next_rotation,
    })
}

fn derive_session_id(shared_secret: &SharedSecret, transcript_hash: &Digest32) -> SessionId {
    let mut hasher = blake3::Hasher::new();
    hasher.update(SESSION_ID_LABEL);
    hasher.update(shared_secret.as_bytes());
    hasher.update(transcript_hash.as_bytes());
    SessionId(*hasher.finalize().as_bytes())
}

/// Key-confirmation tag bound to the transcript: `BLAKE3(key || digest)`.
/// Keyed-hash style, domain-separated by construction (the key comes first
/// and has fixed length). Always compared with [`confirm_matches`].
#[must_use]
pub fn confirm(key: &AeadKey, transcript_hash: &Digest32) -> Digest32 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(key.as_bytes());
    hasher.update(transcript_hash.as_bytes());
    hasher.finalize().into()
}

/// Constant-time comparison of confirmation tags.
#[must_use]
pub fn confirm_matches(expected: &Digest32, received: &Digest32) -> bool {
    ct_eq(expected.as_bytes(), received.as_bytes())
}

#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("shared secret required")]
    EmptySharedSecret,
    #[error("hkdf expand failed")]
    Expand,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared() -> SharedSecret {
        SharedSecret(vec![0xA5; 32])
    }

    fn th(label: u8) -> Digest32 {
        blake3::hash(&[label]).into()
    }

    #[test]
    fn derive_is_deterministic_up_to_timestamps() {
        let cfg = ScheduleConfig::default();
        let a = derive(&shared(), &th(1), &cfg).unwrap();
        let b = derive(&shared(), &th(1), &cfg).unwrap();
        assert_eq!(a.session_id, b.session_id);
        assert_eq!(a.client_to_server, b.client_to_server);
        assert_eq!(a.server_to_client, b.server_to_client);
        assert_eq!(a.exporter_secret, b.exporter_secret);
    }

    #[test]
    fn directions_get_distinct_keys() {
        let keys = derive(&shared(), &th(2), &ScheduleConfig::default()).unwrap();
        assert_ne!(keys.client_to_server, keys.server_to_client);
    }

    #[test]
    fn transcript_hash_changes_everything() {
        let cfg = ScheduleConfig::default();
        let a = derive(&shared(), &th(3), &cfg).unwrap();
        let b = derive(&shared(), &th(4), &cfg).unwrap();
        assert_ne!(a.session_id, b.session_id);
        assert_ne!(a.client_to_server, b.client_to_server);
        assert_ne!(a.server_to_client, b.server_to_client);
    }

    #[test]
    fn mode_changes_keys_but_not_session_id() {
        let strict = ScheduleConfig::default();
        let hybrid = ScheduleConfig {
            mode: "hybrid".to_string(),
            ..ScheduleConfig::default()
        };
        let a = derive(&shared(), &th(5), &strict).unwrap();
        let b = derive(&shared(), &th(5), &hybrid).unwrap();
        assert_ne!(a.client_to_server, b.client_to_server);
        // Session id binds shared secret + transcript only.
        assert_eq!(a.session_id, b.session_id);
    }

    #[test]
    fn salt_changes_keys() {
        let plain = ScheduleConfig::default();
        let salted = ScheduleConfig {
            salt: vec![7u8; 16],
            ..ScheduleConfig::default()
        };
        let a = derive(&shared(), &th(6), &plain).unwrap();
        let b = derive(&shared(), &th(6), &salted).unwrap();
        assert_ne!(a.client_to_server, b.client_to_server);
    }

    #[test]
    fn empty_shared_secret_rejected() {
        let err = derive(
            &SharedSecret(Vec::new()),
            &th(7),
            &ScheduleConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ScheduleError::EmptySharedSecret));
    }

    #[test]
    fn rotation_interval_recorded() {
        let cfg = ScheduleConfig {
            rotation_interval: Duration::from_secs(60),
            ..ScheduleConfig::default()
        };
        let keys = derive(&shared(), &th(8), &cfg).unwrap();
        assert_eq!(
            (keys.next_rotation - keys.established_at).num_seconds(),
            60
        );
    }

    #[test]
    fn zeroed_config_falls_back_to_defaults() {
        let cfg = ScheduleConfig {
            mode: String::new(),
            rotation_interval: Duration::ZERO,
            exporter_len: 0,
            salt: Vec::new(),
        };
        let keys = derive(&shared(), &th(9), &cfg).unwrap();
        assert_eq!(keys.exporter_secret.0.len(), DEFAULT_EXPORTER_LEN);
        assert_eq!(
            (keys.next_rotation - keys.established_at).num_seconds() as u64,
            DEFAULT_ROTATION_INTERVAL.as_secs()
        );
        let strict = derive(&shared(), &th(9), &ScheduleConfig::default()).unwrap();
        assert_eq!(keys.client_to_server, strict.client_to_server);
    }

    #[test]
    fn confirm_binds_key_and_transcript() {
        let keys = derive(&shared(), &th(10), &ScheduleConfig::default()).unwrap();
        let tag = confirm(&keys.server_to_client, &th(10));
        assert!(confirm_matches(&tag, &confirm(&keys.server_to_client, &th(10))));
        assert!(!confirm_matches(&tag, &confirm(&keys.client_to_server, &th(10))));
        assert!(!confirm_matches(&tag, &confirm(&keys.server_to_client, &th(11))));
    }
}
