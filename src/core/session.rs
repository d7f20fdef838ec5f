//! Per-session AEAD record protection.
//!
//! A [`RecordSession`] owns one direction of keys for sending and one for
//! receiving, a monotonic send sequence, a rotation manager, and a replay
//! window. It is safe to use from multiple threads: senders serialize on the
//! send lock, receivers on the replay window, and the two paths share no
//! mutable state.
//!
//! Nonces are never random: each is derived from
//! `(session_id, sequence, sender_role)` with keyed BLAKE3. Deriving rather
//! than transmitting trust means a crafted envelope replayed from the other
//! direction fails even if the attacker controls the claimed sequence, and
//! session-id binding prevents cross-session nonce reuse.

use crate::core::ct::ct_eq;
use crate::core::keyschedule::{SessionId, SessionKeys};
use crate::core::policy::{Parameters, PolicyEnforcer, PolicyError};
use crate::core::replay::{ReplayConfig, ReplayError, ReplayWindow};
use crate::core::rotation::{self, Manager, RotationConfig};
use crate::domain::envelope::Envelope;
use crate::ports::aead::{AeadError, AeadKey, AeadSeal, RecordNonce};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tracing::warn;

/// Mode assumed when the session config leaves it unset.
pub const DEFAULT_SESSION_MODE: &str = "strict";
/// AEAD suite assumed when the session config leaves it unset.
pub const DEFAULT_SESSION_AEAD: &str = "xchacha20poly1305";

const AAD_PREFIX: &[u8] = b"meta:v1;";

/// Local perspective within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Sends with the client-to-server key.
    Initiator,
    /// Sends with the server-to-client key.
    Responder,
}

impl Role {
    pub(crate) fn byte(self) -> u8 {
        match self {
            Role::Initiator => 0,
            Role::Responder => 1,
        }
    }

    #[must_use]
    pub fn peer(self) -> Role {
        match self {
            Role::Initiator => Role::Responder,
            Role::Responder => Role::Initiator,
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Role::Initiator => write!(f, "initiator"),
            Role::Responder => write!(f, "responder"),
        }
    }
}

/// Governs record-session construction. `keys` is consumed: the session
/// copies out the directional keys and the remaining secret material
/// (shared secret, exporter) zeroizes when the config drops.
pub struct SessionConfig {
    pub role: Role,
    pub mode: String,
    pub aead: String,
    pub keys: SessionKeys,
    pub rotation: RotationConfig,
    pub replay: ReplayConfig,
    pub policy: Option<PolicyEnforcer>,
    pub epoch: u64,
}

/// Errors surfaced by record-session construction and per-frame operations.
///
/// `Policy` and `UnsupportedAead` are fatal (no session is produced).
/// `SeqInvalid`, `Replay`, `NonceMismatch`, and `Aead` condemn only the
/// offending frame; the session stays usable. `NonceMismatch` and `Aead`
/// indicate tampering and are worth alarming on.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session policy: {0}")]
    Policy(#[from] PolicyError),
    #[error("session: unsupported AEAD {0:?}")]
    UnsupportedAead(String),
    #[error("session: sequence must start at 1")]
    SeqInvalid,
    #[error("session {0}")]
    Replay(#[from] ReplayError),
    #[error("session: nonce mismatch")]
    NonceMismatch,
    #[error("session decrypt: {0}")]
    Aead(#[from] AeadError),
}

/// Orchestrates encrypt/decrypt with replay and rotation enforcement.
pub struct RecordSession<A: AeadSeal> {
    aead: A,
    role: Role,
    session_id: SessionId,
    send_key: AeadKey,
    recv_key: AeadKey,
    send_seq: Mutex<u64>,
    rotation: Manager,
    replay: ReplayWindow,
    established: DateTime<Utc>,
}

impl<A: AeadSeal> std::fmt::Debug for RecordSession<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordSession").finish()
    }
}

impl<A: AeadSeal> RecordSession<A> {
    /// Build a session from handshake-derived keys.
    ///
    /// Policy (when present) is consulted exactly once, here, over the
    /// negotiated `(mode, aead, rotation window)`. The negotiated AEAD name
    /// must match the supplied adapter.
    ///
    /// # Errors
    /// * `SessionError::Policy`: a negotiated parameter is not permitted.
    /// * `SessionError::UnsupportedAead`: `cfg.aead` does not name the
    ///   adapter in use.
    pub fn new(aead: A, cfg: SessionConfig) -> Result<Self, SessionError> {
        let SessionConfig {
            role,
            mut mode,
            aead: mut aead_name,
            keys,
            rotation: rotation_cfg,
            replay,
            policy,
            epoch,
        } = cfg;

        if mode.is_empty() {
            mode = DEFAULT_SESSION_MODE.to_string();
        }
        if aead_name.is_empty() {
            aead_name = DEFAULT_SESSION_AEAD.to_string();
        }
        if aead_name != aead.name() {
            return Err(SessionError::UnsupportedAead(aead_name));
        }

        let window = (keys.next_rotation - keys.established_at)
            .to_std()
            .unwrap_or(Duration::ZERO);
        if let Some(policy) = &policy {
            policy.validate(&Parameters {
                mode,
                aead: aead_name,
                rotation_window: window,
            })?;
        }

        let (send_key, recv_key) = directional_keys(role, &keys);

        let mut rotation_cfg = rotation_cfg;
        let mut interval = window;
        if interval.is_zero() {
            interval = rotation_cfg.interval;
        }
        if interval.is_zero() {
            interval = rotation::DEFAULT_ROTATION_INTERVAL;
        }
        if rotation_cfg.interval.is_zero() {
            rotation_cfg.interval = interval;
        }

        Ok(Self {
            aead,
            role,
            session_id: keys.session_id,
            send_key,
            recv_key,
            send_seq: Mutex::new(0),
            rotation: Manager::new(rotation_cfg, keys.established_at, epoch),
            replay: ReplayWindow::new(replay),
            established: keys.established_at,
        })
        // `keys` drops here: shared secret and exporter zeroize.
    }

    /// Seal `plaintext` into an envelope, assigning the next sequence.
    ///
    /// Returns the envelope plus a rotation hint; a `true` hint asks the
    /// transport to run a fresh handshake soon. Sequences are assigned under
    /// the send lock, so the order observed across concurrent senders is the
    /// lock acquisition order and each sender sees strictly increasing,
    /// contiguous values.
    ///
    /// # Errors
    /// Returns `SessionError::Aead` if sealing fails internally.
    pub fn encrypt(
        &self,
        plaintext: &[u8],
        metadata: BTreeMap<String, String>,
    ) -> Result<(Envelope, bool), SessionError> {
        let aad = metadata_aad(&metadata);

        let mut send_seq = self.send_seq.lock().unwrap_or_else(PoisonError::into_inner);
        *send_seq += 1;
        let seq = *send_seq;

        let nonce = derive_nonce(&self.session_id, seq, self.role);
        let rotate = self.rotation.record(Utc::now());
        let ciphertext = self.aead.seal(&self.send_key, &nonce, &aad, plaintext)?;

        Ok((
            Envelope {
                ciphertext,
                nonce,
                sequence: seq,
                epoch: self.rotation.current_epoch(),
                metadata,
            },
            rotate,
        ))
    }

    /// Authenticate and open an envelope.
    ///
    /// The expected nonce is recomputed from the claimed sequence under the
    /// *peer* role and compared to the carried nonce in constant time before
    /// any AEAD work. Frame-level failures leave the session usable.
    ///
    /// # Errors
    /// * `SessionError::SeqInvalid`: sequence 0.
    /// * `SessionError::Replay`: duplicate or stale sequence.
    /// * `SessionError::NonceMismatch`: carried nonce diverges from the
    ///   derived one (tamper alarm).
    /// * `SessionError::Aead`: authentication failure (tamper alarm).
    pub fn decrypt(&self, env: &Envelope) -> Result<(Vec<u8>, bool), SessionError> {
        if env.sequence == 0 {
            return Err(SessionError::SeqInvalid);
        }
        self.replay.accept(env.sequence)?;

        let expected = derive_nonce(&self.session_id, env.sequence, self.role.peer());
        if !ct_eq(env.nonce.as_bytes(), expected.as_bytes()) {
            warn!(sequence = env.sequence, "record nonce mismatch");
            return Err(SessionError::NonceMismatch);
        }

        let aad = metadata_aad(&env.metadata);
        let plaintext = self
            .aead
            .open(&self.recv_key, &expected, &aad, &env.ciphertext)
            .map_err(|err| {
                warn!(sequence = env.sequence, "record authentication failed");
                err
            })?;

        let rotate = self.rotation.should_rotate(Utc::now());
        Ok((plaintext, rotate))
    }

    /// Unique session identifier (public).
    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Handshake completion timestamp.
    #[must_use]
    pub fn established_at(&self) -> DateTime<Utc> {
        self.established
    }

    /// Local role within the session.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }
}

fn directional_keys(role: Role, keys: &SessionKeys) -> (AeadKey, AeadKey) {
    match role {
        Role::Initiator => (keys.client_to_server.clone(), keys.server_to_client.clone()),
        Role::Responder => (keys.server_to_client.clone(), keys.client_to_server.clone()),
    }
}

/// Canonical associated data over the metadata map: `"meta:v1;"` followed by
/// `key=value;` in lexicographic key order (the `BTreeMap` iterates sorted).
fn metadata_aad(metadata: &BTreeMap<String, String>) -> Vec<u8> {
    let mut aad = Vec::with_capacity(AAD_PREFIX.len() + metadata.len() * 16);
    aad.extend_from_slice(AAD_PREFIX);
    for (key, value) in metadata {
        aad.extend_from_slice(key.as_bytes());
        aad.push(b'=');
        aad.extend_from_slice(value.as_bytes());
        aad.push(b';');
    }
    aad
}

/// Derive the 24-byte record nonce for `(session_id, seq, sender_role)`:
/// the leading bytes of keyed BLAKE3 over `u64_be(seq) || role_byte` with
/// the session id as key.
pub(crate) fn derive_nonce(session_id: &SessionId, seq: u64, role: Role) -> RecordNonce {
    let mut hasher = blake3::Hasher::new_keyed(session_id.as_bytes());
    hasher.update(&seq.to_be_bytes());
    hasher.update(&[role.byte()]);
    let digest = hasher.finalize();
    let mut nonce = [0u8; 24];
    nonce.copy_from_slice(&digest.as_bytes()[..24]);
    RecordNonce(nonce)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::xchacha20poly1305::XChaChaAead;
    use crate::core::policy::PolicyConfig;
    use crate::test_support::{mk_metadata, mk_session_keys};

    fn config(role: Role) -> SessionConfig {
        SessionConfig {
            role,
            mode: "strict".to_string(),
            aead: "xchacha20poly1305".to_string(),
            keys: mk_session_keys(0x11),
            rotation: RotationConfig::default(),
            replay: ReplayConfig::default(),
            policy: None,
            epoch: 0,
        }
    }

    fn pair() -> (RecordSession<XChaChaAead>, RecordSession<XChaChaAead>) {
        let initiator = RecordSession::new(XChaChaAead, config(Role::Initiator)).unwrap();
        let responder = RecordSession::new(XChaChaAead, config(Role::Responder)).unwrap();
        (initiator, responder)
    }

    #[test]
    fn round_trip_both_directions() {
        let (initiator, responder) = pair();
        let (env, _) = initiator
            .encrypt(b"hello quantum", mk_metadata(&[("channel", "control")]))
            .unwrap();
        let (plain, _) = responder.decrypt(&env).unwrap();
        assert_eq!(plain, b"hello quantum");

        let (reply, _) = responder.encrypt(b"ack", BTreeMap::new()).unwrap();
        let (plain, _) = initiator.decrypt(&reply).unwrap();
        assert_eq!(plain, b"ack");
    }

    #[test]
    fn sequences_are_contiguous_from_one() {
        let (initiator, _) = pair();
        for expected in 1..=5u64 {
            let (env, _) = initiator.encrypt(b"x", BTreeMap::new()).unwrap();
            assert_eq!(env.sequence, expected);
        }
    }

    #[test]
    fn zero_sequence_rejected_before_replay() {
        let (initiator, responder) = pair();
        let (mut env, _) = initiator.encrypt(b"x", BTreeMap::new()).unwrap();
        env.sequence = 0;
        assert!(matches!(
            responder.decrypt(&env).unwrap_err(),
            SessionError::SeqInvalid
        ));
    }

    #[test]
    fn duplicate_envelope_detected() {
        let (initiator, responder) = pair();
        let (env, _) = initiator.encrypt(b"once", BTreeMap::new()).unwrap();
        responder.decrypt(&env).unwrap();
        assert!(matches!(
            responder.decrypt(&env).unwrap_err(),
            SessionError::Replay(ReplayError::Duplicate)
        ));
    }

    #[test]
    fn tampered_nonce_detected_in_constant_time_path() {
        let (initiator, responder) = pair();
        let (mut env, _) = initiator.encrypt(b"x", BTreeMap::new()).unwrap();
        env.nonce.0[0] ^= 0x01;
        assert!(matches!(
            responder.decrypt(&env).unwrap_err(),
            SessionError::NonceMismatch
        ));
    }

    #[test]
    fn tampered_ciphertext_fails_aead() {
        let (initiator, responder) = pair();
        let (mut env, _) = initiator.encrypt(b"x", BTreeMap::new()).unwrap();
        *env.ciphertext.last_mut().unwrap() ^= 0x80;
        assert!(matches!(
            responder.decrypt(&env).unwrap_err(),
            SessionError::Aead(AeadError::TagMismatch)
        ));
    }

    #[test]
    fn tampered_metadata_fails_aead() {
        let (initiator, responder) = pair();
        let (mut env, _) = initiator
            .encrypt(b"x", mk_metadata(&[("channel", "control")]))
            .unwrap();
        env.metadata
            .insert("channel".to_string(), "exfil".to_string());
        assert!(matches!(
            responder.decrypt(&env).unwrap_err(),
            SessionError::Aead(AeadError::TagMismatch)
        ));
    }

    #[test]
    fn frame_failure_does_not_poison_session() {
        let (initiator, responder) = pair();
        let (mut bad, _) = initiator.encrypt(b"first", BTreeMap::new()).unwrap();
        *bad.ciphertext.first_mut().unwrap() ^= 0xFF;
        assert!(responder.decrypt(&bad).is_err());
        let (good, _) = initiator.encrypt(b"second", BTreeMap::new()).unwrap();
        let (plain, _) = responder.decrypt(&good).unwrap();
        assert_eq!(plain, b"second");
    }

    #[test]
    fn wrong_direction_envelope_rejected() {
        // A frame sealed by the initiator fed back to the initiator: the
        // nonce was derived under the initiator role but the receiver
        // expects the peer role.
        let (initiator, _) = pair();
        let (env, _) = initiator.encrypt(b"loop", BTreeMap::new()).unwrap();
        assert!(matches!(
            initiator.decrypt(&env).unwrap_err(),
            SessionError::NonceMismatch
        ));
    }

    #[test]
    fn unsupported_aead_rejected() {
        let mut cfg = config(Role::Initiator);
        cfg.aead = "aes256gcm".to_string();
        assert!(matches!(
            RecordSession::new(XChaChaAead, cfg).unwrap_err(),
            SessionError::UnsupportedAead(_)
        ));
    }

    #[test]
    fn policy_violation_fails_construction() {
        let mut cfg = config(Role::Initiator);
        cfg.policy = Some(PolicyEnforcer::new(PolicyConfig {
            allowed_modes: vec!["hybrid".to_string()],
            ..PolicyConfig::default()
        }));
        assert!(matches!(
            RecordSession::new(XChaChaAead, cfg).unwrap_err(),
            SessionError::Policy(PolicyError::ModeNotPermitted(_))
        ));
    }

    #[test]
    fn empty_config_strings_default() {
        let mut cfg = config(Role::Initiator);
        cfg.mode = String::new();
        cfg.aead = String::new();
        let session = RecordSession::new(XChaChaAead, cfg).unwrap();
        assert_eq!(session.role(), Role::Initiator);
    }

    #[test]
    fn rotation_hint_after_max_packets() {
        let mut cfg = config(Role::Initiator);
        cfg.rotation = RotationConfig {
            interval: Duration::from_secs(3600),
            max_packets: 3,
            skew: Duration::from_secs(5),
        };
        let session = RecordSession::new(XChaChaAead, cfg).unwrap();
        let hints: Vec<bool> = (0..3)
            .map(|_| session.encrypt(b"p", BTreeMap::new()).unwrap().1)
            .collect();
        assert_eq!(hints, vec![false, false, true]);
    }

    #[test]
    fn nonce_derivation_is_deterministic_and_role_separated() {
        let id = SessionId([9u8; 32]);
        let a = derive_nonce(&id, 5, Role::Initiator);
        let b = derive_nonce(&id, 5, Role::Initiator);
        assert_eq!(a, b);
        assert_ne!(a, derive_nonce(&id, 6, Role::Initiator));
        assert_ne!(a, derive_nonce(&id, 5, Role::Responder));
        assert_ne!(a, derive_nonce(&SessionId([8u8; 32]), 5, Role::Initiator));
    }

    #[test]
    fn metadata_aad_is_canonical() {
        assert_eq!(metadata_aad(&BTreeMap::new()), b"meta:v1;");
        let aad = metadata_aad(&mk_metadata(&[("b", "2"), ("a", "1")]));
        assert_eq!(aad, b"meta:v1;a=1;b=2;");
    }
}
