use crate::application::handshake::{
    DEFAULT_MODE, HANDSHAKE_DOMAIN, LABEL_CLIENT_INIT, LABEL_SERVER_PAYLOAD,
};
use crate::core::keyschedule::{self, DEFAULT_ROTATION_INTERVAL, ScheduleConfig, SessionKeys};
use crate::core::transcript::Accumulator;
use crate::domain::handshake::{
    CapabilitySet, ClientInit, HandshakeError, HandshakeNonce, PROTOCOL_VERSION, ServerPayload,
    ServerResponse,
};
use crate::ports::kem::{KemKeyPair, KemSuite};
use crate::ports::sig::{SigKeyPair, SignatureSuite};
use chrono::Utc;
use rand::RngCore;
use rand::rngs::OsRng;
use tracing::debug;

/// Materials the accepting endpoint needs: its long-term KEM and signature
/// keypairs plus suite instances and schedule tunables.
pub struct ResponderConfig<K, S> {
    pub mode: String,
    pub kem: K,
    pub kem_keypair: KemKeyPair,
    pub sig: S,
    pub sig_keypair: SigKeyPair,
    pub schedule: ScheduleConfig,
    pub capabilities: CapabilitySet,
}

/// Handshake responder. `accept` is single-shot per `ClientInit`
/// (`Idle -> Completed`); on failure all partially derived state drops
/// (and zeroizes) before the error returns.
pub struct Responder<K: KemSuite, S: SignatureSuite> {
    cfg: ResponderConfig<K, S>,
}

impl<K: KemSuite, S: SignatureSuite> std::fmt::Debug for Responder<K, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Responder").finish()
    }
}

impl<K: KemSuite, S: SignatureSuite> Responder<K, S> {
    /// Validate the configuration and construct a responder.
    ///
    /// # Errors
    /// Returns `HandshakeError::InvalidConfig` if a keypair is incomplete.
    /// An empty mode defaults to `"strict"`.
    pub fn new(mut cfg: ResponderConfig<K, S>) -> Result<Self, HandshakeError> {
        if cfg.kem_keypair.public.is_empty() || cfg.kem_keypair.secret.is_empty() {
            return Err(HandshakeError::InvalidConfig("KEM keypair missing"));
        }
        if cfg.sig_keypair.public.is_empty() || cfg.sig_keypair.secret.is_empty() {
            return Err(HandshakeError::InvalidConfig("signature keypair missing"));
        }
        if cfg.mode.is_empty() {
            cfg.mode = DEFAULT_MODE.to_string();
        }
        Ok(Self { cfg })
    }

    /// Public KEM key initiators encapsulate to.
    #[must_use]
    pub fn kem_public(&self) -> &[u8] {
        &self.cfg.kem_keypair.public
    }

    /// Public signature key initiators verify the transcript against.
    #[must_use]
    pub fn sig_public(&self) -> &[u8] {
        &self.cfg.sig_keypair.public
    }

    /// Process a `ClientInit`: rebuild its transcript contribution, derive
    /// the shared secret (implicit rejection), and produce the signed,
    /// key-confirming response alongside the derived session keys.
    ///
    /// The commitment form of `client_init` enters the transcript before the
    /// mode check so a rejected handshake still leaves an auditable record
    /// of what was offered.
    ///
    /// # Errors
    /// * `HandshakeError::InvalidInit`: structural validation failed.
    /// * `HandshakeError::ModeMismatch`: the offered mode differs.
    /// * `HandshakeError::Kem`: decapsulation rejected malformed material.
    pub fn accept(
        &self,
        init: &ClientInit,
    ) -> Result<(ServerResponse, SessionKeys), HandshakeError> {
        init.validate()?;

        let transcript = Accumulator::new(HANDSHAKE_DOMAIN);
        transcript.append(LABEL_CLIENT_INIT, &init.transcript_view())?;

        if init.mode != self.cfg.mode {
            return Err(HandshakeError::ModeMismatch {
                expected: self.cfg.mode.clone(),
                got: init.mode.clone(),
            });
        }

        let shared_secret = self
            .cfg
            .kem
            .decapsulate(self.cfg.kem_keypair.secret.as_bytes(), &init.ciphertext)?;

        let mut nonce = [0u8; 32];
        OsRng.fill_bytes(&mut nonce);

        let rotation_interval = if self.cfg.schedule.rotation_interval.is_zero() {
            DEFAULT_ROTATION_INTERVAL
        } else {
            self.cfg.schedule.rotation_interval
        };
        let payload = ServerPayload {
            version: PROTOCOL_VERSION,
            mode: self.cfg.mode.clone(),
            timestamp: Utc::now(),
            nonce: HandshakeNonce(nonce),
            rotation_secs: u32::try_from(rotation_interval.as_secs()).unwrap_or(u32::MAX),
            capabilities: self.cfg.capabilities.clone(),
        };
        transcript.append(LABEL_SERVER_PAYLOAD, &payload)?;

        let digest = transcript.snapshot();
        let keys = keyschedule::derive(&shared_secret, &digest, &self.cfg.schedule)?;

        let signature = self
            .cfg
            .sig
            .sign(self.cfg.sig_keypair.secret.as_bytes(), digest.as_bytes())?;
        let confirmation = keyschedule::confirm(&keys.server_to_client, &digest);

        debug!(mode = %self.cfg.mode, "handshake accepted");
        Ok((
            ServerResponse {
                payload,
                transcript_hash: digest,
                signature,
                confirmation,
            },
            keys,
        ))
    }
}
