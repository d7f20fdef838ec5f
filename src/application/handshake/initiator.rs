use crate::application::handshake::{
    DEFAULT_MODE, HANDSHAKE_DOMAIN, LABEL_CLIENT_INIT, LABEL_SERVER_PAYLOAD,
};
use crate::core::ct::ct_eq;
use crate::core::keyschedule::{self, ScheduleConfig, SessionKeys};
use crate::core::transcript::Accumulator;
use crate::domain::handshake::{
    CapabilitySet, ClientInit, HandshakeError, HandshakeNonce, ServerResponse,
};
use crate::ports::kem::{KemSuite, SharedSecret};
use crate::ports::sig::SignatureSuite;
use chrono::Utc;
use rand::RngCore;
use rand::rngs::OsRng;
use tracing::debug;

/// Materials the initiating endpoint needs: the responder's long-term
/// public keys plus suite instances and schedule tunables.
pub struct InitiatorConfig<K, S> {
    pub mode: String,
    pub kem: K,
    pub server_kem_public: Vec<u8>,
    pub sig: S,
    pub server_sig_public: Vec<u8>,
    pub schedule: ScheduleConfig,
    pub capabilities: CapabilitySet,
}

/// Handshake initiator (`Idle` state). Reusable: each [`Initiator::initiate`]
/// call starts an independent handshake with fresh randomness.
pub struct Initiator<K: KemSuite, S: SignatureSuite> {
    cfg: InitiatorConfig<K, S>,
}

impl<K: KemSuite, S: SignatureSuite> std::fmt::Debug for Initiator<K, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Initiator").finish()
    }
}

impl<K: KemSuite, S: SignatureSuite> Initiator<K, S> {
    /// Validate the configuration and construct an initiator.
    ///
    /// # Errors
    /// Returns `HandshakeError::InvalidConfig` if a required public key is
    /// missing. An empty mode defaults to `"strict"`.
    pub fn new(mut cfg: InitiatorConfig<K, S>) -> Result<Self, HandshakeError> {
        if cfg.server_kem_public.is_empty() {
            return Err(HandshakeError::InvalidConfig("server KEM public key missing"));
        }
        if cfg.server_sig_public.is_empty() {
            return Err(HandshakeError::InvalidConfig(
                "server signature public key missing",
            ));
        }
        if cfg.mode.is_empty() {
            cfg.mode = DEFAULT_MODE.to_string();
        }
        Ok(Self { cfg })
    }

    /// Produce `ClientInit` and the pending state for finalization.
    ///
    /// Encapsulates to the responder's KEM key, then appends the canonical
    /// commitment form of the message (ciphertext replaced by its hash) to a
    /// fresh transcript. The emitted message carries the raw ciphertext.
    ///
    /// # Errors
    /// Propagates KEM encapsulation and transcript failures.
    pub fn initiate(&self) -> Result<(ClientInit, PendingInitiator<'_, K, S>), HandshakeError> {
        let transcript = Accumulator::new(HANDSHAKE_DOMAIN);

        let mut nonce = [0u8; 32];
        OsRng.fill_bytes(&mut nonce);

        let (ciphertext, shared_secret) = self.cfg.kem.encapsulate(&self.cfg.server_kem_public)?;

        let init = ClientInit::new(
            self.cfg.mode.clone(),
            Utc::now(),
            HandshakeNonce(nonce),
            ciphertext,
            self.cfg.capabilities.clone(),
        )?;
        transcript.append(LABEL_CLIENT_INIT, &init.transcript_view())?;

        Ok((
            init,
            PendingInitiator {
                initiator: self,
                transcript,
                shared_secret,
            },
        ))
    }
}

/// `Initiated` state: holds the transcript and the encapsulated shared
/// secret between `initiate` and `finish`. Dropping it (on failure or
/// abandonment) zeroizes the shared secret.
pub struct PendingInitiator<'a, K: KemSuite, S: SignatureSuite> {
    initiator: &'a Initiator<K, S>,
    transcript: Accumulator,
    shared_secret: SharedSecret,
}

impl<K: KemSuite, S: SignatureSuite> PendingInitiator<'_, K, S> {
    /// Validate the responder's reply and derive session keys. One-shot:
    /// consumes the pending state on every path.
    ///
    /// Check order: mode equality, transcript digest (constant time),
    /// transcript signature, key derivation, confirmation tag (constant
    /// time).
    ///
    /// # Errors
    /// * `HandshakeError::ModeMismatch`: responder negotiated a different
    ///   mode.
    /// * `HandshakeError::TranscriptMismatch`: digests diverge.
    /// * `HandshakeError::SignatureInvalid`: signature does not verify.
    /// * `HandshakeError::ConfirmationMismatch`: peer derived different
    ///   keys.
    pub fn finish(self, resp: &ServerResponse) -> Result<SessionKeys, HandshakeError> {
        let cfg = &self.initiator.cfg;

        if resp.payload.mode != cfg.mode {
            return Err(HandshakeError::ModeMismatch {
                expected: cfg.mode.clone(),
                got: resp.payload.mode.clone(),
            });
        }

        self.transcript.append(LABEL_SERVER_PAYLOAD, &resp.payload)?;
        let digest = self.transcript.snapshot();
        if !ct_eq(digest.as_bytes(), resp.transcript_hash.as_bytes()) {
            return Err(HandshakeError::TranscriptMismatch);
        }

        if !cfg
            .sig
            .verify(&cfg.server_sig_public, digest.as_bytes(), &resp.signature)
        {
            return Err(HandshakeError::SignatureInvalid);
        }

        let keys = keyschedule::derive(&self.shared_secret, &digest, &cfg.schedule)?;

        let confirm = keyschedule::confirm(&keys.server_to_client, &digest);
        if !keyschedule::confirm_matches(&confirm, &resp.confirmation) {
            return Err(HandshakeError::ConfirmationMismatch);
        }

        debug!(mode = %cfg.mode, "handshake finished");
        Ok(keys)
    }
}
