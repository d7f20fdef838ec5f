use crate::domain::handshake::errors::HandshakeError;
use crate::domain::handshake::{CapabilitySet, Digest32, HandshakeNonce};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Protocol version carried by every handshake message.
pub const PROTOCOL_VERSION: u32 = 1;

/// First handshake message, emitted by the initiator.
///
/// Carries the raw KEM ciphertext on the wire. The transcript never absorbs
/// the ciphertext verbatim; both endpoints fold in [`ClientInit::transcript_view`],
/// where the ciphertext is replaced by its BLAKE3 commitment. The commitment
/// binds the ciphertext; the bytes themselves stay out of the hashing domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientInit {
    /// Protocol version (must be 1).
    pub version: u32,
    /// Negotiation mode, compared as an exact byte string by the responder.
    pub mode: String,
    /// UTC timestamp; transcript material only, never a freshness check.
    pub timestamp: DateTime<Utc>,
    /// Randomly generated 32-byte initiator nonce.
    pub nonce: HandshakeNonce,
    /// KEM ciphertext encapsulating the shared secret (KEM-defined length).
    pub ciphertext: Vec<u8>,
    /// Advertised algorithm identifiers.
    pub capabilities: CapabilitySet,
}

impl ClientInit {
    /// Validate structural invariants (version, non-empty mode/ciphertext).
    ///
    /// # Errors
    ///
    /// Returns `Err` if any of the following hold:
    /// - `version` is not [`PROTOCOL_VERSION`]
    /// - `mode` is empty
    /// - `ciphertext` is empty
    pub fn validate(&self) -> Result<(), HandshakeError> {
        if self.version != PROTOCOL_VERSION {
            return Err(HandshakeError::InvalidInit("version must be 1"));
        }
        if self.mode.is_empty() {
            return Err(HandshakeError::InvalidInit("mode must not be empty"));
        }
        if self.ciphertext.is_empty() {
            return Err(HandshakeError::InvalidInit("ciphertext must not be empty"));
        }
        Ok(())
    }

    /// Construct a `ClientInit` and immediately validate it.
    ///
    /// # Errors
    ///
    /// Returns `Err` if structural validation fails (see [`ClientInit::validate`]).
    #[allow(clippy::new_ret_no_self)]
    pub fn new(
        mode: String,
        timestamp: DateTime<Utc>,
        nonce: HandshakeNonce,
        ciphertext: Vec<u8>,
        capabilities: CapabilitySet,
    ) -> Result<Self, HandshakeError> {
        let init = ClientInit {
            version: PROTOCOL_VERSION,
            mode,
            timestamp,
            nonce,
            ciphertext,
            capabilities,
        };
        init.validate()?;
        Ok(init)
    }

    /// Canonical transcript form: `ciphertext` replaced by its commitment.
    ///
    /// Both endpoints append exactly this form under the `"client_init"`
    /// label, so a receiver re-hashes the message identically to the sender.
    #[must_use]
    pub fn transcript_view(&self) -> ClientInitTranscript<'_> {
        ClientInitTranscript {
            version: self.version,
            mode: &self.mode,
            timestamp: &self.timestamp,
            nonce: &self.nonce,
            capabilities: &self.capabilities,
            ciphertext_hash: blake3::hash(&self.ciphertext).into(),
        }
    }
}

/// Transcript projection of [`ClientInit`]. Field order is the canonical
/// serialization order; do not reorder.
#[derive(Debug, Serialize)]
pub struct ClientInitTranscript<'a> {
    version: u32,
    mode: &'a str,
    timestamp: &'a DateTime<Utc>,
    nonce: &'a HandshakeNonce,
    capabilities: &'a CapabilitySet,
    ciphertext_hash: Digest32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{mk_caps, mk_nonce};

    fn mk_init(ciphertext: Vec<u8>) -> ClientInit {
        ClientInit::new(
            "strict".to_string(),
            Utc::now(),
            mk_nonce(7),
            ciphertext,
            mk_caps(),
        )
        .unwrap()
    }

    #[test]
    fn version_must_be_protocol_version() {
        let mut init = mk_init(vec![1, 2, 3]);
        init.version = 2;
        assert!(matches!(
            init.validate(),
            Err(HandshakeError::InvalidInit("version must be 1"))
        ));
    }

    #[test]
    fn empty_ciphertext_rejected() {
        let err = ClientInit::new(
            "strict".to_string(),
            Utc::now(),
            mk_nonce(1),
            Vec::new(),
            mk_caps(),
        )
        .unwrap_err();
        assert!(matches!(err, HandshakeError::InvalidInit(_)));
    }

    #[test]
    fn empty_mode_rejected() {
        let err = ClientInit::new(
            String::new(),
            Utc::now(),
            mk_nonce(1),
            vec![1],
            mk_caps(),
        )
        .unwrap_err();
        assert!(matches!(err, HandshakeError::InvalidInit(_)));
    }

    #[test]
    fn serde_round_trip() {
        let init = mk_init(vec![9u8; 64]);
        let bytes = serde_json::to_vec(&init).unwrap();
        let de: ClientInit = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(init, de);
    }

    #[test]
    fn transcript_view_commits_to_ciphertext() {
        let a = mk_init(vec![1u8; 32]);
        let mut b = a.clone();
        b.ciphertext[0] ^= 0xFF;
        let va = serde_json::to_vec(&a.transcript_view()).unwrap();
        let vb = serde_json::to_vec(&b.transcript_view()).unwrap();
        assert_ne!(va, vb, "commitment must bind the ciphertext");
        // The raw ciphertext bytes themselves never appear in the view.
        let va_again = serde_json::to_vec(&a.transcript_view()).unwrap();
        assert_eq!(va, va_again, "view serialization must be deterministic");
    }
}
