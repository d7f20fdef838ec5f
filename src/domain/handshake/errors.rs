use crate::core::keyschedule::ScheduleError;
use crate::core::transcript::TranscriptError;
use crate::ports::kem::KemError;
use crate::ports::sig::SigError;
use thiserror::Error;

/// ---- Handshake error taxonomy ----
/// Every variant is fatal to the handshake: the caller discards all derived
/// state (pending values zeroize their secrets on drop) and reports the kind
/// to the transport.
#[derive(Debug, Error)]
pub enum HandshakeError {
    /// Negotiated mode strings differ (compared as exact byte strings).
    #[error("handshake mode mismatch (expected {expected}, got {got})")]
    ModeMismatch { expected: String, got: String },
    /// Locally recomputed transcript digest differs from the peer's claim.
    #[error("handshake transcript hash mismatch")]
    TranscriptMismatch,
    /// Responder signature over the transcript digest did not verify.
    #[error("handshake signature verification failed")]
    SignatureInvalid,
    /// Key-confirmation tag differs: peer derived different session keys.
    #[error("handshake confirmation mismatch")]
    ConfirmationMismatch,
    /// KEM encapsulation/decapsulation rejected malformed material.
    #[error("handshake kem: {0}")]
    Kem(#[from] KemError),
    /// Signature suite failed operationally (malformed key material).
    #[error("handshake signature suite: {0}")]
    Sig(#[from] SigError),
    /// Transcript accumulation failed (serialization of a contribution).
    #[error("handshake transcript: {0}")]
    Transcript(#[from] TranscriptError),
    /// Key schedule rejected its inputs.
    #[error("handshake key schedule: {0}")]
    Schedule(#[from] ScheduleError),
    /// Endpoint configuration is unusable (missing key material).
    #[error("handshake config: {0}")]
    InvalidConfig(&'static str),
    /// Received `ClientInit` failed structural validation.
    #[error("client init invalid: {0}")]
    InvalidInit(&'static str),
    /// Generic field length mismatch.
    #[error("{field} length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
}
