use crate::domain::handshake::errors::HandshakeError;
use core::fmt;

/// Length of handshake nonces in bytes.
pub const HANDSHAKE_NONCE_LEN: usize = 32;

/// 32-byte nonce carried in `ClientInit.nonce` and `ServerPayload.nonce`.
///
/// Bound into the transcript through payload serialization, which is what
/// gives each handshake its per-run freshness.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct HandshakeNonce(pub [u8; HANDSHAKE_NONCE_LEN]);
impl fmt::Debug for HandshakeNonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HandshakeNonce(..)")
    }
}
crate::impl_bytes_newtype_serde!(HandshakeNonce, HANDSHAKE_NONCE_LEN);

impl HandshakeNonce {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; HANDSHAKE_NONCE_LEN] {
        &self.0
    }

    /// Create a `HandshakeNonce` from a byte slice, validating length.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the input slice length does not match
    /// `HANDSHAKE_NONCE_LEN`.
    pub fn from_bytes(b: &[u8]) -> Result<Self, HandshakeError> {
        if b.len() != HANDSHAKE_NONCE_LEN {
            return Err(HandshakeError::LengthMismatch {
                field: "HandshakeNonce",
                expected: HANDSHAKE_NONCE_LEN,
                actual: b.len(),
            });
        }
        let mut arr = [0u8; HANDSHAKE_NONCE_LEN];
        arr.copy_from_slice(b);
        Ok(HandshakeNonce(arr))
    }
}
