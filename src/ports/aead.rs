use core::fmt;
use zeroize::Zeroize;

/// Length of the AEAD authentication tag in bytes.
pub const AEAD_TAG_LEN: usize = 16;
/// Length of a record nonce in bytes (XChaCha20-Poly1305 extended nonce).
pub const RECORD_NONCE_LEN: usize = 24;
/// Length of a directional AEAD key in bytes.
pub const AEAD_KEY_LEN: usize = 32;

/// Directional AEAD key. Secret material; zeroized on drop.
#[derive(Clone, Zeroize, PartialEq, Eq)]
#[zeroize(drop)]
pub struct AeadKey(pub [u8; AEAD_KEY_LEN]);
impl fmt::Debug for AeadKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AeadKey(..)")
    }
}
impl AeadKey {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; AEAD_KEY_LEN] {
        &self.0
    }
}

/// 24-byte record nonce, deterministically derived per frame; public.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordNonce(pub [u8; RECORD_NONCE_LEN]);
impl RecordNonce {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; RECORD_NONCE_LEN] {
        &self.0
    }
}
crate::impl_bytes_newtype_serde!(RecordNonce, RECORD_NONCE_LEN);

/// Trait for Authenticated Encryption with Associated Data over record
/// frames.
///
/// The caller supplies a fully derived 24-byte nonce; the implementation
/// performs no nonce bookkeeping of its own. The `(key, nonce)` pair MUST be
/// unique per call to `seal`: the record session guarantees this by deriving
/// nonces from a never-repeating sequence counter.
///
/// `aad` is authenticated but not encrypted. `seal` returns
/// `ciphertext || tag`; `open` expects the same layout and returns the
/// plaintext. Any failure during `open` MUST be treated as a fatal
/// authentication failure for that frame, and implementations must not leak
/// whether the tag or the associated data mismatched.
pub trait AeadSeal {
    /// Canonical suite name as negotiated in `CapabilitySet.aead`.
    fn name(&self) -> &'static str;

    /// Encrypt `plaintext`, returning `ciphertext || tag`.
    ///
    /// # Errors
    /// Returns `AeadError::Internal` if encryption fails.
    fn seal(
        &self,
        key: &AeadKey,
        nonce: &RecordNonce,
        aad: &[u8],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, AeadError>;

    /// Decrypt `ciphertext || tag`, returning the plaintext.
    ///
    /// # Errors
    /// Returns `AeadError::TagMismatch` if authentication fails.
    fn open(
        &self,
        key: &AeadKey,
        nonce: &RecordNonce,
        aad: &[u8],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, AeadError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AeadError {
    #[error("decryption failed (tag mismatch)")]
    TagMismatch,
    #[error("internal crypto error")]
    Internal,
}
