//! XChaCha20-Poly1305 record AEAD (24-byte nonce, 16-byte tag).

use crate::ports::aead::{AeadError, AeadKey, AeadSeal, RecordNonce};
use chacha20poly1305::{
    Key, XChaCha20Poly1305, XNonce,
    aead::{Aead, KeyInit, Payload},
};

/// Canonical suite name as it appears in `CapabilitySet.aead`.
pub const XCHACHA20POLY1305: &str = "xchacha20poly1305";

/// Required record AEAD. The caller supplies a fully derived nonce, so this
/// adapter is stateless; reusing a `(key, nonce)` pair catastrophically
/// compromises confidentiality and integrity, and the record session's
/// monotonic sequence counter is what rules that out.
#[derive(Debug, Default, Clone, Copy)]
pub struct XChaChaAead;

impl AeadSeal for XChaChaAead {
    fn name(&self) -> &'static str {
        XCHACHA20POLY1305
    }

    /// Encrypt `plaintext`, returning `ciphertext || tag`.
    /// # Errors
    /// Returns `AeadError::Internal` if encryption fails.
    fn seal(
        &self,
        key: &AeadKey,
        nonce: &RecordNonce,
        aad: &[u8],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, AeadError> {
        let cipher = XChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));
        cipher
            .encrypt(
                XNonce::from_slice(nonce.as_bytes()),
                Payload {
                    msg: plaintext,
                    aad,
                },
            )
            .map_err(|_| AeadError::Internal)
    }

    /// Decrypt `ciphertext || tag`, returning the plaintext.
    /// # Errors
    /// Returns `AeadError::TagMismatch` if authentication fails.
    fn open(
        &self,
        key: &AeadKey,
        nonce: &RecordNonce,
        aad: &[u8],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, AeadError> {
        let cipher = XChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));
        cipher
            .decrypt(
                XNonce::from_slice(nonce.as_bytes()),
                Payload {
                    msg: ciphertext,
                    aad,
                },
            )
            .map_err(|_| AeadError::TagMismatch)
    }
}
