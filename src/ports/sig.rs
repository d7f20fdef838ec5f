use crate::ports::kem::SecretBytes;

/// Public/secret signature key material in raw encoded form.
#[derive(Debug, Clone)]
pub struct SigKeyPair {
    pub public: Vec<u8>,
    pub secret: SecretBytes,
}

/// Trait seam for signature schemes used to authenticate the handshake
/// transcript.
///
/// `verify` returns a clean boolean: malformed keys or signatures are simply
/// `false`, never a panic. This keeps the caller's failure path uniform (a
/// forged signature and a garbage signature are indistinguishable).
pub trait SignatureSuite {
    fn name(&self) -> &'static str;
    fn public_key_len(&self) -> usize;
    fn secret_key_len(&self) -> usize;
    fn signature_len(&self) -> usize;

    /// Generate a fresh keypair from system randomness.
    ///
    /// # Errors
    /// Returns `SigError::Operation` if the underlying implementation fails.
    fn generate(&self) -> Result<SigKeyPair, SigError>;

    /// Sign `message` with `secret_key`.
    ///
    /// # Errors
    /// Returns `SigError::LengthMismatch` if the key has the wrong length,
    /// or `SigError::Operation` if signing fails internally.
    fn sign(&self, secret_key: &[u8], message: &[u8]) -> Result<Vec<u8>, SigError>;

    /// Verify `signature` over `message` under `public_key`.
    fn verify(&self, public_key: &[u8], message: &[u8], signature: &[u8]) -> bool;
}

#[derive(Debug, thiserror::Error)]
pub enum SigError {
    #[error("{field} length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("signature operation failed")]
    Operation,
}
