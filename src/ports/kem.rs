use core::fmt;
use zeroize::Zeroize;

/// Secret key bytes owned by the caller of a KEM or signature suite.
///
/// Variable-length because suites differ in encoding; always zeroized on drop.
#[derive(Clone, Zeroize, PartialEq, Eq)]
#[zeroize(drop)]
pub struct SecretBytes(pub Vec<u8>);
impl fmt::Debug for SecretBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretBytes(..)")
    }
}
impl SecretBytes {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// KEM shared secret. Secret material; zeroized on drop.
#[derive(Clone, Zeroize, PartialEq, Eq)]
#[zeroize(drop)]
pub struct SharedSecret(pub Vec<u8>);
impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedSecret(..)")
    }
}
impl SharedSecret {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Public/secret KEM key material in raw encoded form.
#[derive(Debug, Clone)]
pub struct KemKeyPair {
    pub public: Vec<u8>,
    pub secret: SecretBytes,
}

/// Trait seam for key encapsulation mechanisms.
///
/// Contracts:
/// * `encapsulate` is randomized; two calls against the same public key
///   yield independent `(ciphertext, shared_secret)` pairs.
/// * `decapsulate` MUST be implicit-rejection: given a ciphertext of the
///   correct length it never signals validity through an error or through
///   timing. An invalid ciphertext yields a pseudorandom shared secret.
///   Only malformed inputs (wrong lengths, undecodable keys) are errors.
pub trait KemSuite {
    fn name(&self) -> &'static str;
    fn public_key_len(&self) -> usize;
    fn secret_key_len(&self) -> usize;
    fn ciphertext_len(&self) -> usize;
    fn shared_secret_len(&self) -> usize;

    /// Generate a fresh keypair from system randomness.
    ///
    /// # Errors
    /// Returns `KemError::Operation` if the underlying implementation fails.
    fn generate(&self) -> Result<KemKeyPair, KemError>;

    /// Encapsulate to `public_key`, returning `(ciphertext, shared_secret)`.
    ///
    /// # Errors
    /// Returns `KemError::LengthMismatch` if the key has the wrong length.
    fn encapsulate(&self, public_key: &[u8]) -> Result<(Vec<u8>, SharedSecret), KemError>;

    /// Recover the shared secret from `ciphertext` (implicit rejection).
    ///
    /// # Errors
    /// Returns `KemError::LengthMismatch` if the key or ciphertext has the
    /// wrong length. A well-formed but invalid ciphertext is NOT an error.
    fn decapsulate(&self, secret_key: &[u8], ciphertext: &[u8]) -> Result<SharedSecret, KemError>;
}

#[derive(Debug, thiserror::Error)]
pub enum KemError {
    #[error("{field} length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("kem operation failed")]
    Operation,
}
