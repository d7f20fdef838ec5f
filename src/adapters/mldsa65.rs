//! ML-DSA-65 (FIPS 204) suite over the RustCrypto `ml-dsa` implementation.

use crate::ports::kem::SecretBytes;
use crate::ports::sig::{SigError, SigKeyPair, SignatureSuite};
use ml_dsa::{
    EncodedSigningKey, EncodedVerifyingKey, KeyGen, MlDsa65, Signature, SigningKey, VerifyingKey,
};
use rand::rngs::OsRng;

/// ML-DSA-65 verifying key size (FIPS 204).
pub const MLDSA65_PUBLIC_KEY_LEN: usize = 1952;
/// ML-DSA-65 signing key size.
pub const MLDSA65_SECRET_KEY_LEN: usize = 4032;
/// ML-DSA-65 signature size.
pub const MLDSA65_SIGNATURE_LEN: usize = 3309;

/// Default signature suite for transcript authentication. Signing is the
/// deterministic variant with an empty context string; verification never
/// panics on malformed bytes, it simply reports `false`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MlDsa65Suite;

impl SignatureSuite for MlDsa65Suite {
    fn name(&self) -> &'static str {
        "ML-DSA-65"
    }

    fn public_key_len(&self) -> usize {
        MLDSA65_PUBLIC_KEY_LEN
    }

    fn secret_key_len(&self) -> usize {
        MLDSA65_SECRET_KEY_LEN
    }

    fn signature_len(&self) -> usize {
        MLDSA65_SIGNATURE_LEN
    }

    fn generate(&self) -> Result<SigKeyPair, SigError> {
        let mut rng = OsRng;
        let kp = MlDsa65::key_gen(&mut rng);
        Ok(SigKeyPair {
            public: kp.verifying_key().encode().as_slice().to_vec(),
            secret: SecretBytes(kp.signing_key().encode().as_slice().to_vec()),
        })
    }

    fn sign(&self, secret_key: &[u8], message: &[u8]) -> Result<Vec<u8>, SigError> {
        let encoded =
            EncodedSigningKey::<MlDsa65>::try_from(secret_key).map_err(|_| {
                SigError::LengthMismatch {
                    field: "signing key",
                    expected: MLDSA65_SECRET_KEY_LEN,
                    actual: secret_key.len(),
                }
            })?;
        let sk = SigningKey::<MlDsa65>::decode(&encoded);
        let sig = sk
            .sign_deterministic(message, &[])
            .map_err(|_| SigError::Operation)?;
        Ok(sig.encode().as_slice().to_vec())
    }

    fn verify(&self, public_key: &[u8], message: &[u8], signature: &[u8]) -> bool {
        let Ok(encoded) = EncodedVerifyingKey::<MlDsa65>::try_from(public_key) else {
            return false;
        };
        let vk = VerifyingKey::<MlDsa65>::decode(&encoded);
        let Ok(sig) = Signature::<MlDsa65>::try_from(signature) else {
            return false;
        };
        vk.verify_with_context(message, &[], &sig)
    }
}
