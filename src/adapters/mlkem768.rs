//! ML-KEM-768 (FIPS 203) suite over the RustCrypto `ml-kem` implementation.

use crate::ports::kem::{KemError, KemKeyPair, KemSuite, SecretBytes, SharedSecret};
use ml_kem::kem::{Decapsulate, DecapsulationKey, Encapsulate, EncapsulationKey};
use ml_kem::{Ciphertext, Encoded, EncodedSizeUser, KemCore, MlKem768, MlKem768Params};
use rand::rngs::OsRng;

/// ML-KEM-768 encapsulation key size (FIPS 203).
pub const MLKEM768_PUBLIC_KEY_LEN: usize = 1184;
/// ML-KEM-768 decapsulation key size.
pub const MLKEM768_SECRET_KEY_LEN: usize = 2400;
/// ML-KEM-768 ciphertext size.
pub const MLKEM768_CIPHERTEXT_LEN: usize = 1088;
/// ML-KEM-768 shared secret size.
pub const MLKEM768_SHARED_SECRET_LEN: usize = 32;

/// Default KEM suite. Decapsulation is implicit-rejection by construction:
/// the underlying implementation returns a pseudorandom shared secret for an
/// invalid ciphertext instead of signalling failure, so ciphertext validity
/// never leaks through errors or timing.
#[derive(Debug, Default, Clone, Copy)]
pub struct MlKem768Suite;

impl MlKem768Suite {
    fn encaps_key(public_key: &[u8]) -> Result<EncapsulationKey<MlKem768Params>, KemError> {
        let encoded = Encoded::<EncapsulationKey<MlKem768Params>>::try_from(public_key).map_err(
            |_| KemError::LengthMismatch {
                field: "kem public key",
                expected: MLKEM768_PUBLIC_KEY_LEN,
                actual: public_key.len(),
            },
        )?;
        Ok(EncapsulationKey::<MlKem768Params>::from_bytes(&encoded))
    }

    fn decaps_key(secret_key: &[u8]) -> Result<DecapsulationKey<MlKem768Params>, KemError> {
        let encoded = Encoded::<DecapsulationKey<MlKem768Params>>::try_from(secret_key).map_err(
            |_| KemError::LengthMismatch {
                field: "kem secret key",
                expected: MLKEM768_SECRET_KEY_LEN,
                actual: secret_key.len(),
            },
        )?;
        Ok(DecapsulationKey::<MlKem768Params>::from_bytes(&encoded))
    }
}

impl KemSuite for MlKem768Suite {
    fn name(&self) -> &'static str {
        "ML-KEM-768"
    }

    fn public_key_len(&self) -> usize {
        MLKEM768_PUBLIC_KEY_LEN
    }

    fn secret_key_len(&self) -> usize {
        MLKEM768_SECRET_KEY_LEN
    }

    fn ciphertext_len(&self) -> usize {
        MLKEM768_CIPHERTEXT_LEN
    }

    fn shared_secret_len(&self) -> usize {
        MLKEM768_SHARED_SECRET_LEN
    }

    fn generate(&self) -> Result<KemKeyPair, KemError> {
        let mut rng = OsRng;
        let (dk, ek) = MlKem768::generate(&mut rng);
        Ok(KemKeyPair {
            public: ek.as_bytes().as_slice().to_vec(),
            secret: SecretBytes(dk.as_bytes().as_slice().to_vec()),
        })
    }

    fn encapsulate(&self, public_key: &[u8]) -> Result<(Vec<u8>, SharedSecret), KemError> {
        let ek = Self::encaps_key(public_key)?;
        let mut rng = OsRng;
        let (ct, ss) = ek.encapsulate(&mut rng).map_err(|_| KemError::Operation)?;
        Ok((
            ct.as_slice().to_vec(),
            SharedSecret(ss.as_slice().to_vec()),
        ))
    }

    fn decapsulate(&self, secret_key: &[u8], ciphertext: &[u8]) -> Result<SharedSecret, KemError> {
        let dk = Self::decaps_key(secret_key)?;
        let ct = Ciphertext::<MlKem768>::try_from(ciphertext).map_err(|_| {
            KemError::LengthMismatch {
                field: "kem ciphertext",
                expected: MLKEM768_CIPHERTEXT_LEN,
                actual: ciphertext.len(),
            }
        })?;
        let ss = dk.decapsulate(&ct).map_err(|_| KemError::Operation)?;
        Ok(SharedSecret(ss.as_slice().to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_lengths_match_advertised() {
        let suite = MlKem768Suite;
        let kp = suite.generate().unwrap();
        assert_eq!(kp.public.len(), suite.public_key_len());
        assert_eq!(kp.secret.as_bytes().len(), suite.secret_key_len());
    }

    #[test]
    fn encapsulate_decapsulate_round_trip() {
        let suite = MlKem768Suite;
        let kp = suite.generate().unwrap();
        let (ct, ss_sender) = suite.encapsulate(&kp.public).unwrap();
        assert_eq!(ct.len(), suite.ciphertext_len());
        assert_eq!(ss_sender.len(), suite.shared_secret_len());
        let ss_receiver = suite.decapsulate(kp.secret.as_bytes(), &ct).unwrap();
        assert_eq!(ss_sender, ss_receiver);
    }

    #[test]
    fn encapsulation_is_randomized() {
        let suite = MlKem768Suite;
        let kp = suite.generate().unwrap();
        let (ct1, ss1) = suite.encapsulate(&kp.public).unwrap();
        let (ct2, ss2) = suite.encapsulate(&kp.public).unwrap();
        assert_ne!(ct1, ct2);
        assert_ne!(ss1, ss2);
    }

    #[test]
    fn wrong_length_inputs_rejected() {
        let suite = MlKem768Suite;
        let kp = suite.generate().unwrap();
        assert!(matches!(
            suite.encapsulate(&[0u8; 16]).unwrap_err(),
            KemError::LengthMismatch { .. }
        ));
        assert!(matches!(
            suite.decapsulate(kp.secret.as_bytes(), &[0u8; 16]).unwrap_err(),
            KemError::LengthMismatch { .. }
        ));
        assert!(matches!(
            suite.decapsulate(&[0u8; 16], &[0u8; MLKEM768_CIPHERTEXT_LEN]).unwrap_err(),
            KemError::LengthMismatch { .. }
        ));
    }

    #[test]
    fn corrupted_ciphertext_implicitly_rejected() {
        let suite = MlKem768Suite;
        let kp = suite.generate().unwrap();
        let (mut ct, ss_sender) = suite.encapsulate(&kp.public).unwrap();
        ct[0] ^= 0xFF;
        // Implicit rejection: no error, just an unrelated shared secret.
        let ss_receiver = suite.decapsulate(kp.secret.as_bytes(), &ct).unwrap();
        assert_ne!(ss_sender, ss_receiver);
    }
}
