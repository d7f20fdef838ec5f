use core::fmt;

/// Length of transcript digests, confirmation tags, and session ids (BLAKE3).
pub const DIGEST_LEN: usize = 32;

/// 32-byte BLAKE3 digest: transcript hashes, ciphertext commitments, and
/// key-confirmation tags all travel as this type.
///
/// Public material with no zeroization requirement, but comparisons against a
/// peer-supplied digest MUST go through a constant-time equality primitive,
/// never `==`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest32(pub [u8; DIGEST_LEN]);
impl fmt::Debug for Digest32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest32(..)")
    }
}
impl Digest32 {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }
}
impl From<blake3::Hash> for Digest32 {
    fn from(h: blake3::Hash) -> Self {
        Digest32(*h.as_bytes())
    }
}
crate::impl_bytes_newtype_serde!(Digest32, DIGEST_LEN);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_blake3_hash_and_accessors() {
        let d: Digest32 = blake3::hash(b"digest input").into();
        assert_eq!(d.as_bytes(), blake3::hash(b"digest input").as_bytes());
        assert_eq!(format!("{d:?}"), "Digest32(..)");
    }

    #[test]
    fn serde_round_trip() {
        let d: Digest32 = blake3::hash(b"rt").into();
        let bytes = serde_json::to_vec(&d).unwrap();
        let de: Digest32 = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(d, de);
    }
}
