use subtle::ConstantTimeEq;

/// Timing-independent equality over byte slices.
///
/// Every comparison against peer-supplied digests, confirmation tags, and
/// record nonces goes through here. The length check short-circuits, which
/// is fine: lengths are public (fixed by the wire format).
#[must_use]
pub fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && bool::from(a.ct_eq(b))
}
