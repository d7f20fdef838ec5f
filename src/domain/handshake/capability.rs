use serde::{Deserialize, Serialize};

/// Algorithm identifiers advertised during the handshake.
///
/// Why plain `String`s (not enums): the capability space is intentionally
/// open: peers must be able to forward and record identifiers they do not
/// implement without a code/deploy cycle. Policy decides what is actually
/// permitted; this type only carries the advertisement.
///
/// `transports` keeps its wire order: it is a preference list, most
/// preferred first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CapabilitySet {
    /// Post-quantum KEM identifier (e.g. `"Kyber768"`).
    pub pq_kem: String,
    /// Post-quantum signature identifier (e.g. `"Dilithium3"`).
    pub pq_sigs: String,
    /// Record AEAD identifier (e.g. `"xchacha20poly1305"`).
    pub aead: String,
    /// Transport preference list, order preserved.
    pub transports: Vec<String>,
}
