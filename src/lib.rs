//! Crate root for `qsafe`: the post-quantum session core.
//!
//! Establishes a mutually authenticated channel between an initiator and a
//! responder with a lattice-based KEM (ML-KEM-768) and signature scheme
//! (ML-DSA-65), then protects an ordered stream of application frames with
//! XChaCha20-Poly1305, replay protection, and rekey scheduling. Transport,
//! key storage, and attestation live outside this crate; the core is plain
//! synchronous functions over byte-oriented messages.
//!
//! High-level tree:
//! * `ports`: trait seams for KEM, signature, and AEAD suites.
//! * `adapters`: concrete suites (`ml-kem`, `ml-dsa`, `chacha20poly1305`).
//! * `domain`: wire message types and their structural invariants.
//! * `core`: transcript accumulator, key schedule, record session, policy,
//!   replay window, rotation manager.
//! * `application`: handshake orchestration (initiator/responder).

pub mod adapters;
pub mod application;
pub mod core;
pub mod domain;
pub mod ports;

#[cfg(test)]
pub(crate) mod test_support;
