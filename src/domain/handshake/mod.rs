/*
Handshake message type definitions for the qsafe session core (wire v1).

This module is the single source of truth for the wire schema of the
two-message handshake: `ClientInit -> ServerResponse`.

It intentionally keeps **all secret material out** (only nonces, ciphertexts,
digests, signatures, and advisory capability strings) so zeroization is not
required for the types themselves.

Goals:
* Enforce wire-format length invariants at the type level where practical
  (fixed-size newtypes for nonces and digests).
* Provide explicit, typed failures via [`HandshakeError`] for semantic checks
  the type system cannot encode (version, mode, non-empty ciphertext).
* Keep the canonical transcript projection (`ClientInitTranscript`) next to
  the wire type it shadows, so the ciphertext-commitment rule cannot drift.

Notes:
* The raw KEM ciphertext travels on the wire but is replaced by its BLAKE3
  commitment before entering the transcript.
* Timestamps are informational transcript material; freshness is a transport
  concern.
*/

pub mod capability;
pub mod digest;
pub mod errors;
pub mod init;
pub mod nonce;
pub mod response;
#[macro_use]
mod bytes_serde;

pub use capability::*;
pub use digest::*;
pub use errors::HandshakeError;
pub use init::*;
pub use nonce::*;
pub use response::*;
