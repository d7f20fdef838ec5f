//! Handshake orchestration.
//!
//! Coordinates the two-message flow, invoking domain validation, updating
//! the transcript, and deriving keys via the key schedule:
//!
//! - Initiator: [`Initiator::initiate`] emits `ClientInit` and yields a
//!   [`PendingInitiator`]; [`PendingInitiator::finish`] consumes it against
//!   the `ServerResponse` and returns [`SessionKeys`].
//! - Responder: [`Responder::accept`] is single-shot; it consumes a
//!   `ClientInit` and returns `(ServerResponse, SessionKeys)`.
//!
//! The initiator state machine `Idle -> Initiated -> Completed` is encoded
//! in ownership rather than a runtime enum: `Initiated` is the pending value
//! existing, and `finish` is a one-shot consuming transition. Every failure
//! path drops the pending value, which zeroizes the held shared secret, so the
//! terminal `Aborted` state is reached by construction, as is abandonment
//! (just drop the pending value).
//!
//! Layer boundaries:
//! - **`domain::handshake`**: wire types + structural invariants, no crypto.
//! - **`ports`/`adapters`**: concrete KEM/signature/AEAD, no protocol
//!   knowledge.
//! - **`core`**: transcript, key schedule, record session.
//! - **this module**: sequencing, transcript labels, constant-time checks.

mod initiator;
mod responder;

pub use initiator::{Initiator, InitiatorConfig, PendingInitiator};
pub use responder::{Responder, ResponderConfig};

use crate::core::keyschedule::SessionKeys;

/// Domain string seeding every handshake transcript.
pub const HANDSHAKE_DOMAIN: &str = "qsafe-handshake";
/// Mode assumed when an endpoint config leaves it unset.
pub const DEFAULT_MODE: &str = "strict";

/// Transcript label for the client's opening contribution.
pub(crate) const LABEL_CLIENT_INIT: &str = "client_init";
/// Transcript label for the signed server payload.
pub(crate) const LABEL_SERVER_PAYLOAD: &str = "server_payload";

// Re-exported so transports can name the handshake result without reaching
// into `core`.
pub type HandshakeKeys = SessionKeys;
