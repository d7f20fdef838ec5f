use crate::domain::handshake::{CapabilitySet, Digest32, HandshakeNonce};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Signed portion of the responder's reply. Appended to the transcript under
/// the `"server_payload"` label; field order is the canonical serialization
/// order, do not reorder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerPayload {
    /// Protocol version (must be 1).
    pub version: u32,
    /// Negotiation mode echoed by the responder.
    pub mode: String,
    /// UTC timestamp; transcript material only.
    pub timestamp: DateTime<Utc>,
    /// Randomly generated 32-byte responder nonce.
    pub nonce: HandshakeNonce,
    /// Rekey interval the responder will observe, in seconds.
    pub rotation_secs: u32,
    /// Responder's advertised algorithm identifiers.
    pub capabilities: CapabilitySet,
}

/// Complete responder reply: the signed payload plus the transcript digest
/// the responder committed to, its signature over that digest, and the
/// key-confirmation tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerResponse {
    pub payload: ServerPayload,
    /// Responder's transcript digest; the initiator recomputes and compares
    /// in constant time.
    pub transcript_hash: Digest32,
    /// Signature over `transcript_hash` under the responder identity key.
    pub signature: Vec<u8>,
    /// `confirm(server_to_client_key, transcript_hash)`; proves matching
    /// key derivation.
    pub confirmation: Digest32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{mk_caps, mk_nonce};

    fn payload() -> ServerPayload {
        ServerPayload {
            version: 1,
            mode: "strict".to_string(),
            timestamp: Utc::now(),
            nonce: mk_nonce(3),
            rotation_secs: 900,
            capabilities: mk_caps(),
        }
    }

    #[test]
    fn payload_serde_round_trip() {
        let p = payload();
        let bytes = serde_json::to_vec(&p).unwrap();
        let de: ServerPayload = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(p, de);
    }

    #[test]
    fn response_serde_round_trip() {
        let resp = ServerResponse {
            payload: payload(),
            transcript_hash: blake3::hash(b"th").into(),
            signature: vec![7u8; 64],
            confirmation: blake3::hash(b"confirm").into(),
        };
        let bytes = serde_json::to_vec(&resp).unwrap();
        let de: ServerResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(resp, de);
    }

    #[test]
    fn unknown_fields_rejected() {
        let mut v = serde_json::to_value(payload()).unwrap();
        v.as_object_mut()
            .unwrap()
            .insert("extra".to_string(), serde_json::json!(1));
        assert!(serde_json::from_value::<ServerPayload>(v).is_err());
    }
}
