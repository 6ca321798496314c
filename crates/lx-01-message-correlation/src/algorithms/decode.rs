//! Payload decoding
//!
//! UTF-8, then JSON, then "must be an object". Anything else is topic noise.

use serde_json::Value;

use crate::domain::entities::{DecodedMessage, RawMessage};

/// Why a payload was not accepted as a decoded message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodeFailure {
    InvalidUtf8,
    InvalidJson,
    NotAnObject,
}

impl DecodeFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecodeFailure::InvalidUtf8 => "invalid_utf8",
            DecodeFailure::InvalidJson => "invalid_json",
            DecodeFailure::NotAnObject => "not_an_object",
        }
    }
}

/// Decode one raw message, annotating it with its ledger position.
pub fn decode_message(raw: &RawMessage) -> Result<DecodedMessage, DecodeFailure> {
    let text = std::str::from_utf8(&raw.payload).map_err(|_| DecodeFailure::InvalidUtf8)?;
    let value: Value = serde_json::from_str(text).map_err(|_| DecodeFailure::InvalidJson)?;

    match value {
        Value::Object(body) => Ok(DecodedMessage::new(
            body,
            raw.consensus_timestamp,
            raw.sequence_number,
        )),
        _ => Err(DecodeFailure::NotAnObject),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{ConsensusTimestamp, MessageKind};

    fn raw(payload: &[u8]) -> RawMessage {
        RawMessage::new(payload, ConsensusTimestamp::new(1_700_000_000, 5).unwrap(), 9)
    }

    #[test]
    fn test_decode_object() {
        let decoded =
            decode_message(&raw(br#"{"type":"REBALANCE_REQUEST","requestId":"r1"}"#)).unwrap();
        assert_eq!(decoded.kind(), Some(MessageKind::RebalanceRequest));
        assert_eq!(decoded.sequence_number, 9);
        assert_eq!(decoded.consensus_timestamp.nanos, 5);
    }

    #[test]
    fn test_invalid_json_is_noise() {
        assert_eq!(
            decode_message(&raw(b"{not valid json")),
            Err(DecodeFailure::InvalidJson)
        );
    }

    #[test]
    fn test_invalid_utf8_is_noise() {
        assert_eq!(
            decode_message(&raw(&[0xff, 0xfe, 0x7b])),
            Err(DecodeFailure::InvalidUtf8)
        );
    }

    #[test]
    fn test_non_object_json_is_noise() {
        for payload in [&b"[1,2,3]"[..], b"42", b"\"text\"", b"null"] {
            assert_eq!(decode_message(&raw(payload)), Err(DecodeFailure::NotAnObject));
        }
    }
}
