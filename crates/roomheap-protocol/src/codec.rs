//! Codec trait and implementations for exporting values as bytes.
//!
//! The allocator itself never serializes anything. Whoever sits on the
//! outside (a log shipper, a dashboard, the demo binary) picks a codec
//! and feeds it [`Player`](crate::Player)s or
//! [`RoomSnapshot`](crate::RoomSnapshot)s.
//!
//! Currently we provide [`JsonCodec`]. A binary codec can be added
//! later without touching the room layer.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// A codec that can encode Rust values to bytes and decode bytes back.
///
/// `Send + Sync + 'static` so one codec can be shared by every task
/// that reports on the allocator.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// Behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use roomheap_protocol::{Codec, JsonCodec, Player, PlayerId};
///
/// let codec = JsonCodec;
/// let player = Player::at(PlayerId(7), "Player#7", 1_700_000_000_000);
///
/// let bytes = codec.encode(&player).unwrap();
/// let decoded: Player = codec.decode(&bytes).unwrap();
/// assert_eq!(player, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{Player, PlayerId, RoomId, RoomSnapshot};

    #[test]
    fn test_json_codec_encodes_player_with_camel_case_timestamp() {
        let player = Player::at(PlayerId(3), "Player#3", 42);
        let bytes = JsonCodec.encode(&player).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("\"createdAt\":42"), "got {text}");
    }

    #[test]
    fn test_json_codec_decodes_snapshot() {
        let json = br#"{"id":2,"capacity":4,"players":[1,5],"score":4.9,"state":"IDLE","slot":0}"#;
        let snap: RoomSnapshot = JsonCodec.decode(json).unwrap();
        assert_eq!(snap.id, RoomId(2));
        assert_eq!(snap.players, vec![PlayerId(1), PlayerId(5)]);
        assert_eq!(snap.slot, Some(0));
    }

    #[test]
    fn test_decode_garbage_returns_error() {
        let result: Result<Player, _> = JsonCodec.decode(b"not json {{{");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_decode_wrong_shape_returns_error() {
        let result: Result<Player, _> = JsonCodec.decode(br#"{"id":"seven"}"#);
        assert!(result.is_err());
    }
}
