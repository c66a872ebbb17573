//! Error types for the protocol layer.
//!
//! Each crate in roomheap defines its own error enum. A `ProtocolError`
//! always means the problem is in turning values into bytes or back,
//! never in allocation.

/// Errors that can occur while encoding or decoding values.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust value into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust value).
    ///
    /// Common causes: malformed JSON, missing required fields,
    /// wrong data types, or truncated input.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),
}
