//! Hex and text marshalling
//!
//! Everything that crosses the engine boundary travels as raw bytes.
//! Identifiers render as fixed-width uppercase hex; text payloads are UTF-8
//! with byte-length accounting (never character counts). Decoding is
//! defensive: truncated or invalid byte sequences coming back out of the
//! engine degrade to replacement characters instead of failing.

use std::borrow::Cow;

use crate::errors::FormatError;

// ----------------------------------------------------------------------------
// Hex Codec
// ----------------------------------------------------------------------------

/// Encode bytes as uppercase hexadecimal, two characters per byte.
pub fn encode_hex(bytes: &[u8]) -> String {
    hex::encode_upper(bytes)
}

/// Decode a hex string into exactly `expected_len` bytes.
///
/// Input case is ignored. Fails on non-hex characters and on any decoded
/// length other than `expected_len`.
pub fn decode_hex(text: &str, expected_len: usize) -> Result<Vec<u8>, FormatError> {
    let bytes = hex::decode(text).map_err(|_| FormatError::InvalidHex)?;
    if bytes.len() != expected_len {
        return Err(FormatError::Length {
            expected: expected_len,
            actual: bytes.len(),
        });
    }
    Ok(bytes)
}

// ----------------------------------------------------------------------------
// Text Codec
// ----------------------------------------------------------------------------

/// View text as the UTF-8 bytes the engine transmits.
pub fn encode_text(text: &str) -> &[u8] {
    text.as_bytes()
}

/// Decode engine bytes back into text.
///
/// Upstream chunking guarantees valid UTF-8 on the outbound path, but bytes
/// arriving from the engine are untrusted; invalid sequences are replaced
/// rather than propagated as errors.
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
