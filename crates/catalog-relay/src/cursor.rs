//! Opaque cursors.
//!
//! A cursor is the standard base64 encoding of a row id written in decimal, so
//! id `1` becomes `"MQ=="`.

use crate::error::{RelayError, RelayResult};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Encode a row id as a cursor.
pub fn encode(id: i64) -> String {
    STANDARD.encode(id.to_string())
}

/// Decode a cursor back into a row id.
///
/// Fails with [`RelayError::InvalidCursor`] unless the payload is a plain
/// decimal, non-negative integer that fits an `i64`.
pub fn decode(cursor: &str) -> RelayResult<i64> {
    let bytes = STANDARD
        .decode(cursor)
        .map_err(|e| RelayError::invalid_cursor(format!("{cursor:?} is not base64: {e}")))?;
    let text = std::str::from_utf8(&bytes)
        .map_err(|_| RelayError::invalid_cursor(format!("{cursor:?} is not UTF-8")))?;

    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RelayError::invalid_cursor(format!(
            "{cursor:?} does not encode a non-negative integer"
        )));
    }
    text.parse::<i64>()
        .map_err(|_| RelayError::invalid_cursor(format!("{cursor:?} is out of range")))
}
