//! Query-value escaping.
//!
//! Values use the `application/x-www-form-urlencoded` rules: unreserved
//! bytes pass through, space becomes `+`, and everything else is written as
//! an uppercase `%XX` escape. Unescaping is strict: a `%` that is not
//! followed by two hex digits is an error rather than being kept literally.

use thiserror::Error;

static HEX_CHARS: &[u8; 16] = b"0123456789ABCDEF";

/// Error produced when a query value cannot be unescaped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EscapeError {
    /// `%` not followed by two hexadecimal digits.
    #[error("invalid URL escape at byte {offset}")]
    InvalidEscape {
        /// Byte offset of the `%` within the value.
        offset: usize,
    },

    /// The unescaped bytes are not valid UTF-8.
    #[error("unescaped value is not valid UTF-8")]
    InvalidUtf8,
}

/// Escape a parameter value for use in a DSN query string.
///
/// ```rust
/// use prax_dsn::escape::query_escape;
///
/// assert_eq!(query_escape("utf8mb4"), "utf8mb4");
/// assert_eq!(query_escape("a b/c"), "a+b%2Fc");
/// ```
pub fn query_escape(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut encoded = String::with_capacity(bytes.len() * 11 / 10);

    for &b in bytes {
        match b {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(b as char);
            }
            b' ' => encoded.push('+'),
            _ => {
                encoded.push('%');
                encoded.push(HEX_CHARS[(b >> 4) as usize] as char);
                encoded.push(HEX_CHARS[(b & 0x0F) as usize] as char);
            }
        }
    }
    encoded
}

/// Unescape a parameter value taken from a DSN query string.
///
/// ```rust
/// use prax_dsn::escape::{query_unescape, EscapeError};
///
/// assert_eq!(query_unescape("a+b%2Fc").unwrap(), "a b/c");
/// assert_eq!(
///     query_unescape("100%"),
///     Err(EscapeError::InvalidEscape { offset: 3 })
/// );
/// ```
pub fn query_unescape(value: &str) -> Result<String, EscapeError> {
    let bytes = value.as_bytes();

    // Fast path: nothing to decode.
    if !bytes.iter().any(|&b| b == b'%' || b == b'+') {
        return Ok(value.to_string());
    }

    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let byte = bytes
                    .get(i + 1..i + 3)
                    .and_then(|pair| decode_hex_byte(pair[0], pair[1]))
                    .ok_or(EscapeError::InvalidEscape { offset: i })?;
                decoded.push(byte);
                i += 3;
            }
            b'+' => {
                decoded.push(b' ');
                i += 1;
            }
            b => {
                decoded.push(b);
                i += 1;
            }
        }
    }

    String::from_utf8(decoded).map_err(|_| EscapeError::InvalidUtf8)
}

#[inline]
fn decode_hex_byte(h: u8, l: u8) -> Option<u8> {
    let high = hex_to_int(h)?;
    let low = hex_to_int(l)?;
    Some((high << 4) | low)
}

#[inline]
fn hex_to_int(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'A'..=b'F' => Some(b - b'A' + 10),
        b'a'..=b'f' => Some(b - b'a' + 10),
        _ => None,
    }
}
