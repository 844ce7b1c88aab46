//! Base64 helpers for transport payloads.
//!
//! Every binary blob that crosses the wire (cheque scans, attachment
//! files, PDF pages) travels as standard-alphabet base64.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use crate::error::CoreError;

/// Encode raw bytes for a request payload.
pub fn encode(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}

/// Decode a base64 payload back into raw bytes.
pub fn decode(encoded: &str) -> Result<Vec<u8>, CoreError> {
    Ok(BASE64.decode(encoded.trim())?)
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_round_trip() {
        let bytes = vec![0u8, 1, 2, 254, 255];
        let encoded = encode(&bytes);
        assert_eq!(decode(&encoded).unwrap(), bytes);
    }

    #[test]
    fn test_decode_tolerates_surrounding_whitespace() {
        assert_eq!(decode("  aGVsbG8=\n").unwrap(), b"hello");
    }

    #[test]
    fn test_decode_rejects_invalid_input() {
        assert!(decode("not!!base64").is_err());
    }
}
