//! Byte decoding for signature and key material.
//!
//! # Design Decisions
//! - Hex decoding never fails: malformed input yields an empty byte
//!   sequence, which the verifier rejects like any other bad signature
//! - Base64 decoding is only used for configuration, so it reports errors

use base64::Engine;

/// Base64 engine (standard alphabet, padded).
pub(crate) fn b64() -> base64::engine::GeneralPurpose {
    base64::engine::general_purpose::STANDARD
}

/// Decode a hex string (either case) two characters at a time.
///
/// Returns an empty vector if the length is odd or any pair is not a hex byte.
pub fn decode_hex(text: &str) -> Vec<u8> {
    hex::decode(text).unwrap_or_default()
}

/// Decode standard base64 into raw bytes.
pub fn decode_base64(text: &str) -> Result<Vec<u8>, base64::DecodeError> {
    b64().decode(text.trim())
}

/// Encode bytes as standard base64.
pub fn encode_base64(bytes: &[u8]) -> String {
    b64().encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_hex_mixed_case() {
        assert_eq!(decode_hex("00ff10Ab"), vec![0x00, 0xff, 0x10, 0xab]);
        assert_eq!(decode_hex(""), Vec::<u8>::new());
    }

    #[test]
    fn test_decode_hex_odd_length_is_empty() {
        assert!(decode_hex("abc").is_empty());
        assert!(decode_hex("a").is_empty());
    }

    #[test]
    fn test_decode_hex_invalid_chars_is_empty() {
        assert!(decode_hex("zz").is_empty());
        assert!(decode_hex("0g").is_empty());
        assert!(decode_hex("00 1").is_empty());
    }

    #[test]
    fn test_decode_base64() {
        assert_eq!(decode_base64("aGVsbG8=").unwrap(), b"hello".to_vec());
        assert!(decode_base64("not base64!").is_err());
    }
}
