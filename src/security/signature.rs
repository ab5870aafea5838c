//! Ed25519 verification of signed proxy requests.
//!
//! # Responsibilities
//! - Import the trusted issuer key from base64 SubjectPublicKeyInfo
//! - Build the canonical signed message `decimal(botId) || url`
//! - Verify detached signatures against that message
//!
//! # Design Decisions
//! - The key is an immutable value loaded once at startup and injected
//! - Verification is boolean; no error detail escapes to callers
//! - No private key material is ever held by the proxy itself

use ed25519_dalek::pkcs8::{DecodePublicKey, EncodePublicKey};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};

use crate::codec::{decode_base64, encode_base64};

/// Errors importing the trusted key.
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    /// Key text is not valid base64.
    #[error("trusted key is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Decoded bytes are not an Ed25519 SubjectPublicKeyInfo.
    #[error("trusted key is not an Ed25519 SubjectPublicKeyInfo: {0}")]
    Spki(#[from] ed25519_dalek::pkcs8::spki::Error),
}

/// The issuer public key every request must be signed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrustedKey(VerifyingKey);

impl TrustedKey {
    /// Import a base64 encoded SubjectPublicKeyInfo document.
    pub fn from_spki_base64(text: &str) -> Result<Self, KeyError> {
        let der = decode_base64(text)?;
        Self::from_spki_der(&der)
    }

    /// Import a DER encoded SubjectPublicKeyInfo document.
    pub fn from_spki_der(der: &[u8]) -> Result<Self, KeyError> {
        Ok(Self(VerifyingKey::from_public_key_der(der)?))
    }

    /// Export as base64 SubjectPublicKeyInfo, the form accepted by `PUBLIC_KEY`.
    pub fn to_spki_base64(&self) -> Result<String, KeyError> {
        let document = self.0.to_public_key_der()?;
        Ok(encode_base64(document.as_bytes()))
    }

    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.0
    }
}

impl From<VerifyingKey> for TrustedKey {
    fn from(key: VerifyingKey) -> Self {
        Self(key)
    }
}

/// Canonical signed message: the decimal bot id immediately followed by the
/// target url, with no separator.
pub fn signed_message(bot_id: i128, url: &str) -> Vec<u8> {
    format!("{bot_id}{url}").into_bytes()
}

/// Sign a request on the issuer side. Returns the lowercase hex signature
/// expected in the `signed` query parameter.
pub fn sign_request(signing_key: &SigningKey, bot_id: i128, url: &str) -> String {
    let signature = signing_key.sign(&signed_message(bot_id, url));
    hex::encode(signature.to_bytes())
}

/// Verifies request signatures against the trusted key.
#[derive(Debug, Clone)]
pub struct SignatureVerifier {
    key: TrustedKey,
}

impl SignatureVerifier {
    pub fn new(key: TrustedKey) -> Self {
        Self { key }
    }

    /// Verify raw signature bytes over a message.
    ///
    /// Anything that is not a well-formed 64-byte signature fails the same
    /// way a wrong signature does.
    pub fn verify(&self, signature: &[u8], message: &[u8]) -> bool {
        let Ok(signature) = Signature::from_slice(signature) else {
            return false;
        };
        self.key.0.verify(message, &signature).is_ok()
    }

    /// Verify a request's `signed` bytes for the given bot id and target url.
    pub fn verify_request(&self, bot_id: i128, url: &str, signature: &[u8]) -> bool {
        self.verify(signature, &signed_message(bot_id, url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode_hex;

    fn keypair() -> (SigningKey, SignatureVerifier) {
        let signing_key = SigningKey::generate(&mut rand::rngs::OsRng);
        let verifier = SignatureVerifier::new(signing_key.verifying_key().into());
        (signing_key, verifier)
    }

    fn flip_bit(bytes: &mut [u8], bit: usize) {
        bytes[bit / 8] ^= 1 << (bit % 8);
    }

    #[test]
    fn test_signed_message_has_no_separator() {
        assert_eq!(signed_message(42, "/style.css"), b"42/style.css".to_vec());
        assert_eq!(signed_message(-7, "x"), b"-7x".to_vec());
    }

    #[test]
    fn test_valid_signature_verifies() {
        let (signing_key, verifier) = keypair();
        for (bot_id, url) in [
            (42, "/style.css"),
            (0, "https://example.com/a?b=c"),
            (1_234_567_890_123_456_789, ""),
        ] {
            let signed = sign_request(&signing_key, bot_id, url);
            assert!(verifier.verify_request(bot_id, url, &decode_hex(&signed)));
        }
    }

    #[test]
    fn test_signature_bit_flip_fails() {
        let (signing_key, verifier) = keypair();
        let signature = decode_hex(&sign_request(&signing_key, 42, "/style.css"));

        for bit in [0, 7, 100, 511] {
            let mut mutated = signature.clone();
            flip_bit(&mut mutated, bit);
            assert!(!verifier.verify_request(42, "/style.css", &mutated));
        }
    }

    #[test]
    fn test_message_mutation_fails() {
        let (signing_key, verifier) = keypair();
        let signature = decode_hex(&sign_request(&signing_key, 42, "/style.css"));

        assert!(!verifier.verify_request(42 ^ 1, "/style.css", &signature));
        assert!(!verifier.verify_request(42 ^ 0b100_0000, "/style.css", &signature));
        assert!(!verifier.verify_request(42, "/style.csS", &signature));
        assert!(!verifier.verify_request(42, "/style.css ", &signature));
    }

    #[test]
    fn test_message_is_plain_concatenation() {
        // Only the concatenated bytes are signed, so the split point is not bound.
        let (signing_key, verifier) = keypair();
        let signature = decode_hex(&sign_request(&signing_key, 42, "/style.css"));
        assert!(verifier.verify_request(4, "2/style.css", &signature));
    }

    #[test]
    fn test_malformed_signature_fails() {
        let (_, verifier) = keypair();
        assert!(!verifier.verify_request(42, "/style.css", &decode_hex("abc")));
        assert!(!verifier.verify_request(42, "/style.css", &decode_hex("zz")));
        assert!(!verifier.verify_request(42, "/style.css", &[]));
        assert!(!verifier.verify_request(42, "/style.css", &[0u8; 63]));
    }

    #[test]
    fn test_wrong_key_fails() {
        let (signing_key, _) = keypair();
        let (_, other_verifier) = keypair();
        let signature = decode_hex(&sign_request(&signing_key, 42, "/style.css"));
        assert!(!other_verifier.verify_request(42, "/style.css", &signature));
    }

    #[test]
    fn test_spki_round_trip() {
        let signing_key = SigningKey::generate(&mut rand::rngs::OsRng);
        let key = TrustedKey::from(signing_key.verifying_key());
        let encoded = key.to_spki_base64().unwrap();
        assert!(encoded.starts_with("MCowBQYDK2Vw"));
        assert_eq!(TrustedKey::from_spki_base64(&encoded).unwrap(), key);
    }

    #[test]
    fn test_bad_key_material() {
        assert!(matches!(
            TrustedKey::from_spki_base64("%%%"),
            Err(KeyError::Base64(_))
        ));
        assert!(matches!(
            TrustedKey::from_spki_base64("aGVsbG8="),
            Err(KeyError::Spki(_))
        ));
    }
}
