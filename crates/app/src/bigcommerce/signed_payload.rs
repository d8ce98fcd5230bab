//! Verification of the `signed_payload` sent when the app is opened from the
//! BigCommerce control panel.
//!
//! The payload is `base64(json) "." base64(hex(HMAC-SHA256(secret, json)))`.

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Standard alphabet, with or without trailing `=`.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Reasons a signed payload is rejected.
#[derive(Debug, Error)]
pub enum SignedPayloadError {
    #[error("payload is not of the form <data>.<signature>")]
    Malformed,
    #[error("payload is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),
    #[error("signature is not a hex digest")]
    SignatureEncoding,
    #[error("signature does not match")]
    InvalidSignature,
    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A user reference inside a signed payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PayloadUser {
    pub id: Option<u64>,
    pub email: Option<String>,
}

/// Decoded, verified contents of a signed payload.
#[derive(Debug, Clone, Deserialize)]
pub struct SignedPayload {
    #[serde(default)]
    pub user: PayloadUser,
    #[serde(default)]
    pub owner: PayloadUser,
    #[serde(default)]
    pub context: String,
    pub store_hash: String,
    #[serde(default)]
    pub timestamp: f64,
}

/// Verify a signed payload and decode it.
///
/// The signature is checked in constant time before the JSON is parsed.
///
/// # Errors
///
/// Returns a `SignedPayloadError` if the payload is malformed, the signature
/// does not match `client_secret`, or the JSON cannot be decoded.
pub fn verify(
    signed_payload: &str,
    client_secret: &SecretString,
) -> Result<SignedPayload, SignedPayloadError> {
    let (data, signature) = signed_payload
        .trim()
        .split_once('.')
        .ok_or(SignedPayloadError::Malformed)?;

    let json = LENIENT.decode(data)?;
    let hex_digest = LENIENT.decode(signature)?;
    let expected = hex::decode(hex_digest).map_err(|_| SignedPayloadError::SignatureEncoding)?;

    let mut mac = HmacSha256::new_from_slice(client_secret.expose_secret().as_bytes())
        .map_err(|_| SignedPayloadError::InvalidSignature)?;
    mac.update(&json);
    mac.verify_slice(&expected)
        .map_err(|_| SignedPayloadError::InvalidSignature)?;

    Ok(serde_json::from_slice(&json)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use base64::engine::general_purpose::STANDARD;

    use super::*;

    const SECRET: &str = "3f9b1c7a0e24d58b6a91fc0d7e3b52a8";

    fn sign(json: &str, secret: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(json.as_bytes());
        let digest = hex::encode(mac.finalize().into_bytes());
        format!("{}.{}", STANDARD.encode(json), STANDARD.encode(digest))
    }

    fn payload() -> &'static str {
        r#"{"user":{"id":9,"email":"owner@example.com"},"owner":{"id":9,"email":"owner@example.com"},"context":"stores/abc123","store_hash":"abc123","timestamp":1700000000.5}"#
    }

    #[test]
    fn test_verify_valid_payload() {
        let signed = sign(payload(), SECRET);
        let decoded = verify(&signed, &SecretString::from(SECRET)).unwrap();

        assert_eq!(decoded.store_hash, "abc123");
        assert_eq!(decoded.context, "stores/abc123");
        assert_eq!(decoded.user.email.as_deref(), Some("owner@example.com"));
    }

    #[test]
    fn test_verify_accepts_unpadded_base64() {
        let signed = sign(payload(), SECRET).replace('=', "");
        assert!(verify(&signed, &SecretString::from(SECRET)).is_ok());
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let signed = sign(payload(), "a-different-client-secret");
        assert!(matches!(
            verify(&signed, &SecretString::from(SECRET)),
            Err(SignedPayloadError::InvalidSignature)
        ));
    }

    #[test]
    fn test_verify_rejects_tampered_data() {
        let signed = sign(payload(), SECRET);
        let (_, signature) = signed.split_once('.').unwrap();
        let forged = STANDARD.encode(payload().replace("abc123", "zzz999"));

        assert!(matches!(
            verify(&format!("{forged}.{signature}"), &SecretString::from(SECRET)),
            Err(SignedPayloadError::InvalidSignature)
        ));
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let secret = SecretString::from(SECRET);
        assert!(matches!(verify("no-dot-here", &secret), Err(SignedPayloadError::Malformed)));
        assert!(matches!(verify("!!!.???", &secret), Err(SignedPayloadError::Encoding(_))));
        assert!(matches!(
            verify(&format!("{}.{}", STANDARD.encode("{}"), STANDARD.encode("not-hex")), &secret),
            Err(SignedPayloadError::SignatureEncoding)
        ));
    }
}
