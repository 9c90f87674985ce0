use base64::{Engine as _, engine::general_purpose};
use rand::rngs::OsRng;
use rand::{Rng, RngCore, distributions::Alphanumeric};
use sha2::{Digest, Sha256};

/// The size of a session token in bytes.
const SESSION_TOKEN_SIZE: usize = 32;
/// The size of the CSRF token in bytes.
const CSRF_TOKEN_SIZE: usize = 32;
/// The length of the random tail of a human-readable code.
const CODE_SUFFIX_LEN: usize = 8;

/// Generates a new opaque session token.
///
/// # Returns
///
/// A URL-safe base64-encoded token from 32 CSPRNG bytes.
pub fn generate_session_token() -> String {
    let mut token = [0u8; SESSION_TOKEN_SIZE];
    OsRng.fill_bytes(&mut token);

    general_purpose::URL_SAFE_NO_PAD.encode(token)
}

/// Generates a new random CSRF token.
///
/// # Returns
///
/// A URL-safe base64-encoded CSRF token.
pub fn generate_csrf_token() -> String {
    let mut token = [0u8; CSRF_TOKEN_SIZE];
    OsRng.fill_bytes(&mut token);

    general_purpose::URL_SAFE_NO_PAD.encode(token)
}

/// Hashes a raw token for use as a storage key.
///
/// Session stores never hold the raw token, only this digest.
pub fn token_digest(raw_token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw_token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generates a human-readable code like `REQ-7F2K9QXB`.
///
/// # Arguments
///
/// * `prefix` - The code family, e.g. `"REQ"` or `"PAY"`.
pub fn generate_code(prefix: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(CODE_SUFFIX_LEN)
        .map(char::from)
        .map(|c| c.to_ascii_uppercase())
        .collect();

    format!("{}-{}", prefix, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_tokens_are_unique_and_urlsafe() {
        let a = generate_session_token();
        let b = generate_session_token();
        assert_ne!(a, b);
        // 32 bytes -> 43 unpadded base64 chars
        assert_eq!(a.len(), 43);
        assert!(!a.contains('+') && !a.contains('/') && !a.contains('='));
    }

    #[test]
    fn digest_is_stable_hex() {
        let token = "some-raw-token";
        let d1 = token_digest(token);
        let d2 = token_digest(token);
        assert_eq!(d1, d2);
        assert_eq!(d1.len(), 64);
        assert!(d1.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(d1, token_digest("some-other-token"));
    }

    #[test]
    fn codes_carry_prefix_and_eight_alphanumerics() {
        let code = generate_code("REQ");
        assert!(code.starts_with("REQ-"));
        let suffix = &code["REQ-".len()..];
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
