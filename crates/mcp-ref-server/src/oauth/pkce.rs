//! PKCE (RFC 7636) verifier generation and S256 challenge verification
//! (spec.md §4.11).

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;
use sha2::{Digest, Sha256};

/// The 66-character unreserved-URI charset PKCE verifiers are drawn from.
const VERIFIER_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._~";

const MIN_VERIFIER_LENGTH: usize = 43;
const MAX_VERIFIER_LENGTH: usize = 128;

/// Generate a cryptographically random code verifier of `length` characters
/// drawn from the unreserved-URI charset (canonical per spec.md §9's open
/// question, preferred over a base64url-sliced alternative).
pub fn generate_code_verifier(length: usize) -> Result<String, String> {
    if !(MIN_VERIFIER_LENGTH..=MAX_VERIFIER_LENGTH).contains(&length) {
        return Err(format!("verifier length must be {MIN_VERIFIER_LENGTH}-{MAX_VERIFIER_LENGTH}, got {length}"));
    }

    let mut rng = rand::thread_rng();
    let verifier: String = (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..VERIFIER_CHARSET.len());
            VERIFIER_CHARSET[idx] as char
        })
        .collect();
    Ok(verifier)
}

/// `base64url(SHA-256(ASCII(verifier)))`, no padding.
pub fn generate_code_challenge(verifier: &str) -> Result<String, String> {
    if !(MIN_VERIFIER_LENGTH..=MAX_VERIFIER_LENGTH).contains(&verifier.len()) {
        return Err("invalid verifier length".to_string());
    }
    if !verifier.bytes().all(|b| VERIFIER_CHARSET.contains(&b)) {
        return Err("verifier contains characters outside the unreserved-URI set".to_string());
    }
    let hash = Sha256::digest(verifier.as_bytes());
    Ok(URL_SAFE_NO_PAD.encode(hash))
}

/// Constant-time (over equal-length buffers) comparison.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff: u8 = 0;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// Verify a code challenge. Only `"S256"` is accepted; `"plain"` is
/// rejected outright per MCP policy, regardless of whether it would
/// otherwise match.
pub fn verify_code_challenge(verifier: &str, challenge: &str, method: &str) -> Result<bool, String> {
    if method != "S256" {
        return Err(format!("unsupported code_challenge_method: {method}"));
    }
    let computed = generate_code_challenge(verifier).map_err(|_| "invalid code_verifier".to_string())?;
    Ok(constant_time_eq(computed.as_bytes(), challenge.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_s256_rfc7636_vector() {
        let verifier = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
        let challenge = "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM";
        assert!(verify_code_challenge(verifier, challenge, "S256").unwrap());
    }

    #[test]
    fn test_plain_method_is_always_rejected() {
        let verifier = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
        assert!(verify_code_challenge(verifier, verifier, "plain").is_err());
    }

    #[test]
    fn test_generated_pair_round_trips() {
        let verifier = generate_code_verifier(64).unwrap();
        let challenge = generate_code_challenge(&verifier).unwrap();
        assert!(verify_code_challenge(&verifier, &challenge, "S256").unwrap());
    }

    #[test]
    fn test_mismatched_verifier_fails() {
        let verifier = generate_code_verifier(64).unwrap();
        let challenge = generate_code_challenge(&verifier).unwrap();
        let other = generate_code_verifier(64).unwrap();
        assert!(!verify_code_challenge(&other, &challenge, "S256").unwrap());
    }

    #[test]
    fn test_verifier_length_bounds() {
        assert!(generate_code_verifier(42).is_err());
        assert!(generate_code_verifier(129).is_err());
        assert!(generate_code_verifier(43).is_ok());
        assert!(generate_code_verifier(128).is_ok());
    }

    #[test]
    fn test_challenge_is_pure() {
        let verifier = "a-valid.verifier_string~that-is-long-enough-for-pkce-0123456789";
        let a = generate_code_challenge(verifier).unwrap();
        let b = generate_code_challenge(verifier).unwrap();
        assert_eq!(a, b);
    }
}
