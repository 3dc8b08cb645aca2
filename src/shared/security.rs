//! Usage: Security-sensitive helpers (token masking and one-way fingerprints for logs).

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use sha2::{Digest, Sha256};

const TOKEN_MASK_PREFIX_LEN: usize = 6;
const TOKEN_MASK_SUFFIX_LEN: usize = 4;
const FINGERPRINT_LEN: usize = 12;

pub(crate) fn mask_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let len = trimmed.chars().count();
    if len <= TOKEN_MASK_PREFIX_LEN + TOKEN_MASK_SUFFIX_LEN {
        return "*".repeat(len.min(8));
    }

    let prefix: String = trimmed.chars().take(TOKEN_MASK_PREFIX_LEN).collect();
    let suffix: String = trimmed
        .chars()
        .skip(len - TOKEN_MASK_SUFFIX_LEN)
        .collect();
    format!("{prefix}...{suffix}")
}

/// Short SHA-256 fingerprint of a secret. Lets logs correlate single-use values
/// (authorization codes) without recording them.
pub(crate) fn fingerprint(secret: &str) -> String {
    let digest = Sha256::digest(secret.as_bytes());
    let mut encoded = URL_SAFE_NO_PAD.encode(digest);
    encoded.truncate(FINGERPRINT_LEN);
    encoded
}

#[cfg(test)]
mod tests {
    use super::{fingerprint, mask_token};

    #[test]
    fn mask_token_keeps_prefix_and_suffix() {
        let token = "abcdef1234567890";
        assert_eq!(mask_token(token), "abcdef...7890");
    }

    #[test]
    fn mask_token_short_values_redacts_fully() {
        assert_eq!(mask_token("abcd"), "****");
        assert_eq!(mask_token("   "), "");
    }

    #[test]
    fn fingerprint_is_stable_and_does_not_leak_input() {
        let a = fingerprint("abc123");
        assert_eq!(a, fingerprint("abc123"));
        assert_ne!(a, fingerprint("abc124"));
        assert_eq!(a.len(), 12);
        assert!(!a.contains("abc123"));
    }
}
