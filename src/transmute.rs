//! # Password Transmuter
//!
//! Deterministically derives a credential's password from the vault's
//! entropy seed plus the credential's own identifying fields, so the
//! password never has to be stored at all — only regenerated on demand.
//! Changing any of `service`, `username`, or `version` produces a wholly
//! different password; this is what makes bumping `version` on edit a
//! deliberate rotation mechanism rather than a no-op (see
//! [`crate::model::Credential`]).
//!
//! The derivation runs in two stages: a PBKDF2-HMAC-SHA512 pass produces a
//! surplus of pseudorandom "flux" bytes, then those bytes are consumed via
//! rejection sampling to select characters from the requested pool. Flux
//! is oversized by [`TRANSMUTE_FLUX_FACTOR`] per requested character so that
//! rejection sampling succeeds with overwhelming probability without ever
//! having to re-derive.

use crate::config::{POOL_DIGITS, POOL_LOWER, POOL_SYMBOLS, POOL_UPPER, TRANSMUTE_FLUX_FACTOR, TRANSMUTE_ITERATIONS, TRANSMUTE_SALT_PREFIX};

/// Derives the deterministic password for one credential.
///
/// `entropy` is the vault's seed (spec §3); `service` and `username`
/// identify the credential; `version` is the credential's per-entry
/// revision; `length` is the desired password length; `use_symbols`
/// includes [`POOL_SYMBOLS`] in the character pool when set.
#[must_use]
pub fn transmute(entropy: &str, service: &str, username: &str, version: u64, length: usize, use_symbols: bool) -> String {
    let salt = format!("{TRANSMUTE_SALT_PREFIX}{}::{}::v{version}", service.to_lowercase(), username.to_lowercase());

    let mut pool = String::with_capacity(POOL_LOWER.len() + POOL_UPPER.len() + POOL_DIGITS.len() + POOL_SYMBOLS.len());
    pool.push_str(POOL_LOWER);
    pool.push_str(POOL_UPPER);
    pool.push_str(POOL_DIGITS);
    if use_symbols {
        pool.push_str(POOL_SYMBOLS);
    }
    let pool: Vec<char> = pool.chars().collect();

    let flux_len = length * TRANSMUTE_FLUX_FACTOR;
    let mut flux = vec![0u8; flux_len];
    pbkdf2::pbkdf2_hmac::<sha2::Sha512>(entropy.as_bytes(), salt.as_bytes(), TRANSMUTE_ITERATIONS, &mut flux);

    // Reject bytes in the tail slice that can't map uniformly onto the pool,
    // so every character is chosen with equal probability.
    let limit = 256 - (256 % pool.len());

    let mut out = String::with_capacity(length);
    let mut cursor = 0usize;
    while out.chars().count() < length {
        if cursor >= flux.len() {
            // Practically unreachable at the default flux factor, but stay
            // correct rather than panic if a caller picks extreme inputs.
            flux.extend(std::iter::repeat_n(0u8, flux_len));
            pbkdf2::pbkdf2_hmac::<sha2::Sha512>(entropy.as_bytes(), format!("{salt}::overflow").as_bytes(), TRANSMUTE_ITERATIONS, &mut flux[cursor..]);
        }
        let byte = flux[cursor];
        cursor += 1;
        if (byte as usize) < limit {
            out.push(pool[(byte as usize) % pool.len()]);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_deterministic() {
        let a = transmute("a".repeat(64).as_str(), "Example.com", "Alice", 1, 20, true);
        let b = transmute("a".repeat(64).as_str(), "Example.com", "Alice", 1, 20, true);
        assert_eq!(a, b);
    }

    #[test]
    fn is_case_insensitive_on_service_and_username() {
        let a = transmute(&"a".repeat(64), "Example.com", "Alice", 1, 20, true);
        let b = transmute(&"a".repeat(64), "example.com", "alice", 1, 20, true);
        assert_eq!(a, b);
    }

    #[test]
    fn version_bump_rotates_the_password() {
        let entropy = "b".repeat(64);
        let v1 = transmute(&entropy, "example.com", "alice", 1, 20, true);
        let v2 = transmute(&entropy, "example.com", "alice", 2, 20, true);
        assert_ne!(v1, v2);
    }

    #[test]
    fn respects_requested_length() {
        let entropy = "c".repeat(64);
        for length in [8, 16, 32, 64] {
            let pw = transmute(&entropy, "svc", "user", 1, length, true);
            assert_eq!(pw.chars().count(), length);
        }
    }

    #[test]
    fn excludes_symbols_when_disabled() {
        let entropy = "d".repeat(64);
        let pw = transmute(&entropy, "svc", "user", 1, 64, false);
        assert!(pw.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn includes_symbols_is_possible_when_enabled() {
        let entropy = "e".repeat(64);
        // Across enough distinct (service, username) pairs at least one
        // should pick a symbol character if the pool is truly being used.
        let hits_symbol = (0..20)
            .map(|i| transmute(&entropy, &format!("svc{i}"), "user", 1, 64, true))
            .any(|pw| pw.chars().any(|c| POOL_SYMBOLS.contains(c)));
        assert!(hits_symbol);
    }
}
