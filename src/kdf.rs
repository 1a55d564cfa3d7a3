//! # Key-Derivation Oracle
//!
//! Turns a password and a salt into an AEAD key, under whichever of the
//! protocol's historical parameter sets the caller asks for. Every function
//! here is a pure function of its explicit arguments — none of them reach
//! into [`crate::config`] for the *current* defaults, because the envelope
//! codec's legacy decrypt ladder needs to run several historical parameter
//! sets back to back, independent of whatever the current write path
//! defaults to.

use argon2::{Algorithm, Argon2, Params, Version};

use crate::config::{ARGON_HASH_LEN, KEY_SIZE, LEGACY_DOMAIN_PREFIX};
use crate::error::{BastionError, Result};

/// Derives a 32-byte key via Argon2id.
///
/// # Errors
/// Returns [`BastionError::BadInput`] if `memory_kib`/`time_cost`/
/// `parallelism` describe an invalid Argon2 parameter set.
pub fn derive_argon2id(password: &[u8], salt: &[u8], time_cost: u32, memory_kib: u32, parallelism: u32) -> Result<[u8; ARGON_HASH_LEN]> {
    let params = Params::new(memory_kib, time_cost, parallelism, Some(ARGON_HASH_LEN))
        .map_err(|e| BastionError::bad_input(format!("invalid argon2 parameters: {e}")))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut out = [0u8; ARGON_HASH_LEN];
    argon2
        .hash_password_into(password, salt, &mut out)
        .map_err(|e| BastionError::bad_input(format!("argon2 derivation failed: {e}")))?;
    Ok(out)
}

/// Derives a 32-byte key via PBKDF2-HMAC-SHA256 over the raw salt, with no
/// domain separation. Used only for the oldest ("ancient") legacy format.
pub fn derive_pbkdf2_raw(password: &[u8], salt: &[u8], iterations: u32) -> [u8; KEY_SIZE] {
    let mut out = [0u8; KEY_SIZE];
    pbkdf2::pbkdf2_hmac::<sha2::Sha256>(password, salt, iterations, &mut out);
    out
}

/// Derives a 32-byte key via PBKDF2-HMAC-SHA256 over a domain-separated
/// salt: [`LEGACY_DOMAIN_PREFIX`] concatenated with the raw salt. Used by
/// the V1/V2 legacy formats.
pub fn derive_pbkdf2_domain_separated(password: &[u8], salt: &[u8], iterations: u32) -> [u8; KEY_SIZE] {
    let mut domain_salt = Vec::with_capacity(LEGACY_DOMAIN_PREFIX.len() + salt.len());
    domain_salt.extend_from_slice(LEGACY_DOMAIN_PREFIX);
    domain_salt.extend_from_slice(salt);

    let mut out = [0u8; KEY_SIZE];
    pbkdf2::pbkdf2_hmac::<sha2::Sha256>(password, &domain_salt, iterations, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ARGON_MEMORY, ARGON_PARALLELISM, ARGON_TIME};

    #[test]
    fn argon2id_is_deterministic_for_fixed_inputs() {
        let salt = [7u8; 16];
        let a = derive_argon2id(b"hunter2", &salt, ARGON_TIME, ARGON_MEMORY, ARGON_PARALLELISM).unwrap();
        let b = derive_argon2id(b"hunter2", &salt, ARGON_TIME, ARGON_MEMORY, ARGON_PARALLELISM).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn argon2id_differs_across_passwords() {
        let salt = [7u8; 16];
        let a = derive_argon2id(b"hunter2", &salt, ARGON_TIME, ARGON_MEMORY, ARGON_PARALLELISM).unwrap();
        let b = derive_argon2id(b"hunter3", &salt, ARGON_TIME, ARGON_MEMORY, ARGON_PARALLELISM).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn pbkdf2_domain_separation_changes_the_derived_key() {
        let salt = [1u8; 16];
        let raw = derive_pbkdf2_raw(b"hunter2", &salt, 1_000);
        let domain = derive_pbkdf2_domain_separated(b"hunter2", &salt, 1_000);
        assert_ne!(raw, domain);
    }

    #[test]
    fn pbkdf2_is_deterministic() {
        let salt = [3u8; 16];
        let a = derive_pbkdf2_domain_separated(b"correct horse", &salt, 1_000);
        let b = derive_pbkdf2_domain_separated(b"correct horse", &salt, 1_000);
        assert_eq!(a, b);
    }
}
