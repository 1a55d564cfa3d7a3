//! # Envelope Codec
//!
//! Wraps a blob's canonical JSON plaintext (see [`crate::canon`]) in an
//! authenticated, password-derived encryption layer, and unwraps it again.
//!
//! Five historical formats exist, newest first:
//!
//! | version | header            | KDF                              | framing |
//! |---------|-------------------|-----------------------------------|---------|
//! | V3.5    | `BSTN\x04`        | Argon2id                          | framed  |
//! | V3      | `BSTN\x03`        | Argon2id                          | raw     |
//! | V2      | `BSTN\x02`        | PBKDF2-SHA256 210k, domain-sep.    | raw     |
//! | V1      | *(none)*          | PBKDF2-SHA256 210k, domain-sep.    | raw     |
//! | V0      | *(none)*          | PBKDF2-SHA256 100k, raw salt       | raw     |
//!
//! [`encrypt`] always writes V3.5. [`decrypt`] dispatches on the header
//! magic when present; when absent, it works down the headerless ladder
//! (V1 then V0), since nothing on the wire distinguishes them up front. A
//! wrong password and a corrupted ciphertext produce the identical
//! [`BastionError::AuthFailure`] at every step — only the ladder's *overall*
//! failure is observable, never which attempt failed or why.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};

use crate::config::{AES_NONCE_SIZE, ARGON_MEMORY, ARGON_PARALLELISM, ARGON_SALT_LEN, ARGON_TIME, ENVELOPE_MAGIC, HEADER_LEN, PBKDF2_ITERATIONS_V0, PBKDF2_ITERATIONS_V2, VERSION_V2, VERSION_V3, VERSION_V3_5};
use crate::error::{BastionError, Result};
use crate::{frame, kdf, rng};

/// The result of a successful [`decrypt`]: the recovered plaintext plus
/// whether it came from a format older than the current one.
pub struct Decrypted {
    pub plaintext: Vec<u8>,
    pub is_legacy: bool,
}

/// Encrypts `plaintext` under `password`, always producing the current
/// (V3.5) envelope format: Argon2id-derived key, AES-256-GCM, framed
/// payload.
///
/// # Errors
/// Returns [`BastionError::BadInput`] only if the fixed Argon2id parameters
/// in [`crate::config`] are themselves invalid, which would indicate a
/// build-time misconfiguration rather than a runtime condition.
pub fn encrypt(password: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    let mut salt = [0u8; ARGON_SALT_LEN];
    rng::fill_random(&mut salt)?;
    let mut nonce = [0u8; AES_NONCE_SIZE];
    rng::fill_random(&mut nonce)?;

    let key = kdf::derive_argon2id(password, &salt, ARGON_TIME, ARGON_MEMORY, ARGON_PARALLELISM)?;
    let cipher = Aes256Gcm::new_from_slice(&key).map_err(|_| BastionError::bad_input("derived key has the wrong length"))?;

    let framed = frame::frame(plaintext);
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), framed.as_slice())
        .map_err(|_| BastionError::AuthFailure)?;

    let mut out = Vec::with_capacity(HEADER_LEN + salt.len() + nonce.len() + ciphertext.len());
    out.extend_from_slice(ENVELOPE_MAGIC);
    out.push(VERSION_V3_5);
    out.extend_from_slice(&salt);
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Attempts to decrypt `data` under `password`, dispatching on the header
/// magic when present and otherwise working down the headerless legacy
/// ladder.
///
/// # Errors
/// Returns [`BastionError::Corrupt`] if `data` is too short to hold any
/// valid envelope, or carries a header with an unrecognized version byte.
/// Returns [`BastionError::AuthFailure`] if every applicable KDF/cipher
/// combination fails to authenticate — this is the only outcome for a
/// wrong password, and is indistinguishable from a tampered ciphertext.
pub fn decrypt(password: &[u8], data: &[u8]) -> Result<Decrypted> {
    if data.len() >= HEADER_LEN && data[..ENVELOPE_MAGIC.len()] == *ENVELOPE_MAGIC {
        return decrypt_headered(password, data);
    }
    decrypt_headerless(password, data)
}

fn decrypt_headered(password: &[u8], data: &[u8]) -> Result<Decrypted> {
    let version = data[ENVELOPE_MAGIC.len()];
    let body = &data[HEADER_LEN..];
    if body.len() < ARGON_SALT_LEN + AES_NONCE_SIZE {
        return Err(BastionError::corrupt("envelope header truncated"));
    }
    let salt = &body[..ARGON_SALT_LEN];
    let nonce = &body[ARGON_SALT_LEN..ARGON_SALT_LEN + AES_NONCE_SIZE];
    let ciphertext = &body[ARGON_SALT_LEN + AES_NONCE_SIZE..];

    match version {
        v if v == VERSION_V3_5 => {
            let key = kdf::derive_argon2id(password, salt, ARGON_TIME, ARGON_MEMORY, ARGON_PARALLELISM)?;
            let plaintext = open(&key, nonce, ciphertext)?;
            Ok(Decrypted { plaintext: frame::unframe(&plaintext).to_vec(), is_legacy: false })
        }
        v if v == VERSION_V3 => {
            let key = kdf::derive_argon2id(password, salt, ARGON_TIME, ARGON_MEMORY, ARGON_PARALLELISM)?;
            let plaintext = open(&key, nonce, ciphertext)?;
            tracing::info!("unlocked a legacy V3 envelope");
            Ok(Decrypted { plaintext, is_legacy: true })
        }
        v if v == VERSION_V2 => {
            let key = kdf::derive_pbkdf2_domain_separated(password, salt, PBKDF2_ITERATIONS_V2);
            let plaintext = open(&key, nonce, ciphertext)?;
            tracing::info!("unlocked a legacy V2 envelope");
            Ok(Decrypted { plaintext, is_legacy: true })
        }
        _ => Err(BastionError::corrupt("unrecognized envelope version")),
    }
}

fn decrypt_headerless(password: &[u8], data: &[u8]) -> Result<Decrypted> {
    if data.len() < ARGON_SALT_LEN + AES_NONCE_SIZE {
        return Err(BastionError::corrupt("envelope too short"));
    }
    let salt = &data[..ARGON_SALT_LEN];
    let nonce = &data[ARGON_SALT_LEN..ARGON_SALT_LEN + AES_NONCE_SIZE];
    let ciphertext = &data[ARGON_SALT_LEN + AES_NONCE_SIZE..];

    let v1_key = kdf::derive_pbkdf2_domain_separated(password, salt, PBKDF2_ITERATIONS_V2);
    if let Ok(plaintext) = open(&v1_key, nonce, ciphertext) {
        tracing::info!("unlocked a headerless legacy V1 envelope");
        return Ok(Decrypted { plaintext, is_legacy: true });
    }

    let v0_key = kdf::derive_pbkdf2_raw(password, salt, PBKDF2_ITERATIONS_V0);
    if let Ok(plaintext) = open(&v0_key, nonce, ciphertext) {
        tracing::info!("unlocked an ancient headerless V0 envelope");
        return Ok(Decrypted { plaintext, is_legacy: true });
    }

    Err(BastionError::AuthFailure)
}

fn open(key: &[u8], nonce: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| BastionError::AuthFailure)?;
    cipher.decrypt(Nonce::from_slice(nonce), ciphertext).map_err(|_| BastionError::AuthFailure)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_current_format() {
        let encrypted = encrypt(b"hunter2", b"{\"entropy\":\"ab\"}").unwrap();
        assert_eq!(&encrypted[..4], ENVELOPE_MAGIC);
        assert_eq!(encrypted[4], VERSION_V3_5);

        let decrypted = decrypt(b"hunter2", &encrypted).unwrap();
        assert_eq!(decrypted.plaintext, b"{\"entropy\":\"ab\"}");
        assert!(!decrypted.is_legacy);
    }

    #[test]
    fn wrong_password_is_undifferentiated_auth_failure() {
        let encrypted = encrypt(b"correct horse", b"payload").unwrap();
        let err = decrypt(b"wrong password", &encrypted).unwrap_err();
        assert!(matches!(err, BastionError::AuthFailure));
    }

    #[test]
    fn legacy_v2_header_decrypts_and_is_flagged_legacy() {
        let password = b"legacy-pw";
        let plaintext = b"{\"entropy\":\"cd\"}";

        let salt = [5u8; ARGON_SALT_LEN];
        let nonce = [6u8; AES_NONCE_SIZE];
        let key = kdf::derive_pbkdf2_domain_separated(password, &salt, PBKDF2_ITERATIONS_V2);
        let cipher = Aes256Gcm::new_from_slice(&key).unwrap();
        let ciphertext = cipher.encrypt(Nonce::from_slice(&nonce), plaintext.as_slice()).unwrap();

        let mut blob = Vec::new();
        blob.extend_from_slice(ENVELOPE_MAGIC);
        blob.push(VERSION_V2);
        blob.extend_from_slice(&salt);
        blob.extend_from_slice(&nonce);
        blob.extend_from_slice(&ciphertext);

        let decrypted = decrypt(password, &blob).unwrap();
        assert_eq!(decrypted.plaintext, plaintext);
        assert!(decrypted.is_legacy);
    }

    #[test]
    fn headerless_v0_envelope_decrypts_via_the_ladder() {
        let password = b"ancient-pw";
        let plaintext = b"{\"entropy\":\"ef\"}";

        let salt = [2u8; ARGON_SALT_LEN];
        let nonce = [3u8; AES_NONCE_SIZE];
        let key = kdf::derive_pbkdf2_raw(password, &salt, PBKDF2_ITERATIONS_V0);
        let cipher = Aes256Gcm::new_from_slice(&key).unwrap();
        let ciphertext = cipher.encrypt(Nonce::from_slice(&nonce), plaintext.as_slice()).unwrap();

        let mut blob = Vec::new();
        blob.extend_from_slice(&salt);
        blob.extend_from_slice(&nonce);
        blob.extend_from_slice(&ciphertext);

        let decrypted = decrypt(password, &blob).unwrap();
        assert_eq!(decrypted.plaintext, plaintext);
        assert!(decrypted.is_legacy);
    }

    #[test]
    fn too_short_is_corrupt_not_auth_failure() {
        let err = decrypt(b"pw", b"short").unwrap_err();
        assert!(matches!(err, BastionError::Corrupt(_)));
    }

    #[test]
    fn exactly_twenty_eight_bytes_falls_through_to_auth_failure_not_corrupt() {
        // spec §8: the 28-byte floor (salt + iv) is the Corrupt/AuthFailure
        // boundary; anything at or above it is a decrypt *attempt*, even if
        // too short to ever hold a valid tagged ciphertext.
        let data = vec![0u8; ARGON_SALT_LEN + AES_NONCE_SIZE];
        let err = decrypt(b"pw", &data).unwrap_err();
        assert!(matches!(err, BastionError::AuthFailure));
    }

    #[test]
    fn twenty_seven_bytes_is_still_corrupt() {
        let data = vec![0u8; ARGON_SALT_LEN + AES_NONCE_SIZE - 1];
        let err = decrypt(b"pw", &data).unwrap_err();
        assert!(matches!(err, BastionError::Corrupt(_)));
    }

    #[test]
    fn unknown_header_version_is_corrupt() {
        let encrypted = encrypt(b"pw", b"payload").unwrap();
        let mut tampered = encrypted;
        tampered[4] = 0xFF;
        let err = decrypt(b"pw", &tampered).unwrap_err();
        assert!(matches!(err, BastionError::Corrupt(_)));
    }
}
