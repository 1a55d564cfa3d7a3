//! # File Locker
//!
//! Encrypts a single file into a standalone container: an 8-byte magic, a
//! fixed-width 36-byte id, a 12-byte IV, and an AES-256-GCM ciphertext. The
//! vault never stores the file itself — only a [`crate::model::FileKey`]
//! registry entry recording the id and the key, so the container can be
//! decrypted independently of the vault that produced it as long as the
//! caller still has the key.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};

use crate::config::{AES_NONCE_SIZE, KEY_SIZE, LOCKER_DECRYPTED_EXTENSION, LOCKER_EXTENSION, LOCKER_ID_RANDOM_BYTES, LOCKER_ID_WIDTH, LOCKER_MAGIC, LOCKER_MIN_LEN};
use crate::error::{BastionError, Result};
use crate::rng;

/// The plaintext output of a successful [`decrypt`]: the recovered bytes
/// plus the container id they were stored under.
pub struct Decrypted {
    pub id: String,
    pub plaintext: Vec<u8>,
}

/// Encrypts `plaintext` into a standalone locker container under `key`.
///
/// Returns the container bytes and the freshly generated id that was
/// embedded in the header — callers persist this id on the corresponding
/// [`crate::model::FileKey`] registry entry for later lookup.
///
/// # Errors
/// Returns [`BastionError::BadInput`] if `key` is not exactly
/// [`KEY_SIZE`] bytes.
pub fn encrypt(plaintext: &[u8], key: &[u8]) -> Result<(Vec<u8>, String)> {
    if key.len() != KEY_SIZE {
        return Err(BastionError::bad_input("locker key must be 32 bytes"));
    }

    let mut id_bytes = [0u8; LOCKER_ID_RANDOM_BYTES];
    rng::fill_random(&mut id_bytes)?;
    let id = hex::encode(id_bytes);
    let id_field = format!("{id:<width$}", width = LOCKER_ID_WIDTH);
    debug_assert_eq!(id_field.len(), LOCKER_ID_WIDTH);

    let mut iv = [0u8; AES_NONCE_SIZE];
    rng::fill_random(&mut iv)?;

    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| BastionError::bad_input("invalid locker key"))?;
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&iv), plaintext)
        .map_err(|_| BastionError::AuthFailure)?;

    let mut out = Vec::with_capacity(LOCKER_MIN_LEN + ciphertext.len());
    out.extend_from_slice(LOCKER_MAGIC);
    out.extend_from_slice(id_field.as_bytes());
    out.extend_from_slice(&iv);
    out.extend_from_slice(&ciphertext);

    Ok((out, id))
}

/// Decrypts a standalone locker container produced by [`encrypt`].
///
/// # Errors
/// Returns [`BastionError::Corrupt`] if `data` is shorter than the minimum
/// container length or its magic does not match, and
/// [`BastionError::AuthFailure`] if AEAD verification fails (wrong key or
/// tampered ciphertext — the two are not distinguishable).
pub fn decrypt(data: &[u8], key: &[u8]) -> Result<Decrypted> {
    if key.len() != KEY_SIZE {
        return Err(BastionError::bad_input("locker key must be 32 bytes"));
    }
    if data.len() < LOCKER_MIN_LEN {
        return Err(BastionError::corrupt("locker container too short"));
    }
    if &data[0..LOCKER_MAGIC.len()] != LOCKER_MAGIC.as_slice() {
        return Err(BastionError::corrupt("locker magic mismatch"));
    }

    let id_start = LOCKER_MAGIC.len();
    let id_end = id_start + LOCKER_ID_WIDTH;
    let iv_end = id_end + AES_NONCE_SIZE;

    let id = String::from_utf8_lossy(&data[id_start..id_end]).trim_end().to_owned();
    let iv = &data[id_end..iv_end];
    let ciphertext = &data[iv_end..];

    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| BastionError::bad_input("invalid locker key"))?;
    let plaintext = cipher
        .decrypt(Nonce::from_slice(iv), ciphertext)
        .map_err(|_| BastionError::AuthFailure)?;

    Ok(Decrypted { id, plaintext })
}

/// Rewrites a `.bastion` container path to the filename a decrypted output
/// is conventionally written under, appending [`LOCKER_DECRYPTED_EXTENSION`]
/// outright when the input doesn't carry [`LOCKER_EXTENSION`].
#[must_use]
pub fn decrypted_path(original: &std::path::Path) -> std::path::PathBuf {
    let name = original.to_string_lossy();
    if let Some(stripped) = name.strip_suffix(LOCKER_EXTENSION) {
        std::path::PathBuf::from(format!("{stripped}{LOCKER_DECRYPTED_EXTENSION}"))
    } else {
        std::path::PathBuf::from(format!("{name}{LOCKER_DECRYPTED_EXTENSION}"))
    }
}

/// Encrypts the file at `input_path` and writes the container to
/// `input_path` with [`LOCKER_EXTENSION`] appended.
///
/// # Errors
/// Propagates filesystem errors as [`BastionError::Io`], and any failure
/// from [`encrypt`].
pub fn encrypt_file(input_path: &std::path::Path, key: &[u8]) -> Result<(std::path::PathBuf, String)> {
    let plaintext = std::fs::read(input_path)?;
    let (container, id) = encrypt(&plaintext, key)?;
    let out_path = std::path::PathBuf::from(format!("{}{LOCKER_EXTENSION}", input_path.to_string_lossy()));
    std::fs::write(&out_path, container)?;
    Ok((out_path, id))
}

/// Decrypts the container at `input_path` and writes the plaintext to the
/// path produced by [`decrypted_path`].
///
/// # Errors
/// Propagates filesystem errors as [`BastionError::Io`], and any failure
/// from [`decrypt`].
pub fn decrypt_file(input_path: &std::path::Path, key: &[u8]) -> Result<std::path::PathBuf> {
    let data = std::fs::read(input_path)?;
    let decrypted = decrypt(&data, key)?;
    let out_path = decrypted_path(input_path);
    std::fs::write(&out_path, &decrypted.plaintext)?;
    Ok(out_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let key = [9u8; KEY_SIZE];
        let (container, id) = encrypt(b"hello vault", &key).unwrap();
        let decrypted = decrypt(&container, &key).unwrap();
        assert_eq!(decrypted.plaintext, b"hello vault");
        assert_eq!(decrypted.id, id);
        assert_eq!(id.len(), LOCKER_ID_RANDOM_BYTES * 2);
    }

    #[test]
    fn wrong_key_fails_without_distinguishing_cause() {
        let key = [1u8; KEY_SIZE];
        let other = [2u8; KEY_SIZE];
        let (container, _) = encrypt(b"secret", &key).unwrap();
        assert!(matches!(decrypt(&container, &other), Err(BastionError::AuthFailure)));
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let key = [3u8; KEY_SIZE];
        let (mut container, _) = encrypt(b"secret bytes", &key).unwrap();
        let last = container.len() - 1;
        container[last] ^= 0xFF;
        assert!(matches!(decrypt(&container, &key), Err(BastionError::AuthFailure)));
    }

    #[test]
    fn too_short_is_corrupt_not_auth_failure() {
        let key = [4u8; KEY_SIZE];
        assert!(matches!(decrypt(b"too short", &key), Err(BastionError::Corrupt(_))));
    }

    #[test]
    fn decrypted_path_replaces_known_extension() {
        let p = std::path::Path::new("photo.png.bastion");
        assert_eq!(decrypted_path(p), std::path::PathBuf::from("photo.png.decrypted"));
    }
}
