//! # Vault Manager
//!
//! The only stateful type in this crate: owns the on-disk vault file's
//! blob list, the currently unlocked [`VaultState`] (if any), and the
//! password that unlocked it. Everything else in this crate is a pure
//! function; this module is where "open a vault, change something, save
//! it back" actually happens.
//!
//! A vault file can hold more than one encrypted blob — [`unlock`] tries
//! the given password against each in turn and adopts the first that
//! authenticates. This is what lets a vault carry, say, a rolled-over
//! snapshot alongside the live one without the caller needing to know
//! which index is current.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::config::VAULT_FILE_MAGIC;
use crate::error::{BastionError, Result};
use crate::model::VaultState;
use crate::secret::SecretString;
use crate::{canon, envelope};

/// Owns a vault's blob list and, once unlocked, its decrypted state.
pub struct VaultManager {
    blobs: Vec<String>,
    active_state: Option<VaultState>,
    active_password: Option<SecretString>,
    active_blob_index: Option<usize>,
}

impl VaultManager {
    /// Parses a vault file's contents into an (as yet locked) manager.
    ///
    /// Accepts three shapes, newest first: the current `BASTION_V3::`-
    /// prefixed, base64-wrapped JSON array of blobs; a bare JSON array of
    /// blobs with no wrapper; or a single raw blob string, for vault files
    /// that predate multi-blob support entirely.
    ///
    /// # Errors
    /// Returns [`BastionError::Corrupt`] if a `BASTION_V3::`-prefixed or
    /// array-shaped file's body isn't valid base64/JSON.
    pub fn load(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        let blobs = if let Some(body) = trimmed.strip_prefix(VAULT_FILE_MAGIC) {
            let json = BASE64.decode(body.trim()).map_err(|e| BastionError::corrupt(format!("vault file body is not valid base64: {e}")))?;
            serde_json::from_slice(&json).map_err(|e| BastionError::corrupt(format!("vault file body is not a JSON array of blobs: {e}")))?
        } else if trimmed.starts_with('[') {
            serde_json::from_str(trimmed).map_err(|e| BastionError::corrupt(format!("vault file is not a JSON array of blobs: {e}")))?
        } else {
            vec![trimmed.to_owned()]
        };

        Ok(Self { blobs, active_state: None, active_password: None, active_blob_index: None })
    }

    /// Creates a brand-new vault, unlocked under `password`, and performs
    /// the initial save into the returned manager's blob list.
    ///
    /// # Errors
    /// Propagates any [`BastionError`] from the initial [`save`](Self::save).
    pub fn create(password: &str) -> Result<Self> {
        let mut entropy_bytes = [0u8; 32];
        rand::RngCore::fill_bytes(&mut rand::rng(), &mut entropy_bytes);
        let entropy = hex::encode(entropy_bytes);

        let mut manager = Self { blobs: Vec::new(), active_state: None, active_password: None, active_blob_index: None };
        manager.active_state = Some(VaultState::new(entropy, now_ms()));
        manager.active_password = Some(SecretString::from_str(password));
        manager.save()?;
        Ok(manager)
    }

    /// Attempts to unlock the vault with `password`, trying every blob in
    /// order and adopting the first that authenticates.
    ///
    /// Legacy-format blobs are transparently upgraded: a successful legacy
    /// unlock immediately triggers [`save`](Self::save), rewriting that
    /// blob in the current format.
    ///
    /// # Errors
    /// Returns [`BastionError::AuthFailure`] if no blob authenticates under
    /// `password` — indistinguishable from every blob being corrupt, by
    /// design (spec §7).
    pub fn unlock(&mut self, password: &str) -> Result<()> {
        for index in 0..self.blobs.len() {
            let Ok(ciphertext) = BASE64.decode(self.blobs[index].trim()) else { continue };
            let Ok(decrypted) = envelope::decrypt(password.as_bytes(), &ciphertext) else { continue };
            let Ok(state) = canon::decode(&decrypted.plaintext) else { continue };

            self.active_state = Some(state);
            self.active_password = Some(SecretString::from_str(password));
            self.active_blob_index = Some(index);

            if decrypted.is_legacy {
                tracing::warn!(blob = index, "vault blob used a legacy envelope format; upgrading on unlock");
                self.save()?;
            }
            return Ok(());
        }
        Err(BastionError::AuthFailure)
    }

    /// Re-encrypts the active state, bumping its version and last-modified
    /// timestamp, and writes it back into the blob list (replacing the
    /// blob that was unlocked, or appending a new one for a freshly
    /// created vault).
    ///
    /// # Errors
    /// Returns [`BastionError::Policy`] if no vault is currently unlocked.
    pub fn save(&mut self) -> Result<()> {
        let password = self.active_password.as_ref().ok_or_else(|| BastionError::policy("vault is locked"))?;
        let state = self.active_state.as_mut().ok_or_else(|| BastionError::policy("vault is locked"))?;

        state.version += 1;
        state.last_modified = now_ms();

        let plaintext = canon::encode(state)?;
        let ciphertext = envelope::encrypt(password.expose_secret().as_bytes(), &plaintext)?;
        let blob = BASE64.encode(ciphertext);

        match self.active_blob_index {
            Some(index) => self.blobs[index] = blob,
            None => {
                self.blobs.push(blob);
                self.active_blob_index = Some(self.blobs.len() - 1);
            }
        }
        Ok(())
    }

    /// Renders the current blob list as vault file contents ready to
    /// persist: `BASTION_V3::` followed by the base64 of the blob array's
    /// compact JSON encoding.
    ///
    /// # Errors
    /// Returns [`BastionError::Corrupt`] only if the blob list somehow
    /// fails to serialize, which does not happen for a `Vec<String>`.
    pub fn to_file_contents(&self) -> Result<String> {
        let json = serde_json::to_vec(&self.blobs).map_err(|e| BastionError::corrupt(format!("failed to encode blob list: {e}")))?;
        Ok(format!("{VAULT_FILE_MAGIC}{}", BASE64.encode(json)))
    }

    /// Saves the active state, then atomically writes the vault file to
    /// `path`: write to a sibling `.tmp` file, `rename` over the target,
    /// and best-effort `chmod 0600` on POSIX.
    ///
    /// # Errors
    /// Propagates [`save`](Self::save)'s errors, and wraps filesystem
    /// failures as [`BastionError::Io`].
    pub fn save_to_file(&mut self, path: &std::path::Path) -> Result<()> {
        self.save()?;
        let contents = self.to_file_contents()?;

        let tmp_path = path.with_extension("tmp");
        std::fs::write(&tmp_path, &contents)?;
        std::fs::rename(&tmp_path, path)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Ok(metadata) = std::fs::metadata(path) {
                let mut perms = metadata.permissions();
                perms.set_mode(0o600);
                let _ = std::fs::set_permissions(path, perms);
            }
        }
        Ok(())
    }

    /// Reads and parses a vault file from `path`.
    ///
    /// # Errors
    /// Returns [`BastionError::NotFound`] if `path` does not exist, and
    /// propagates [`load`](Self::load)'s parse errors otherwise.
    pub fn load_from_file(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Err(BastionError::not_found(path.to_string_lossy().into_owned()));
        }
        let text = std::fs::read_to_string(path)?;
        Self::load(&text)
    }

    /// Renders the active state as canonical plaintext JSON.
    ///
    /// # Errors
    /// Returns [`BastionError::Policy`] if no vault is currently unlocked.
    pub fn export_plaintext_json(&self) -> Result<String> {
        let state = self.active_state.as_ref().ok_or_else(|| BastionError::policy("vault is locked"))?;
        let bytes = canon::encode(state)?;
        String::from_utf8(bytes).map_err(|e| BastionError::corrupt(format!("encoded state was not valid UTF-8: {e}")))
    }

    #[must_use]
    pub fn is_unlocked(&self) -> bool {
        self.active_state.is_some()
    }

    #[must_use]
    pub fn active_state(&self) -> Option<&VaultState> {
        self.active_state.as_ref()
    }

    #[must_use]
    pub fn active_state_mut(&mut self) -> Option<&mut VaultState> {
        self.active_state.as_mut()
    }

    /// Locks the vault, dropping (and zeroizing, via [`SecretString`]) the
    /// active password and discarding the decrypted state from memory.
    pub fn lock(&mut self) {
        self.active_state = None;
        self.active_password = None;
        self.active_blob_index = None;
    }
}

#[allow(clippy::cast_possible_wrap)]
fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_unlock_and_save_roundtrip_through_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.bastion");

        let mut manager = VaultManager::create("hunter2").unwrap();
        manager.save_to_file(&path).unwrap();

        let mut loaded = VaultManager::load_from_file(&path).unwrap();
        assert!(!loaded.is_unlocked());
        loaded.unlock("hunter2").unwrap();
        assert!(loaded.is_unlocked());
        assert_eq!(loaded.active_state().unwrap().version, 2);
    }

    #[test]
    fn wrong_password_is_undifferentiated_auth_failure() {
        let mut manager = VaultManager::create("correct horse").unwrap();
        let contents = manager.to_file_contents().unwrap();

        let mut reloaded = VaultManager::load(&contents).unwrap();
        let err = reloaded.unlock("wrong password").unwrap_err();
        assert!(matches!(err, BastionError::AuthFailure));
    }

    #[test]
    fn export_requires_unlock() {
        let contents = VaultManager::create("pw").unwrap().to_file_contents().unwrap();
        let manager = VaultManager::load(&contents).unwrap();
        assert!(matches!(manager.export_plaintext_json(), Err(BastionError::Policy(_))));
    }

    #[test]
    fn export_reflects_active_state_once_unlocked() {
        let contents = VaultManager::create("pw").unwrap().to_file_contents().unwrap();
        let mut manager = VaultManager::load(&contents).unwrap();
        manager.unlock("pw").unwrap();
        let json = manager.export_plaintext_json().unwrap();
        assert!(json.contains("\"entropy\""));
    }

    #[test]
    fn edits_persist_across_a_save_and_reload_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.bastion");

        let mut manager = VaultManager::create("hunter2").unwrap();
        manager.active_state_mut().unwrap().notes.push(crate::model::Note {
            id: "n1".into(),
            updated_at: 1,
            title: "hello".into(),
            content: "world".into(),
            extra: Default::default(),
        });
        manager.save_to_file(&path).unwrap();

        let mut reloaded = VaultManager::load_from_file(&path).unwrap();
        reloaded.unlock("hunter2").unwrap();
        assert_eq!(reloaded.active_state().unwrap().notes.len(), 1);
        assert_eq!(reloaded.active_state().unwrap().notes[0].title, "hello");
    }

    #[test]
    fn loading_a_missing_file_is_not_found() {
        let err = VaultManager::load_from_file(std::path::Path::new("/nonexistent/vault.bastion")).unwrap_err();
        assert!(matches!(err, BastionError::NotFound(_)));
    }

    #[test]
    fn unlocking_a_legacy_blob_rewrites_the_file_in_the_current_format() {
        use aes_gcm::aead::{Aead, KeyInit};

        use crate::config::{AES_NONCE_SIZE, ARGON_SALT_LEN, PBKDF2_ITERATIONS_V2};

        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let password = "legacy-pw";
        let state = VaultState::new("aa".repeat(32), 1_700_000_000_000);
        let plaintext = canon::encode(&state).unwrap();

        // Hand-build a headerless V1 envelope: salt(16) || iv(12) || AEAD
        // ciphertext under PBKDF2-HMAC-SHA256 210k with the domain-separated
        // salt, exactly as `envelope::decrypt`'s headerless ladder expects.
        let salt = [11u8; ARGON_SALT_LEN];
        let nonce = [12u8; AES_NONCE_SIZE];
        let key = crate::kdf::derive_pbkdf2_domain_separated(password.as_bytes(), &salt, PBKDF2_ITERATIONS_V2);
        let cipher = aes_gcm::Aes256Gcm::new_from_slice(&key).unwrap();
        let ciphertext = cipher.encrypt(aes_gcm::Nonce::from_slice(&nonce), plaintext.as_slice()).unwrap();

        let mut legacy_blob_bytes = Vec::new();
        legacy_blob_bytes.extend_from_slice(&salt);
        legacy_blob_bytes.extend_from_slice(&nonce);
        legacy_blob_bytes.extend_from_slice(&ciphertext);
        let legacy_blob = BASE64.encode(&legacy_blob_bytes);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.bastion");
        std::fs::write(&path, format!("[{:?}]", legacy_blob)).unwrap();

        let mut manager = VaultManager::load_from_file(&path).unwrap();
        manager.unlock(password).unwrap();
        manager.save_to_file(&path).unwrap();

        // The rewritten slot must now be a V3.5 envelope: BSTN 0x04, never
        // the headerless legacy form it was unlocked from.
        let contents = std::fs::read_to_string(&path).unwrap();
        let reloaded = VaultManager::load(&contents).unwrap();
        let rewritten = BASE64.decode(reloaded.blobs[0].trim()).unwrap();
        assert_eq!(&rewritten[..4], crate::config::ENVELOPE_MAGIC);
        assert_eq!(rewritten[4], crate::config::VERSION_V3_5);
    }
}
