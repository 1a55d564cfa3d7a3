//! Wrappers for in-memory secret material.
//!
//! The master password and the vault's entropy seed live in cleartext in
//! memory for as long as the vault is unlocked (spec §5) — there's no way
//! around that and still be able to derive keys or transmute passwords. What
//! we *can* guarantee is that the backing memory is zeroed the moment the
//! wrapper is dropped, instead of lingering in a freed heap page.

use secrecy::zeroize::Zeroize;
use secrecy::{ExposeSecret, SecretBox};

/// A piece of secret data that is zeroized on drop.
pub struct Secret<T: Zeroize> {
    inner: SecretBox<T>,
}

impl<T: Zeroize> Secret<T> {
    pub fn new(data: T) -> Self {
        Self { inner: SecretBox::new(Box::new(data)) }
    }

    pub fn expose_secret(&self) -> &T {
        self.inner.expose_secret()
    }
}

/// A zeroized `Vec<u8>`, used for derived keys and raw key material.
pub type SecretBytes = Secret<Vec<u8>>;

/// A zeroized `String`, used for the master password and the vault entropy.
pub type SecretString = Secret<String>;

impl SecretBytes {
    pub fn from_slice(data: &[u8]) -> Self {
        Self::new(data.to_vec())
    }
}

impl SecretString {
    pub fn from_str(s: &str) -> Self {
        Self::new(s.to_owned())
    }
}
