//! Cryptographic core of a Bastion vault.
//!
//! This crate is the programmatic engine behind a password vault — not the
//! vault itself. It owns the things that have to be exactly right (key
//! derivation, AEAD framing, canonical encoding, secret splitting) and
//! leaves everything that doesn't (a shell, a clipboard, an inactivity
//! timer, a breach-checking HTTP client) to whatever embeds it.
//!
//! ## Layout
//!
//! - [`vault`] — the stateful entry point: load a vault file, unlock it
//!   with a password, edit the decrypted state, save it back.
//! - [`envelope`] — the AEAD envelope format a vault blob is encrypted
//!   under, including the legacy decrypt ladder for older formats.
//! - [`kdf`] — the key-derivation primitives the envelope codec calls.
//! - [`canon`] / [`model`] — the canonical, byte-deterministic JSON
//!   encoding of a vault's decrypted state, and the typed records it holds.
//! - [`frame`] — the length-prefixed padding layer inside a current-format
//!   envelope.
//! - [`transmute`] — deterministic, storage-free password derivation for
//!   individual credentials.
//! - [`locker`] — standalone single-file encryption, independent of any
//!   vault.
//! - [`shamir`] — `(k, n)` threshold secret sharing.
//! - [`error`] — the error taxonomy every public function returns.
//! - [`secret`] — zeroize-on-drop wrappers for in-memory secret material.

pub mod canon;
pub mod config;
pub mod envelope;
pub mod error;
pub mod frame;
pub mod kdf;
pub mod locker;
pub mod model;
mod rng;
pub mod secret;
pub mod shamir;
pub mod transmute;
pub mod vault;

pub use error::{BastionError, Result};
pub use locker::{decrypt_file, encrypt_file};
pub use shamir::{combine as shamir_combine, split as shamir_split};
pub use transmute::transmute as derive_password;
pub use vault::VaultManager;
