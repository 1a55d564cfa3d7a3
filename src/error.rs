//! # Error Taxonomy
//!
//! Every fallible operation in this crate ultimately resolves to one of the
//! kinds below. The split exists because callers (the enclosing shell, tests,
//! other language bindings) need to distinguish "decryption failed" from "the
//! file doesn't exist" from "you asked for fewer shards than the threshold" —
//! but must never be able to distinguish "wrong password" from "corrupt
//! ciphertext" for a single decrypt attempt, since that distinction is an
//! oracle an attacker could exploit.
//!
//! Every module constructs one of these variants directly at its own
//! boundary — there's no intermediate internal error type to compose through
//! first.

use thiserror::Error;

/// The error type returned by every public Bastion core operation.
#[derive(Debug, Error)]
pub enum BastionError {
    /// Malformed input: invalid hex, a shard string that doesn't parse, a
    /// file below the minimum size for its container format.
    #[error("invalid input: {0}")]
    BadInput(String),

    /// AEAD tag verification failed. Deliberately undifferentiated: this
    /// covers a wrong password, a corrupted ciphertext, a mismatched file
    /// key, and a tampered shard payload alike.
    #[error("decryption failed")]
    AuthFailure,

    /// A referenced file does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A magic byte or header byte did not match any known format.
    #[error("corrupt data: {0}")]
    Corrupt(String),

    /// The caller violated a protocol policy: too few shards, shards from
    /// different splits, a legacy shard format with no in-place upgrade.
    #[error("policy violation: {0}")]
    Policy(String),

    /// A read, write, or rename failed at the filesystem boundary.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout this crate's public API.
pub type Result<T> = std::result::Result<T, BastionError>;

impl BastionError {
    pub(crate) fn bad_input(msg: impl Into<String>) -> Self {
        Self::BadInput(msg.into())
    }

    pub(crate) fn corrupt(msg: impl Into<String>) -> Self {
        Self::Corrupt(msg.into())
    }

    pub(crate) fn policy(msg: impl Into<String>) -> Self {
        Self::Policy(msg.into())
    }

    pub(crate) fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}
