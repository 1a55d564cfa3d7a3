//! Thin wrapper around the OS random number source.
//!
//! With `rand`'s default features disabled (only `sys_rng` enabled, per
//! the teacher's own dependency choice), the thread-local convenience RNGs
//! aren't available — only the fallible [`OsRng`] accessed through
//! [`TryRngCore`]. Every call site that needs randomness (salts, nonces,
//! ids, field-element sampling) goes through [`fill_random`] so that
//! fallibility is handled once, in one place.

use rand::rand_core::{OsRng, TryRngCore};

use crate::error::{BastionError, Result};

/// Fills `buf` with cryptographically secure random bytes from the OS.
///
/// # Errors
/// Returns [`BastionError::Io`] if the OS random source is unavailable.
pub(crate) fn fill_random(buf: &mut [u8]) -> Result<()> {
    OsRng.try_fill_bytes(buf).map_err(|e| BastionError::Io(std::io::Error::other(format!("system RNG failed: {e}"))))
}
