//! # Canonicalizer
//!
//! Renders a [`VaultState`] to the exact compact, key-ordered JSON byte
//! sequence the envelope encrypts, and parses it back. Byte-determinism
//! matters here for two reasons: the AEAD tag covers these exact bytes, and
//! two implementations that disagree on key order would silently produce
//! different ciphertexts for the same logical state, defeating any
//! cross-implementation diffing or audit trail.
//!
//! The key orders themselves live next to each record type in
//! [`crate::model`]; this module only owns turning the resulting
//! [`serde_json::Value`] tree into bytes, and parsing bytes back into typed
//! records.

use crate::error::{BastionError, Result};
use crate::model::VaultState;

/// Serializes `state` to its canonical compact JSON form.
///
/// # Errors
/// Never fails in practice — `serde_json::Value` serialization is
/// infallible for the value trees this crate builds — but returns
/// [`BastionError::Corrupt`] rather than panicking if it ever does.
pub fn encode(state: &VaultState) -> Result<Vec<u8>> {
    let value = state.canonical_value();
    serde_json::to_vec(&value).map_err(|e| BastionError::corrupt(format!("failed to encode vault state: {e}")))
}

/// Parses canonical (or any structurally-compatible) JSON bytes into a
/// [`VaultState`]. Unknown top-level and per-record fields are preserved in
/// each type's `extra` map rather than rejected.
///
/// # Errors
/// Returns [`BastionError::Corrupt`] if `bytes` is not valid JSON or does
/// not describe a vault state (missing a required field such as `entropy`).
pub fn decode(bytes: &[u8]) -> Result<VaultState> {
    serde_json::from_slice(bytes).map_err(|e| BastionError::corrupt(format!("malformed vault state: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_preserves_fields_and_order() {
        let mut state = VaultState::new("a".repeat(64), 1_700_000_000_000);
        state.configs.push(crate::model::Credential {
            id: "deadbeef".into(),
            name: "example.com".into(),
            username: "alice".into(),
            category: "login".into(),
            version: 1,
            length: 16,
            use_symbols: true,
            custom_password: None,
            breach_stats: None,
            compromised: None,
            created_at: 1,
            updated_at: 1,
            usage_count: 0,
            sort_order: None,
            extra: Default::default(),
        });

        let bytes = encode(&state).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        // Root-level key order per the canonical layout.
        let version_pos = text.find("\"version\"").unwrap();
        let entropy_pos = text.find("\"entropy\"").unwrap();
        let configs_pos = text.find("\"configs\"").unwrap();
        assert!(version_pos < entropy_pos);
        assert!(entropy_pos < configs_pos);

        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.entropy, state.entropy);
        assert_eq!(decoded.configs.len(), 1);
        assert_eq!(decoded.configs[0].name, "example.com");
    }

    #[test]
    fn unknown_fields_survive_a_roundtrip() {
        let raw = br#"{"version":1,"entropy":"ab","flags":0,"lastModified":1,"locker":[],"contacts":[],"notes":[],"configs":[],"futureField":"kept"}"#;
        let state = decode(raw).unwrap();
        assert_eq!(state.extra.get("futureField").unwrap(), "kept");

        let bytes = encode(&state).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("\"futureField\":\"kept\""));
        // Unknown key is appended after every known root key.
        assert!(text.find("\"futureField\"").unwrap() > text.find("\"configs\"").unwrap());
    }

    #[test]
    fn decode_rejects_missing_entropy() {
        let raw = br#"{"version":1,"lastModified":1}"#;
        assert!(decode(raw).is_err());
    }
}
