//! # Shamir Threshold Engine
//!
//! Splits a secret into `n` shards such that any `k` of them reconstruct
//! it, and no fewer. Rather than splitting the secret's bytes directly,
//! this module follows an envelope-then-split design: a fresh random
//! session key is generated, the secret is AES-256-GCM-sealed under that
//! key, and it's the *session key* — always exactly 32 bytes, regardless of
//! how long the secret is — that gets split across the polynomial in
//! [`field`]. Shard count and secret length are then fully decoupled, and
//! every split pays the same, small, fixed-size polynomial-evaluation cost.
//!
//! Shards are rendered as ASCII strings:
//! `bst_p256_<share_id>_<k>_<x>_<y_hex>_<payload_hex>` — the share id and
//! sealed payload are duplicated onto every shard of one split so
//! [`combine`] can reject shards that don't belong together before doing
//! any field arithmetic.

mod field;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::RngCore;

use crate::config::{AES_NONCE_SIZE, LEGACY_SHARD_PREFIX, SESSION_KEY_LEN, SHARD_FIELD_COUNT, SHARD_PREFIX, SHARE_ID_LEN};
use crate::error::{BastionError, Result};

/// Splits `secret` into `n` shards, any `k` of which reconstruct it.
///
/// # Errors
/// Returns [`BastionError::BadInput`] if `k` is zero or exceeds `n`.
pub fn split(secret: &str, n: usize, k: usize) -> Result<Vec<String>> {
    if k == 0 || k > n {
        return Err(BastionError::bad_input("threshold must be between 1 and the share count"));
    }

    let session_key = random_elem();
    let session_key_bytes = field::to_bytes_be(session_key);

    let mut iv = [0u8; AES_NONCE_SIZE];
    rand::rng().fill_bytes(&mut iv);
    let cipher = Aes256Gcm::new_from_slice(&session_key_bytes).expect("session key is exactly 32 bytes");
    let ciphertext = cipher.encrypt(Nonce::from_slice(&iv), secret.as_bytes()).map_err(|_| BastionError::AuthFailure)?;

    let mut payload = Vec::with_capacity(iv.len() + ciphertext.len());
    payload.extend_from_slice(&iv);
    payload.extend_from_slice(&ciphertext);
    let payload_hex = hex::encode(&payload);

    let mut share_id_bytes = [0u8; SHARE_ID_LEN];
    rand::rng().fill_bytes(&mut share_id_bytes);
    let share_id = hex::encode(share_id_bytes);

    let mut coefficients = vec![session_key];
    for _ in 1..k {
        coefficients.push(random_elem());
    }

    let mut shards = Vec::with_capacity(n);
    #[allow(clippy::cast_possible_truncation)]
    for x in 1..=n as u64 {
        let y = evaluate(&coefficients, field::from_u64(x));
        let y_hex = field::to_hex_minimal(y);
        shards.push(format!("{SHARD_PREFIX}_{share_id}_{k}_{x}_{y_hex}_{payload_hex}"));
    }
    Ok(shards)
}

/// Reconstructs the original secret from `shards`.
///
/// # Errors
/// Returns [`BastionError::Policy`] if `shards` carry the legacy `bst_s1_`
/// prefix, fewer shards than the threshold they declare, or a mix of
/// shards from different splits. Returns [`BastionError::BadInput`] if a
/// shard string doesn't parse. Returns [`BastionError::AuthFailure`] if the
/// reconstructed session key fails to open the sealed payload — the result
/// of combining the wrong set of shards or a tampered shard is
/// indistinguishable from the other.
pub fn combine(shards: &[String]) -> Result<String> {
    if shards.iter().any(|s| s.starts_with(&format!("{LEGACY_SHARD_PREFIX}_"))) {
        return Err(BastionError::policy("legacy GF(256) shards are not supported; re-split the secret"));
    }
    if shards.is_empty() {
        return Err(BastionError::policy("no shards supplied"));
    }

    let parsed: Vec<ParsedShard> = shards.iter().map(|s| parse_shard(s)).collect::<Result<_>>()?;

    let share_id = &parsed[0].share_id;
    let payload_hex = &parsed[0].payload_hex;
    let k = parsed[0].k;
    if parsed.iter().any(|p| &p.share_id != share_id || &p.payload_hex != payload_hex) {
        return Err(BastionError::policy("shards do not all belong to the same split"));
    }
    if shards.len() < k {
        return Err(BastionError::policy(format!("need at least {k} shards, have {}", shards.len())));
    }

    let points: Vec<(field::Elem, field::Elem)> = parsed.iter().take(k).map(|p| (field::from_u64(p.x), p.y)).collect();
    let session_key = lagrange_interpolate_at_zero(&points);
    let session_key_bytes = field::to_bytes_be(session_key);

    let payload = hex::decode(payload_hex).map_err(|_| BastionError::bad_input("malformed shard payload"))?;
    if payload.len() < AES_NONCE_SIZE {
        return Err(BastionError::bad_input("shard payload shorter than an IV"));
    }
    let (iv, ciphertext) = payload.split_at(AES_NONCE_SIZE);

    let cipher = Aes256Gcm::new_from_slice(&session_key_bytes).expect("session key is exactly 32 bytes");
    let plaintext = cipher.decrypt(Nonce::from_slice(iv), ciphertext).map_err(|_| BastionError::AuthFailure)?;

    String::from_utf8(plaintext).map_err(|_| BastionError::Corrupt("recovered secret was not valid UTF-8".into()))
}

struct ParsedShard {
    share_id: String,
    k: usize,
    x: u64,
    y: field::Elem,
    payload_hex: String,
}

fn parse_shard(shard: &str) -> Result<ParsedShard> {
    let parts: Vec<&str> = shard.split('_').collect();
    if parts.len() != SHARD_FIELD_COUNT || parts[0] != "bst" || parts[1] != "p256" {
        return Err(BastionError::bad_input("unrecognized shard format"));
    }
    let share_id = parts[2].to_owned();
    let k: usize = parts[3].parse().map_err(|_| BastionError::bad_input("shard threshold is not a number"))?;
    let x: u64 = parts[4].parse().map_err(|_| BastionError::bad_input("shard x-coordinate is not a number"))?;
    // Accept any length up to 64 hex chars, not just a fixed 32-byte
    // zero-padded form: a conforming implementation renders `y` with no
    // leading-zero padding, so a leading zero byte in `y` (~1/256 chance per
    // shard) legitimately produces a shorter hex string.
    let y = field::from_hex_minimal(parts[5]).ok_or_else(|| BastionError::bad_input("shard y-value is not valid hex"))?;
    let payload_hex = parts[6].to_owned();
    Ok(ParsedShard { share_id, k, x, y, payload_hex })
}

fn evaluate(coefficients: &[field::Elem], x: field::Elem) -> field::Elem {
    let mut result = field::ZERO;
    for coeff in coefficients.iter().rev() {
        result = field::addmod(field::mulmod(result, x), *coeff);
    }
    result
}

fn lagrange_interpolate_at_zero(points: &[(field::Elem, field::Elem)]) -> field::Elem {
    let mut total = field::ZERO;
    for (i, &(x_i, y_i)) in points.iter().enumerate() {
        let mut numerator = field::ONE;
        let mut denominator = field::ONE;
        for (j, &(x_j, _)) in points.iter().enumerate() {
            if i == j {
                continue;
            }
            // At x = 0: numerator term is (0 - x_j) = -x_j.
            numerator = field::mulmod(numerator, field::submod_public(field::ZERO, x_j));
            denominator = field::mulmod(denominator, field::submod_public(x_i, x_j));
        }
        let term = field::mulmod(y_i, field::mulmod(numerator, field::inv(denominator)));
        total = field::addmod(total, term);
    }
    total
}

fn random_elem() -> field::Elem {
    loop {
        let mut bytes = [0u8; SESSION_KEY_LEN];
        rand::rng().fill_bytes(&mut bytes);
        if let Some(elem) = field::from_bytes_rejecting(&bytes) {
            return elem;
        }
    }
}
