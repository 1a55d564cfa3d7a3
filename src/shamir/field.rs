//! A fixed 256-bit prime field, `GF(P)` with `P = 2^256 - 2^32 - 977` (the
//! secp256k1 base field prime).
//!
//! [`crate::shamir`] needs exactly four operations on field elements —
//! addition, subtraction, multiplication, and inversion — and nothing else.
//! A general bignum dependency would give us a much larger surface than we
//! need; hand-rolling these four operations against one compile-time-fixed
//! modulus keeps every arithmetic step inside this crate's own review, at
//! the cost of being slower than a wide-multiply-plus-Solinas-reduction
//! implementation would be. Splitting or reconstructing a secret runs once
//! per operation and is not on any hot path, so the trade is a clear win.
//!
//! Elements are stored as four `u64` limbs, least-significant first.

use std::cmp::Ordering;

/// A field element: four little-endian `u64` limbs.
pub type Elem = [u64; 4];

/// `P = 2^256 - 2^32 - 977`, the secp256k1 field prime.
pub const P: Elem = [0xFFFF_FFFE_FFFF_FC2F, 0xFFFF_FFFF_FFFF_FFFF, 0xFFFF_FFFF_FFFF_FFFF, 0xFFFF_FFFF_FFFF_FFFF];

pub const ZERO: Elem = [0, 0, 0, 0];
pub const ONE: Elem = [1, 0, 0, 0];

/// Builds an element from a small integer.
#[must_use]
pub fn from_u64(v: u64) -> Elem {
    [v, 0, 0, 0]
}

/// Parses a big-endian 32-byte buffer into an element, reducing modulo `P`
/// if the value is out of range (callers that need a strictly uniform
/// sample should use [`from_bytes_rejecting`] instead).
#[must_use]
pub fn from_bytes_be(bytes: &[u8; 32]) -> Elem {
    let mut limbs = [0u64; 4];
    for i in 0..4 {
        let chunk = &bytes[(3 - i) * 8..(3 - i) * 8 + 8];
        limbs[i] = u64::from_be_bytes(chunk.try_into().unwrap());
    }
    if cmp(limbs, P) != Ordering::Less {
        submod(limbs, P)
    } else {
        limbs
    }
}

/// Parses `bytes` as a candidate element, returning `None` when the value
/// is `>= P` so callers can redraw for an exactly-uniform sample.
#[must_use]
pub fn from_bytes_rejecting(bytes: &[u8; 32]) -> Option<Elem> {
    let mut limbs = [0u64; 4];
    for i in 0..4 {
        let chunk = &bytes[(3 - i) * 8..(3 - i) * 8 + 8];
        limbs[i] = u64::from_be_bytes(chunk.try_into().unwrap());
    }
    if cmp(limbs, P) == Ordering::Less {
        Some(limbs)
    } else {
        None
    }
}

/// Renders an element as a big-endian 32-byte buffer.
#[must_use]
pub fn to_bytes_be(x: Elem) -> [u8; 32] {
    let mut out = [0u8; 32];
    for i in 0..4 {
        out[(3 - i) * 8..(3 - i) * 8 + 8].copy_from_slice(&x[i].to_be_bytes());
    }
    out
}

/// Renders an element as a minimal-length lowercase hex string: no
/// leading-zero padding, matching the reference implementation's
/// `hex(y)[2:]` rendering (at least one digit, even for zero).
#[must_use]
pub fn to_hex_minimal(x: Elem) -> String {
    let full = hex::encode(to_bytes_be(x));
    let trimmed = full.trim_start_matches('0');
    if trimmed.is_empty() { "0".to_owned() } else { trimmed.to_owned() }
}

/// Parses a hex string of up to 64 characters — with or without
/// leading-zero padding, as [`to_hex_minimal`] produces and a conforming
/// implementation's `int(s, 16)` parser tolerates — into an element.
/// Returns `None` for an empty string, one longer than 64 characters, or
/// one containing non-hex characters.
#[must_use]
pub fn from_hex_minimal(s: &str) -> Option<Elem> {
    if s.is_empty() || s.len() > 64 {
        return None;
    }
    let padded = format!("{s:0>64}");
    let bytes: [u8; 32] = hex::decode(padded).ok()?.try_into().ok()?;
    Some(from_bytes_be(&bytes))
}

fn cmp(a: Elem, b: Elem) -> Ordering {
    for i in (0..4).rev() {
        match a[i].cmp(&b[i]) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

/// Adds two 4-limb integers, returning the sum and a carry-out of 0 or 1.
/// The result is *not* reduced modulo `P`.
fn add_raw(a: Elem, b: Elem) -> (Elem, u64) {
    let mut out = [0u64; 4];
    let mut carry = 0u128;
    for i in 0..4 {
        let sum = u128::from(a[i]) + u128::from(b[i]) + carry;
        out[i] = sum as u64;
        carry = sum >> 64;
    }
    (out, carry as u64)
}

/// Subtracts `b` from `a`, returning the difference and a borrow-out of 0
/// or 1 (1 meaning `a < b`, in which case the difference has wrapped).
fn sub_raw(a: Elem, b: Elem) -> (Elem, u64) {
    let mut out = [0u64; 4];
    let mut borrow = 0i128;
    for i in 0..4 {
        let diff = i128::from(a[i]) - i128::from(b[i]) - borrow;
        if diff < 0 {
            out[i] = (diff + (1i128 << 64)) as u64;
            borrow = 1;
        } else {
            out[i] = diff as u64;
            borrow = 0;
        }
    }
    (out, borrow as u64)
}

fn submod(a: Elem, b: Elem) -> Elem {
    let (diff, borrow) = sub_raw(a, b);
    if borrow == 1 {
        add_raw(diff, P).0
    } else {
        diff
    }
}

/// Adds two field elements modulo `P`.
#[must_use]
pub fn addmod(a: Elem, b: Elem) -> Elem {
    let (sum, carry) = add_raw(a, b);
    if carry == 1 || cmp(sum, P) != Ordering::Less {
        sub_raw(sum, P).0
    } else {
        sum
    }
}

/// Subtracts `b` from `a` modulo `P`.
#[must_use]
pub fn submod_public(a: Elem, b: Elem) -> Elem {
    submod(a, b)
}

/// Multiplies two field elements modulo `P` via double-and-add: walking the
/// multiplier's bits from most to least significant, doubling the
/// accumulator each step and conditionally adding `a`.
#[must_use]
pub fn mulmod(a: Elem, b: Elem) -> Elem {
    let mut result = ZERO;
    for i in (0..256).rev() {
        result = addmod(result, result);
        if bit(b, i) {
            result = addmod(result, a);
        }
    }
    result
}

fn bit(x: Elem, i: usize) -> bool {
    (x[i / 64] >> (i % 64)) & 1 == 1
}

/// Raises `base` to `exponent` modulo `P` via square-and-multiply, walking
/// the exponent's bits from least to most significant.
#[must_use]
pub fn pow_mod(base: Elem, exponent: Elem) -> Elem {
    let mut result = ONE;
    let mut acc = base;
    for i in 0..256 {
        if bit(exponent, i) {
            result = mulmod(result, acc);
        }
        acc = mulmod(acc, acc);
    }
    result
}

/// Inverts a nonzero field element via Fermat's little theorem:
/// `a^(P-2) mod P == a^-1 mod P` since `P` is prime.
#[must_use]
pub fn inv(a: Elem) -> Elem {
    let p_minus_2 = sub_raw(P, [2, 0, 0, 0]).0;
    pow_mod(a, p_minus_2)
}

#[must_use]
pub fn is_zero(a: Elem) -> bool {
    a == ZERO
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addition_wraps_at_the_modulus() {
        let almost_p = submod(P, ONE);
        assert_eq!(addmod(almost_p, from_u64(2)), ONE);
    }

    #[test]
    fn subtraction_wraps_below_zero() {
        assert_eq!(submod_public(ZERO, ONE), submod(P, ONE));
    }

    #[test]
    fn multiplication_by_one_is_identity() {
        let a = from_u64(123_456_789);
        assert_eq!(mulmod(a, ONE), a);
    }

    #[test]
    fn multiplication_matches_repeated_addition_for_small_values() {
        let a = from_u64(7);
        let b = from_u64(9);
        let mut expected = ZERO;
        for _ in 0..9 {
            expected = addmod(expected, a);
        }
        assert_eq!(mulmod(a, b), expected);
    }

    #[test]
    fn inverse_round_trips_through_multiplication() {
        let a = from_u64(424_242);
        let inverse = inv(a);
        assert_eq!(mulmod(a, inverse), ONE);
    }

    #[test]
    fn byte_roundtrip_preserves_small_values() {
        let a = from_u64(999_999_999);
        let bytes = to_bytes_be(a);
        assert_eq!(from_bytes_be(&bytes), a);
    }

    #[test]
    fn rejects_values_at_or_above_the_modulus() {
        let bytes = to_bytes_be(P);
        assert!(from_bytes_rejecting(&bytes).is_none());
        let bytes_below = to_bytes_be(submod(P, ONE));
        assert!(from_bytes_rejecting(&bytes_below).is_some());
    }
}
