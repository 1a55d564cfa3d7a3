//! Constants for the Bastion cryptographic core.
//!
//! Single source of truth for every magic byte, size, and parameter named in
//! the protocol. Every other module reaches in here rather than inlining
//! literals, so the protocol's numbers only ever appear once.

/// Length of a derived AEAD key, in bytes (AES-256-GCM key size).
pub const KEY_SIZE: usize = 32;

/// Length of an AES-GCM nonce/IV, in bytes.
pub const AES_NONCE_SIZE: usize = 12;

/// Length of the AEAD authentication tag appended by the cipher, in bytes.
pub const TAG_SIZE: usize = 16;

// --- Argon2id (current KDF) ---

/// Argon2id time cost (number of passes) for the current (V3.5) protocol.
pub const ARGON_TIME: u32 = 3;

/// Argon2id memory cost in KiB (64 MiB) for the current (V3.5) protocol.
pub const ARGON_MEMORY: u32 = 64 * 1024;

/// Argon2id parallelism factor for the current (V3.5) protocol.
pub const ARGON_PARALLELISM: u32 = 1;

/// Argon2id output length in bytes — a 32-byte AES-256-GCM key.
pub const ARGON_HASH_LEN: usize = 32;

/// Length of the raw Argon2id salt, in bytes.
pub const ARGON_SALT_LEN: usize = 16;

// --- PBKDF2-HMAC-SHA256 (legacy KDF) ---

/// Iteration count for V2 and domain-separated V1 legacy unlocks.
pub const PBKDF2_ITERATIONS_V2: u32 = 210_000;

/// Iteration count for the ancient V0 legacy unlock (no domain separation).
pub const PBKDF2_ITERATIONS_V0: u32 = 100_000;

/// Domain-separation prefix prepended to the raw salt for V1/V2 legacy KDF.
pub const LEGACY_DOMAIN_PREFIX: &[u8] = b"BASTION_VAULT_V1::";

// --- Envelope headers ---

/// 4-byte protocol magic prefixing every headered envelope.
pub const ENVELOPE_MAGIC: &[u8; 4] = b"BSTN";

/// Version byte: current protocol — Argon2id + framed canonical JSON.
pub const VERSION_V3_5: u8 = 0x04;

/// Version byte: Argon2id + unframed JSON (upgraded to V3.5 on read).
pub const VERSION_V3: u8 = 0x03;

/// Version byte: PBKDF2-SHA256 (210k, domain-separated salt) + unframed JSON.
pub const VERSION_V2: u8 = 0x02;

/// Byte length of a headered envelope's fixed prefix: magic(4) + version(1).
pub const HEADER_LEN: usize = 5;

// --- Framer ---

/// Alignment boundary, in bytes, that framed payloads are zero-padded to.
pub const FRAME_ALIGNMENT: usize = 64;

/// Byte length of the little-endian frame length prefix.
pub const FRAME_PREFIX_LEN: usize = 4;

// --- Vault file container ---

/// Prefix identifying the current on-disk vault file wrapper format.
pub const VAULT_FILE_MAGIC: &str = "BASTION_V3::";

// --- Password transmuter ---

/// Salt prefix for deterministic per-site password derivation.
pub const TRANSMUTE_SALT_PREFIX: &str = "BASTION_GENERATOR_V2::";

/// PBKDF2-HMAC-SHA512 iteration count used by the transmuter.
pub const TRANSMUTE_ITERATIONS: u32 = 210_000;

/// Rejection-sampling output surplus factor: `dkLen = length * FLUX_FACTOR`.
pub const TRANSMUTE_FLUX_FACTOR: usize = 32;

/// Lowercase alphabet used in the transmuter's character pool.
pub const POOL_LOWER: &str = "abcdefghijklmnopqrstuvwxyz";

/// Uppercase alphabet used in the transmuter's character pool.
pub const POOL_UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Digits used in the transmuter's character pool.
pub const POOL_DIGITS: &str = "0123456789";

/// Symbol set appended to the pool when `use_symbols` is set.
pub const POOL_SYMBOLS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

// --- File locker ---

/// 8-byte magic identifying a standalone encrypted file container.
pub const LOCKER_MAGIC: &[u8; 8] = b"BASTION1";

/// Fixed field width, in bytes, of the locker container's id field.
pub const LOCKER_ID_WIDTH: usize = 36;

/// Number of random bytes hex-rendered into the locker id (36 hex chars).
pub const LOCKER_ID_RANDOM_BYTES: usize = 18;

/// Minimum byte length of a valid locker container: magic(8) + id(36) +
/// iv(12) = 56, before any ciphertext/tag.
pub const LOCKER_MIN_LEN: usize = LOCKER_MAGIC.len() + LOCKER_ID_WIDTH + AES_NONCE_SIZE;

/// Standard filename extension for locker containers.
pub const LOCKER_EXTENSION: &str = ".bastion";

/// Filename extension a decrypted locker output is written with.
pub const LOCKER_DECRYPTED_EXTENSION: &str = ".decrypted";

// --- Shamir threshold engine ---

/// ASCII prefix of a current-format (GF(p256)) shard string.
pub const SHARD_PREFIX: &str = "bst_p256";

/// ASCII prefix of a legacy GF(256) shard string, rejected without upgrade.
pub const LEGACY_SHARD_PREFIX: &str = "bst_s1";

/// Number of underscore-delimited fields in a well-formed shard string.
pub const SHARD_FIELD_COUNT: usize = 7;

/// Byte length of the random session key wrapped by the Shamir engine.
pub const SESSION_KEY_LEN: usize = 32;

/// Byte length of the random share id shared by all shards of one split.
pub const SHARE_ID_LEN: usize = 4;
