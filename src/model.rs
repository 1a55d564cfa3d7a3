//! # Vault Data Model
//!
//! The dynamic, loosely-typed records of the original implementation become
//! plain structs here, one per record kind named in the vault state. Each
//! carries an `extra` map that captures any JSON key this binary doesn't
//! recognize — so a newer implementation's fields survive an older
//! implementation's decrypt/edit/encrypt cycle intact (spec §9: "Unknown
//! fields on read must survive a round-trip").
//!
//! None of these types implement `serde::Serialize` directly: the canonical
//! byte layout (§4.1) has its own fixed key order and its own "omit absent
//! optionals, never inject defaults" rule, which a derived `Serialize` can't
//! express precisely enough. Each type instead exposes `canonical_value`,
//! used by [`crate::canon`] to build the compact, byte-deterministic JSON
//! document. `Deserialize` is derived normally since parsing is unambiguous.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Inserts `key: value` into `map` only when `value` is `Some`.
fn insert_opt<T: Into<Value>>(map: &mut Map<String, Value>, key: &str, value: Option<T>) {
    if let Some(v) = value {
        map.insert(key.to_owned(), v.into());
    }
}

/// Appends `extra`'s entries to `map`, sorted lexicographically by key, as
/// required by spec §4.1: "Keys present in the object but absent from the
/// order list are appended in lexicographic order."
fn append_extra(map: &mut Map<String, Value>, extra: &IndexMap<String, Value>) {
    let mut keys: Vec<&String> = extra.keys().collect();
    keys.sort();
    for key in keys {
        map.insert(key.clone(), extra[key].clone());
    }
}

/// A stored credential: a site/service login plus the parameters needed to
/// deterministically re-derive its password via [`crate::transmute`].
#[derive(Debug, Clone, Deserialize)]
pub struct Credential {
    pub id: String,
    pub name: String,
    pub username: String,
    pub category: String,
    /// Per-entry revision. Incrementing this on every edit is intentional:
    /// because [`crate::transmute::transmute`] takes `version` as an input,
    /// bumping it silently rotates the derived password (spec §9 Open
    /// Question — documented, not skipped).
    #[serde(default = "default_version")]
    pub version: u64,
    #[serde(default = "default_length")]
    pub length: u32,
    #[serde(default = "default_true", rename = "useSymbols")]
    pub use_symbols: bool,
    /// When non-empty, overrides the deterministic derivation entirely.
    #[serde(default, rename = "customPassword")]
    pub custom_password: Option<String>,
    #[serde(default, rename = "breachStats")]
    pub breach_stats: Option<Value>,
    /// Set by the external breach-auditor collaborator; this crate never
    /// writes it, only preserves it across canonicalization round-trips.
    #[serde(default)]
    pub compromised: Option<bool>,
    #[serde(default, rename = "createdAt")]
    pub created_at: i64,
    #[serde(default, rename = "updatedAt")]
    pub updated_at: i64,
    #[serde(default, rename = "usageCount")]
    pub usage_count: u64,
    #[serde(default, rename = "sortOrder")]
    pub sort_order: Option<i64>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

fn default_version() -> u64 {
    1
}

fn default_length() -> u32 {
    16
}

fn default_true() -> bool {
    true
}

impl Credential {
    /// The effective password for this credential: `custom_password` when
    /// non-empty, otherwise the deterministic transmutation (spec §3
    /// invariant).
    pub fn effective_password(&self, entropy: &str) -> String {
        match &self.custom_password {
            Some(p) if !p.is_empty() => p.clone(),
            _ => crate::transmute::transmute(entropy, &self.name, &self.username, self.version, self.length as usize, self.use_symbols),
        }
    }

    pub(crate) fn canonical_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("id".into(), self.id.clone().into());
        map.insert("name".into(), self.name.clone().into());
        map.insert("username".into(), self.username.clone().into());
        map.insert("category".into(), self.category.clone().into());
        map.insert("version".into(), self.version.into());
        map.insert("length".into(), self.length.into());
        map.insert("useSymbols".into(), self.use_symbols.into());
        insert_opt(&mut map, "customPassword", self.custom_password.clone());
        insert_opt(&mut map, "breachStats", self.breach_stats.clone());
        insert_opt(&mut map, "compromised", self.compromised);
        map.insert("createdAt".into(), self.created_at.into());
        map.insert("updatedAt".into(), self.updated_at.into());
        map.insert("usageCount".into(), self.usage_count.into());
        insert_opt(&mut map, "sortOrder", self.sort_order);
        append_extra(&mut map, &self.extra);
        Value::Object(map)
    }
}

/// A free-text note.
#[derive(Debug, Clone, Deserialize)]
pub struct Note {
    pub id: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: i64,
    pub title: String,
    pub content: String,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl Note {
    pub(crate) fn canonical_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("id".into(), self.id.clone().into());
        map.insert("updatedAt".into(), self.updated_at.into());
        map.insert("title".into(), self.title.clone().into());
        map.insert("content".into(), self.content.clone().into());
        append_extra(&mut map, &self.extra);
        Value::Object(map)
    }
}

/// A stored contact record.
#[derive(Debug, Clone, Deserialize)]
pub struct Contact {
    pub id: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: i64,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub notes: String,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl Contact {
    pub(crate) fn canonical_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("id".into(), self.id.clone().into());
        map.insert("updatedAt".into(), self.updated_at.into());
        map.insert("name".into(), self.name.clone().into());
        map.insert("email".into(), self.email.clone().into());
        map.insert("phone".into(), self.phone.clone().into());
        map.insert("address".into(), self.address.clone().into());
        map.insert("notes".into(), self.notes.clone().into());
        append_extra(&mut map, &self.extra);
        Value::Object(map)
    }
}

/// A registry entry for a key held by the file locker (§4.6): the vault
/// never stores the encrypted file itself, only the key needed to open it.
#[derive(Debug, Clone, Deserialize)]
pub struct FileKey {
    /// The exact 36-byte id stored in the corresponding `.bastion` file's
    /// header, used for registry lookup on decrypt.
    pub id: String,
    pub timestamp: i64,
    pub label: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub mime: Option<String>,
    /// Hex-encoded 32-byte AES-256-GCM key for the corresponding file.
    pub key: String,
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub embedded: Option<bool>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl FileKey {
    pub(crate) fn canonical_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("id".into(), self.id.clone().into());
        map.insert("timestamp".into(), self.timestamp.into());
        map.insert("label".into(), self.label.clone().into());
        insert_opt(&mut map, "size", self.size);
        insert_opt(&mut map, "mime", self.mime.clone());
        map.insert("key".into(), self.key.clone().into());
        insert_opt(&mut map, "hash", self.hash.clone());
        insert_opt(&mut map, "embedded", self.embedded);
        append_extra(&mut map, &self.extra);
        Value::Object(map)
    }
}

/// The full decrypted plaintext payload of one vault blob (spec §3).
#[derive(Debug, Clone, Deserialize)]
pub struct VaultState {
    /// 64-hex-char (32-byte) seed, generated once at creation and never
    /// rotated — every derived password depends on it.
    pub entropy: String,
    #[serde(default)]
    pub configs: Vec<Credential>,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub locker: Vec<FileKey>,
    pub version: u64,
    #[serde(rename = "lastModified")]
    pub last_modified: i64,
    #[serde(default)]
    pub flags: i64,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl VaultState {
    /// A fresh, empty vault state: new random entropy, version 1.
    pub fn new(entropy: String, now_ms: i64) -> Self {
        Self {
            entropy,
            configs: Vec::new(),
            notes: Vec::new(),
            contacts: Vec::new(),
            locker: Vec::new(),
            version: 1,
            last_modified: now_ms,
            flags: 0,
            extra: IndexMap::new(),
        }
    }

    pub(crate) fn canonical_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("version".into(), self.version.into());
        map.insert("entropy".into(), self.entropy.clone().into());
        map.insert("flags".into(), self.flags.into());
        map.insert("lastModified".into(), self.last_modified.into());
        map.insert("locker".into(), Value::Array(self.locker.iter().map(FileKey::canonical_value).collect()));
        map.insert("contacts".into(), Value::Array(self.contacts.iter().map(Contact::canonical_value).collect()));
        map.insert("notes".into(), Value::Array(self.notes.iter().map(Note::canonical_value).collect()));
        map.insert("configs".into(), Value::Array(self.configs.iter().map(Credential::canonical_value).collect()));
        append_extra(&mut map, &self.extra);
        Value::Object(map)
    }
}
