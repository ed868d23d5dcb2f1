//!
//! JSON snapshot persistence.
//!
//! Generalizes the original source's `cache/persistence.go`
//! (`SaveToDisk`/`LoadData`) to the typed keyspace: one JSON object
//! keyed by the stored key, each value tagged `{"type", "value",
//! "expiryTime"}`. Loading is a straight deserialize;
//! entries already past their `expiryTime` are dropped rather than
//! loaded, so a server that was down past a key's TTL never resurrects
//! it.

use std::collections::HashMap;
use std::time::SystemTime;

use crate::db::Map;
use crate::error::Result;
use crate::value::{Entry, StoredEntry, StoredValue, Value};

fn entry_to_stored(entry: &Entry) -> StoredEntry {
    let value = match &entry.value {
        Value::String(s) => StoredValue::String { value: s.clone() },
        Value::List(l) => StoredValue::List { value: l.clone() },
        Value::Set(s) => StoredValue::Set { value: s.clone() },
        Value::Hash(h) => StoredValue::Hash { value: h.clone() },
    };
    StoredEntry { value, expiry_time: entry.expiry_at.map(chrono::DateTime::<chrono::Utc>::from) }
}

fn stored_to_entry(stored: StoredEntry) -> Entry {
    let value = match stored.value {
        StoredValue::String { value } => Value::String(value),
        StoredValue::List { value } => Value::List(value),
        StoredValue::Set { value } => Value::Set(value),
        StoredValue::Hash { value } => Value::Hash(value),
    };
    Entry { value, expiry_at: stored.expiry_time.map(SystemTime::from) }
}

/// Serializes `entries` to `path` as pretty JSON. Expired entries are
/// expected to already be filtered out by the caller (the keyspace's
/// `snapshot()` does this).
pub fn save(entries: &Map, path: &str) -> Result<()> {
    let stored: HashMap<&String, StoredEntry> =
        entries.iter().map(|(k, v)| (k, entry_to_stored(v))).collect();
    let json = serde_json::to_vec_pretty(&stored)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Loads a snapshot from `path`, dropping any entry already past its
/// `expiryTime`. Returns an empty map if the file does not exist —
/// a fresh server has nothing to load, not an error.
pub fn load(path: &str) -> Result<Map> {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
        Err(e) => return Err(e.into()),
    };
    let stored: HashMap<String, StoredEntry> = serde_json::from_slice(&bytes)?;
    let now = SystemTime::now();
    let mut entries = Map::new();
    for (key, stored_entry) in stored {
        let entry = stored_to_entry(stored_entry);
        if !entry.is_expired(now) {
            entries.insert(key, entry);
        }
    }
    Ok(entries)
}
