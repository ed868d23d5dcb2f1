//!
//! The polymorphic value stored at each key, and the entry wrapping it
//! with optional expiration metadata.
//!
//! A tagged union over the four supported value kinds, re-tagged for
//! JSON persistence the way `cache/persistence.go`'s `Entry.Type` field
//! does.

use std::collections::{HashMap, HashSet, VecDeque};
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

/// A stored value. The variant is immutable once chosen for a given key:
/// commands that would change it return `WRONGTYPE` instead (invariant 1).
#[derive(Debug, Clone)]
pub enum Value {
    String(String),
    List(VecDeque<String>),
    Set(HashSet<String>),
    // Field insertion order is not observable, so a plain HashMap is
    // the right structure.
    Hash(HashMap<String, String>),
}

impl Value {
    pub fn type_tag(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Set(_) => "set",
            Value::Hash(_) => "hash",
        }
    }
}

/// A key's stored value plus its absolute expiration instant, if any.
#[derive(Debug, Clone)]
pub struct Entry {
    pub value: Value,
    pub expiry_at: Option<SystemTime>,
}

impl Entry {
    pub fn new(value: Value) -> Self {
        Entry { value, expiry_at: None }
    }

    pub fn with_ttl(value: Value, ttl: Duration) -> Self {
        Entry { value, expiry_at: Some(SystemTime::now() + ttl) }
    }

    /// True once `now` has passed `expiry_at`; entries with no expiry
    /// never expire (invariant 2).
    pub fn is_expired(&self, now: SystemTime) -> bool {
        matches!(self.expiry_at, Some(t) if now >= t)
    }
}

/// On-disk representation of one keyspace entry: a
/// `{ "type", "value", "expiryTime" }` persistence format.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoredValue {
    String { value: String },
    List { value: VecDeque<String> },
    Set { value: HashSet<String> },
    Hash { value: HashMap<String, String> },
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StoredEntry {
    #[serde(flatten)]
    pub value: StoredValue,
    /// ISO-8601 expiry instant, or absent/zero for no expiry.
    #[serde(rename = "expiryTime", skip_serializing_if = "Option::is_none")]
    pub expiry_time: Option<chrono::DateTime<chrono::Utc>>,
}
