//!
//! The shared, concurrency-safe keyspace.
//!
//! One `parking_lot::Mutex` guards the whole map — the simplest
//! correct implementation for a keyspace this size. Every operation is
//! split into a `*_locked` associated function that takes the
//! already-locked map, and a public method that acquires the lock once
//! and calls it — the same split the dispatcher's `EXEC` handling
//! needs to run a whole queued block under one lock acquisition for
//! atomicity.
//!
//! Per-type behavior is grounded on `cache/lists.go`, `cache/sets.go`
//! and `cache/hashes.go`, with a few bugs fixed along the way: the
//! `LPOP`/`RPOP` double-ended slice, the constant `SREM` return, and
//! the `HGET` integer framing.

use std::collections::{HashMap, HashSet, VecDeque};
use std::time::{Duration, SystemTime};

use parking_lot::{Mutex, MutexGuard};

use crate::error::{RedliteError, Result};
use crate::value::{Entry, Value};

pub type Map = HashMap<String, Entry>;

pub struct Keyspace {
    inner: Mutex<Map>,
}

impl Keyspace {
    pub fn new() -> Self {
        Keyspace { inner: Mutex::new(HashMap::new()) }
    }

    /// Acquires the keyspace lock for a whole run of commands, so the
    /// dispatcher can execute a contiguous block (an `EXEC`'s queued
    /// keyspace commands) without any other client's command becoming
    /// observable in between.
    pub fn lock(&self) -> MutexGuard<'_, Map> {
        self.inner.lock()
    }

    /// Removes `key` if its entry has expired. Every `*_locked` function
    /// below calls this first, under the caller's lock acquisition, per
    /// the lazy-expiry discipline (check on access, evict if due).
    pub fn evict_if_expired(map: &mut Map, key: &str) {
        let expired = matches!(map.get(key), Some(e) if e.is_expired(SystemTime::now()));
        if expired {
            map.remove(key);
        }
    }

    // ---- strings ----

    pub fn set_locked(map: &mut Map, key: &str, value: String, ttl: Option<Duration>) {
        Self::evict_if_expired(map, key);
        let entry = match ttl {
            Some(d) if d > Duration::ZERO => Entry::with_ttl(Value::String(value), d),
            _ => Entry::new(Value::String(value)),
        };
        map.insert(key.to_string(), entry);
    }

    pub fn set(&self, key: &str, value: String, ttl: Option<Duration>) {
        Self::set_locked(&mut self.inner.lock(), key, value, ttl)
    }

    pub fn get_locked(map: &mut Map, key: &str) -> Result<Option<String>> {
        Self::evict_if_expired(map, key);
        match map.get(key) {
            None => Ok(None),
            Some(Entry { value: Value::String(s), .. }) => Ok(Some(s.clone())),
            Some(_) => Err(RedliteError::WrongType),
        }
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        Self::get_locked(&mut self.inner.lock(), key)
    }

    pub fn delete_locked(map: &mut Map, key: &str) -> bool {
        Self::evict_if_expired(map, key);
        map.remove(key).is_some()
    }

    pub fn delete(&self, key: &str) -> bool {
        Self::delete_locked(&mut self.inner.lock(), key)
    }

    // ---- lists ----

    pub fn lpush_locked(map: &mut Map, key: &str, values: &[String]) -> Result<usize> {
        Self::evict_if_expired(map, key);
        let entry = map
            .entry(key.to_string())
            .or_insert_with(|| Entry::new(Value::List(VecDeque::new())));
        let list = match &mut entry.value {
            Value::List(l) => l,
            _ => return Err(RedliteError::WrongType),
        };
        for v in values {
            list.push_front(v.clone());
        }
        Ok(list.len())
    }

    pub fn lpush(&self, key: &str, values: &[String]) -> Result<usize> {
        Self::lpush_locked(&mut self.inner.lock(), key, values)
    }

    pub fn rpush_locked(map: &mut Map, key: &str, values: &[String]) -> Result<usize> {
        Self::evict_if_expired(map, key);
        let entry = map
            .entry(key.to_string())
            .or_insert_with(|| Entry::new(Value::List(VecDeque::new())));
        let list = match &mut entry.value {
            Value::List(l) => l,
            _ => return Err(RedliteError::WrongType),
        };
        for v in values {
            list.push_back(v.clone());
        }
        Ok(list.len())
    }

    pub fn rpush(&self, key: &str, values: &[String]) -> Result<usize> {
        Self::rpush_locked(&mut self.inner.lock(), key, values)
    }

    pub fn lrange_locked(map: &mut Map, key: &str, start: i64, stop: i64) -> Result<Vec<String>> {
        Self::evict_if_expired(map, key);
        let list = match map.get(key) {
            None => return Ok(Vec::new()),
            Some(Entry { value: Value::List(l), .. }) => l,
            Some(_) => return Err(RedliteError::WrongType),
        };
        match normalize_range(list.len() as i64, start, stop) {
            None => Ok(Vec::new()),
            Some((s, e)) => Ok(list.iter().skip(s).take(e - s + 1).cloned().collect()),
        }
    }

    pub fn lrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>> {
        Self::lrange_locked(&mut self.inner.lock(), key, start, stop)
    }

    pub fn lpop_locked(map: &mut Map, key: &str) -> Result<Option<String>> {
        Self::evict_if_expired(map, key);
        match map.get_mut(key) {
            None => Ok(None),
            Some(Entry { value: Value::List(l), .. }) => Ok(l.pop_front()),
            Some(_) => Err(RedliteError::WrongType),
        }
    }

    pub fn lpop(&self, key: &str) -> Result<Option<String>> {
        Self::lpop_locked(&mut self.inner.lock(), key)
    }

    pub fn rpop_locked(map: &mut Map, key: &str) -> Result<Option<String>> {
        Self::evict_if_expired(map, key);
        match map.get_mut(key) {
            None => Ok(None),
            Some(Entry { value: Value::List(l), .. }) => Ok(l.pop_back()),
            Some(_) => Err(RedliteError::WrongType),
        }
    }

    pub fn rpop(&self, key: &str) -> Result<Option<String>> {
        Self::rpop_locked(&mut self.inner.lock(), key)
    }

    pub fn llen_locked(map: &mut Map, key: &str) -> Result<usize> {
        Self::evict_if_expired(map, key);
        match map.get(key) {
            None => Ok(0),
            Some(Entry { value: Value::List(l), .. }) => Ok(l.len()),
            Some(_) => Err(RedliteError::WrongType),
        }
    }

    pub fn llen(&self, key: &str) -> Result<usize> {
        Self::llen_locked(&mut self.inner.lock(), key)
    }

    pub fn lindex_locked(map: &mut Map, key: &str, index: i64) -> Result<Option<String>> {
        Self::evict_if_expired(map, key);
        let list = match map.get(key) {
            None => return Ok(None),
            Some(Entry { value: Value::List(l), .. }) => l,
            Some(_) => return Err(RedliteError::WrongType),
        };
        let len = list.len() as i64;
        let idx = if index < 0 { index + len } else { index };
        if idx < 0 || idx >= len {
            return Ok(None);
        }
        Ok(list.get(idx as usize).cloned())
    }

    pub fn lindex(&self, key: &str, index: i64) -> Result<Option<String>> {
        Self::lindex_locked(&mut self.inner.lock(), key, index)
    }

    pub fn lset_locked(map: &mut Map, key: &str, index: i64, element: String) -> Result<()> {
        Self::evict_if_expired(map, key);
        let list = match map.get_mut(key) {
            None => return Err(RedliteError::Syntax("index out of range".to_string())),
            Some(Entry { value: Value::List(l), .. }) => l,
            Some(_) => return Err(RedliteError::WrongType),
        };
        let len = list.len() as i64;
        let idx = if index < 0 { index + len } else { index };
        if idx < 0 || idx >= len {
            return Err(RedliteError::Syntax("index out of range".to_string()));
        }
        list[idx as usize] = element;
        Ok(())
    }

    pub fn lset(&self, key: &str, index: i64, element: String) -> Result<()> {
        Self::lset_locked(&mut self.inner.lock(), key, index, element)
    }

    pub fn lrem_locked(map: &mut Map, key: &str, count: i64, element: &str) -> Result<i64> {
        Self::evict_if_expired(map, key);
        match map.get_mut(key) {
            None => Ok(0),
            Some(Entry { value: Value::List(l), .. }) => Ok(remove_from_list(l, count, element)),
            Some(_) => Err(RedliteError::WrongType),
        }
    }

    pub fn lrem(&self, key: &str, count: i64, element: &str) -> Result<i64> {
        Self::lrem_locked(&mut self.inner.lock(), key, count, element)
    }

    pub fn ltrim_locked(map: &mut Map, key: &str, start: i64, stop: i64) -> Result<()> {
        Self::evict_if_expired(map, key);
        let remove_key = match map.get_mut(key) {
            None => return Ok(()),
            Some(entry) => {
                let list = match &mut entry.value {
                    Value::List(l) => l,
                    _ => return Err(RedliteError::WrongType),
                };
                match normalize_range(list.len() as i64, start, stop) {
                    None => list.clear(),
                    Some((s, e)) => {
                        let kept: VecDeque<String> =
                            list.iter().skip(s).take(e - s + 1).cloned().collect();
                        *list = kept;
                    }
                }
                list.is_empty()
            }
        };
        if remove_key {
            map.remove(key);
        }
        Ok(())
    }

    pub fn ltrim(&self, key: &str, start: i64, stop: i64) -> Result<()> {
        Self::ltrim_locked(&mut self.inner.lock(), key, start, stop)
    }

    // ---- sets ----

    pub fn sadd_locked(map: &mut Map, key: &str, members: &[String]) -> Result<usize> {
        Self::evict_if_expired(map, key);
        let entry = map
            .entry(key.to_string())
            .or_insert_with(|| Entry::new(Value::Set(HashSet::new())));
        let set = match &mut entry.value {
            Value::Set(s) => s,
            _ => return Err(RedliteError::WrongType),
        };
        let mut added = 0;
        for m in members {
            if set.insert(m.clone()) {
                added += 1;
            }
        }
        Ok(added)
    }

    pub fn sadd(&self, key: &str, members: &[String]) -> Result<usize> {
        Self::sadd_locked(&mut self.inner.lock(), key, members)
    }

    pub fn sismember_locked(map: &mut Map, key: &str, member: &str) -> Result<bool> {
        Self::evict_if_expired(map, key);
        match map.get(key) {
            None => Ok(false),
            Some(Entry { value: Value::Set(s), .. }) => Ok(s.contains(member)),
            Some(_) => Err(RedliteError::WrongType),
        }
    }

    pub fn sismember(&self, key: &str, member: &str) -> Result<bool> {
        Self::sismember_locked(&mut self.inner.lock(), key, member)
    }

    pub fn srem_locked(map: &mut Map, key: &str, members: &[String]) -> Result<usize> {
        Self::evict_if_expired(map, key);
        match map.get_mut(key) {
            None => Ok(0),
            Some(Entry { value: Value::Set(s), .. }) => {
                let mut removed = 0;
                for m in members {
                    if s.remove(m) {
                        removed += 1;
                    }
                }
                Ok(removed)
            }
            Some(_) => Err(RedliteError::WrongType),
        }
    }

    pub fn srem(&self, key: &str, members: &[String]) -> Result<usize> {
        Self::srem_locked(&mut self.inner.lock(), key, members)
    }

    pub fn scard_locked(map: &mut Map, key: &str) -> Result<usize> {
        Self::evict_if_expired(map, key);
        match map.get(key) {
            None => Ok(0),
            Some(Entry { value: Value::Set(s), .. }) => Ok(s.len()),
            Some(_) => Err(RedliteError::WrongType),
        }
    }

    pub fn scard(&self, key: &str) -> Result<usize> {
        Self::scard_locked(&mut self.inner.lock(), key)
    }

    pub fn smembers_locked(map: &mut Map, key: &str) -> Result<Vec<String>> {
        Self::evict_if_expired(map, key);
        match map.get(key) {
            None => Ok(Vec::new()),
            Some(Entry { value: Value::Set(s), .. }) => Ok(s.iter().cloned().collect()),
            Some(_) => Err(RedliteError::WrongType),
        }
    }

    pub fn smembers(&self, key: &str) -> Result<Vec<String>> {
        Self::smembers_locked(&mut self.inner.lock(), key)
    }

    // ---- hashes ----

    pub fn hset_locked(map: &mut Map, key: &str, pairs: &[(String, String)]) -> Result<usize> {
        Self::evict_if_expired(map, key);
        let entry = map
            .entry(key.to_string())
            .or_insert_with(|| Entry::new(Value::Hash(HashMap::new())));
        let hash = match &mut entry.value {
            Value::Hash(h) => h,
            _ => return Err(RedliteError::WrongType),
        };
        let mut created = 0;
        for (field, value) in pairs {
            if hash.insert(field.clone(), value.clone()).is_none() {
                created += 1;
            }
        }
        Ok(created)
    }

    pub fn hset(&self, key: &str, pairs: &[(String, String)]) -> Result<usize> {
        Self::hset_locked(&mut self.inner.lock(), key, pairs)
    }

    pub fn hget_locked(map: &mut Map, key: &str, field: &str) -> Result<Option<String>> {
        Self::evict_if_expired(map, key);
        match map.get(key) {
            None => Ok(None),
            Some(Entry { value: Value::Hash(h), .. }) => Ok(h.get(field).cloned()),
            Some(_) => Err(RedliteError::WrongType),
        }
    }

    pub fn hget(&self, key: &str, field: &str) -> Result<Option<String>> {
        Self::hget_locked(&mut self.inner.lock(), key, field)
    }

    pub fn hgetall_locked(map: &mut Map, key: &str) -> Result<Vec<(String, String)>> {
        Self::evict_if_expired(map, key);
        match map.get(key) {
            None => Ok(Vec::new()),
            Some(Entry { value: Value::Hash(h), .. }) => {
                Ok(h.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            }
            Some(_) => Err(RedliteError::WrongType),
        }
    }

    pub fn hgetall(&self, key: &str) -> Result<Vec<(String, String)>> {
        Self::hgetall_locked(&mut self.inner.lock(), key)
    }

    pub fn hdel_locked(map: &mut Map, key: &str, fields: &[String]) -> Result<usize> {
        Self::evict_if_expired(map, key);
        match map.get_mut(key) {
            None => Ok(0),
            Some(Entry { value: Value::Hash(h), .. }) => {
                let mut removed = 0;
                for f in fields {
                    if h.remove(f).is_some() {
                        removed += 1;
                    }
                }
                Ok(removed)
            }
            Some(_) => Err(RedliteError::WrongType),
        }
    }

    pub fn hdel(&self, key: &str, fields: &[String]) -> Result<usize> {
        Self::hdel_locked(&mut self.inner.lock(), key, fields)
    }

    pub fn hlen_locked(map: &mut Map, key: &str) -> Result<usize> {
        Self::evict_if_expired(map, key);
        match map.get(key) {
            None => Ok(0),
            Some(Entry { value: Value::Hash(h), .. }) => Ok(h.len()),
            Some(_) => Err(RedliteError::WrongType),
        }
    }

    pub fn hlen(&self, key: &str) -> Result<usize> {
        Self::hlen_locked(&mut self.inner.lock(), key)
    }

    // ---- expiration ----

    /// `EXPIRE`/`PEXPIRE`: sets `expiry_at` to `now + millis`, or deletes
    /// the key immediately when `millis <= 0` (canonical Redis
    /// behavior). Returns whether the key existed.
    pub fn expire_millis_locked(map: &mut Map, key: &str, millis: i64) -> bool {
        Self::evict_if_expired(map, key);
        if !map.contains_key(key) {
            return false;
        }
        if millis <= 0 {
            map.remove(key);
            return true;
        }
        if let Some(entry) = map.get_mut(key) {
            entry.expiry_at = Some(SystemTime::now() + Duration::from_millis(millis as u64));
        }
        true
    }

    pub fn expire_millis(&self, key: &str, millis: i64) -> bool {
        Self::expire_millis_locked(&mut self.inner.lock(), key, millis)
    }

    fn remaining_locked(map: &mut Map, key: &str) -> Option<Duration> {
        Self::evict_if_expired(map, key);
        match map.get(key) {
            Some(Entry { expiry_at: Some(t), .. }) => {
                Some(t.duration_since(SystemTime::now()).unwrap_or(Duration::ZERO))
            }
            _ => None,
        }
    }

    /// -2 if the key is absent, -1 if present with no expiry.
    fn no_ttl_code_locked(map: &mut Map, key: &str) -> i64 {
        Self::evict_if_expired(map, key);
        if map.contains_key(key) {
            -1
        } else {
            -2
        }
    }

    pub fn ttl_secs_locked(map: &mut Map, key: &str) -> i64 {
        Self::remaining_locked(map, key)
            .map(|d| d.as_secs() as i64)
            .unwrap_or_else(|| Self::no_ttl_code_locked(map, key))
    }

    pub fn ttl_secs(&self, key: &str) -> i64 {
        Self::ttl_secs_locked(&mut self.inner.lock(), key)
    }

    pub fn pttl_millis_locked(map: &mut Map, key: &str) -> i64 {
        Self::remaining_locked(map, key)
            .map(|d| d.as_millis() as i64)
            .unwrap_or_else(|| Self::no_ttl_code_locked(map, key))
    }

    pub fn pttl_millis(&self, key: &str) -> i64 {
        Self::pttl_millis_locked(&mut self.inner.lock(), key)
    }

    pub fn persist_locked(map: &mut Map, key: &str) -> bool {
        Self::evict_if_expired(map, key);
        match map.get_mut(key) {
            Some(entry) if entry.expiry_at.is_some() => {
                entry.expiry_at = None;
                true
            }
            _ => false,
        }
    }

    pub fn persist(&self, key: &str) -> bool {
        Self::persist_locked(&mut self.inner.lock(), key)
    }

    /// The proactive sweep: a full scan under the lock, removing
    /// everything past its expiry. Returns how many were swept.
    pub fn sweep_expired(&self) -> usize {
        let mut map = self.inner.lock();
        let now = SystemTime::now();
        let before = map.len();
        map.retain(|_, entry| !entry.is_expired(now));
        before - map.len()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ---- persistence ----

    pub fn snapshot(&self) -> Map {
        let mut map = self.inner.lock();
        let now = SystemTime::now();
        map.retain(|_, e| !e.is_expired(now));
        map.clone()
    }

    pub fn restore(&self, entries: Map) {
        *self.inner.lock() = entries;
    }
}

impl Default for Keyspace {
    fn default() -> Self {
        Self::new()
    }
}

/// Does `name` (already uppercased) name a command that touches the
/// keyspace map directly? Used by the dispatcher to group a contiguous
/// run of an `EXEC` block's queued commands under one lock acquisition.
pub fn is_keyspace_command(name: &str) -> bool {
    matches!(
        name,
        "SET" | "GET" | "DELETE"
            | "LPUSH" | "RPUSH" | "LRANGE" | "LPOP" | "RPOP" | "LLEN" | "LINDEX" | "LSET"
            | "LREM" | "LTRIM"
            | "SADD" | "SISMEMBER" | "SREM" | "SCARD" | "SMEMBERS"
            | "HSET" | "HGET" | "HGETALL" | "HDEL" | "HLEN"
            | "EXPIRE" | "PEXPIRE" | "TTL" | "PTTL" | "PERSIST"
    )
}

/// Shared `LRANGE`/`LTRIM` index normalisation: resolves negative
/// indices, clamps to the list bounds, and signals "empty result" with
/// `None` (absent key, `start > stop`, or a zero-length list).
fn normalize_range(len: i64, start: i64, stop: i64) -> Option<(usize, usize)> {
    if len == 0 {
        return None;
    }
    let mut start = if start < 0 { start + len } else { start };
    let mut stop = if stop < 0 { stop + len } else { stop };
    if start < 0 {
        start = 0;
    }
    if stop > len - 1 {
        stop = len - 1;
    }
    if start > stop || start >= len {
        return None;
    }
    Some((start as usize, stop as usize))
}

/// `LREM`: head-first for `count > 0`, tail-first for `count < 0`, all
/// matches for `count == 0`. Preserves the order of surviving elements.
fn remove_from_list(list: &mut VecDeque<String>, count: i64, element: &str) -> i64 {
    let mut removed = 0i64;
    if count == 0 {
        let before = list.len();
        list.retain(|v| v != element);
        removed = (before - list.len()) as i64;
    } else if count > 0 {
        let mut kept = VecDeque::with_capacity(list.len());
        for v in list.drain(..) {
            if removed < count && v == element {
                removed += 1;
                continue;
            }
            kept.push_back(v);
        }
        *list = kept;
    } else {
        let target = -count;
        let mut kept = VecDeque::with_capacity(list.len());
        for v in list.drain(..).rev() {
            if removed < target && v == element {
                removed += 1;
                continue;
            }
            kept.push_front(v);
        }
        *list = kept;
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_set_get() {
        let db = Keyspace::new();
        db.set("k", "v".to_string(), None);
        assert_eq!(db.get("k").unwrap(), Some("v".to_string()));
    }

    #[test]
    fn idempotent_delete() {
        let db = Keyspace::new();
        db.set("k", "v".to_string(), None);
        assert!(db.delete("k"));
        assert!(!db.delete("k"));
    }

    #[test]
    fn type_exclusivity() {
        let db = Keyspace::new();
        db.set("k", "v".to_string(), None);
        assert!(matches!(db.lpush("k", &["x".to_string()]), Err(RedliteError::WrongType)));
        assert!(matches!(db.sadd("k", &["x".to_string()]), Err(RedliteError::WrongType)));
        assert!(matches!(
            db.hset("k", &[("f".to_string(), "v".to_string())]),
            Err(RedliteError::WrongType)
        ));
    }

    #[test]
    fn lpush_and_rpush_laws() {
        let db = Keyspace::new();
        db.lpush("l", &["a".to_string(), "b".to_string(), "c".to_string()]).unwrap();
        assert_eq!(db.lrange("l", 0, -1).unwrap(), vec!["c", "b", "a"]);

        db.rpush("m", &["a".to_string(), "b".to_string(), "c".to_string()]).unwrap();
        assert_eq!(db.lrange("m", 0, -1).unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn lrange_negative_indices() {
        let db = Keyspace::new();
        db.rpush("l", &["a".to_string(), "b".to_string(), "c".to_string(), "d".to_string()]).unwrap();
        assert_eq!(db.lrange("l", 1, -2).unwrap(), vec!["b", "c"]);
    }

    #[test]
    fn lrem_counts() {
        let db = Keyspace::new();
        let values = vec!["a", "b", "a", "c", "a"].into_iter().map(String::from).collect::<Vec<_>>();
        db.rpush("l", &values).unwrap();
        let removed = db.lrem("l", 0, "a").unwrap();
        assert_eq!(removed, 3);
        assert_eq!(db.lrange("l", 0, -1).unwrap(), vec!["b", "c"]);
    }

    #[test]
    fn lrem_head_first_positive_count() {
        let db = Keyspace::new();
        let values = vec!["a", "b", "a", "c", "a"].into_iter().map(String::from).collect::<Vec<_>>();
        db.rpush("l", &values).unwrap();
        let removed = db.lrem("l", 1, "a").unwrap();
        assert_eq!(removed, 1);
        assert_eq!(db.lrange("l", 0, -1).unwrap(), vec!["b", "a", "c", "a"]);
    }

    #[test]
    fn lrem_tail_first_negative_count() {
        let db = Keyspace::new();
        let values = vec!["a", "b", "a", "c"].into_iter().map(String::from).collect::<Vec<_>>();
        db.rpush("l", &values).unwrap();
        let removed = db.lrem("l", -1, "a").unwrap();
        assert_eq!(removed, 1);
        assert_eq!(db.lrange("l", 0, -1).unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn expiry_monotonicity() {
        let db = Keyspace::new();
        db.set("k", "v".to_string(), Some(Duration::from_millis(50)));
        assert_eq!(db.get("k").unwrap(), Some("v".to_string()));
        std::thread::sleep(Duration::from_millis(80));
        assert_eq!(db.get("k").unwrap(), None);
        assert_eq!(db.ttl_secs("k"), -2);
    }

    #[test]
    fn srem_returns_count_not_constant() {
        let db = Keyspace::new();
        db.sadd("s", &["a".to_string(), "b".to_string(), "c".to_string()]).unwrap();
        let removed = db.srem("s", &["a".to_string(), "b".to_string(), "zzz".to_string()]).unwrap();
        assert_eq!(removed, 2);
    }

    #[test]
    fn lset_out_of_range_is_an_error() {
        let db = Keyspace::new();
        db.rpush("l", &["a".to_string()]).unwrap();
        assert!(db.lset("l", 5, "x".to_string()).is_err());
    }

    #[test]
    fn ltrim_empties_remove_the_key() {
        let db = Keyspace::new();
        db.rpush("l", &["a".to_string(), "b".to_string()]).unwrap();
        db.ltrim("l", 5, 10).unwrap();
        assert_eq!(db.llen("l").unwrap(), 0);
    }

    #[test]
    fn sweep_removes_expired_entries() {
        let db = Keyspace::new();
        db.set("k", "v".to_string(), Some(Duration::from_millis(10)));
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(db.sweep_expired(), 1);
        assert_eq!(db.len(), 0);
    }

    #[test]
    fn persist_clears_expiry() {
        let db = Keyspace::new();
        db.set("k", "v".to_string(), Some(Duration::from_secs(100)));
        assert!(db.persist("k"));
        assert_eq!(db.ttl_secs("k"), -1);
        assert!(!db.persist("k"));
    }
}
