//! Thread-Safe Value Store
//!
//! This module implements the in-memory key-value store behind every command.
//! Keys and values are both strings; integers are kept as their decimal text.
//!
//! ## Concurrency Model
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │               Store                 │
//! │  ┌───────────────────────────────┐  │
//! │  │ RwLock<HashMap<String,String>>│  │
//! │  └───────────────────────────────┘  │
//! └─────────────────────────────────────┘
//! ```
//!
//! One lock guards the whole map. Reads share it; writes, conditional sets and
//! the numeric read-modify-write each run under a single write guard, so
//! concurrent connections never observe a half-applied command.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;

/// Errors returned by store operations that interpret values.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// The stored value is not a decimal integer, or the result does not fit in 64 bits
    #[error("value is not an integer or out of range")]
    NotAnInteger,
}

/// When a conditional SET is allowed to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetCondition {
    /// Always write (plain SET)
    Always,
    /// Write only if the key is absent (NX)
    IfAbsent,
    /// Write only if the key is present (XX)
    IfPresent,
}

/// Snapshot of store counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StorageStats {
    pub keys: u64,
    pub get_ops: u64,
    pub set_ops: u64,
    pub del_ops: u64,
    pub incr_ops: u64,
}

/// The in-memory key-value store.
///
/// Created once by the server and shared with every connection through an
/// `Arc`. Tests build a fresh one per case.
///
/// # Example
///
/// ```
/// use respkv::storage::Store;
///
/// let store = Store::new();
///
/// store.set("name", "Ariz");
/// assert_eq!(store.get("name"), Some("Ariz".to_string()));
///
/// assert_eq!(store.incr_by("hits", 5), Ok(5));
/// assert_eq!(store.get("hits"), Some("5".to_string()));
/// ```
#[derive(Debug, Default)]
pub struct Store {
    data: RwLock<HashMap<String, String>>,

    get_count: AtomicU64,
    set_count: AtomicU64,
    del_count: AtomicU64,
    incr_count: AtomicU64,
}

impl Store {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // Poisoning is ignored; every mutation is a single HashMap call.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, String>> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, String>> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Gets the value for a key.
    pub fn get(&self, key: &str) -> Option<String> {
        self.get_count.fetch_add(1, Ordering::Relaxed);
        self.read().get(key).cloned()
    }

    /// Sets a key-value pair, overwriting any previous value.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.set_with_condition(key, value, SetCondition::Always);
    }

    /// Sets a key-value pair if `condition` holds.
    ///
    /// The existence check and the write happen under the same lock.
    ///
    /// # Returns
    ///
    /// Returns `true` if the value was written.
    pub fn set_with_condition(
        &self,
        key: impl Into<String>,
        value: impl Into<String>,
        condition: SetCondition,
    ) -> bool {
        let key = key.into();
        let mut data = self.write();

        let allowed = match condition {
            SetCondition::Always => true,
            SetCondition::IfAbsent => !data.contains_key(&key),
            SetCondition::IfPresent => data.contains_key(&key),
        };

        if allowed {
            self.set_count.fetch_add(1, Ordering::Relaxed);
            data.insert(key, value.into());
        }

        allowed
    }

    /// Deletes a key.
    ///
    /// # Returns
    ///
    /// Returns `true` if the key existed.
    pub fn delete(&self, key: &str) -> bool {
        self.del_count.fetch_add(1, Ordering::Relaxed);
        self.write().remove(key).is_some()
    }

    /// Deletes several keys and returns how many were actually removed.
    ///
    /// A key listed twice is only counted once, since the second removal
    /// finds nothing.
    pub fn delete_many<S: AsRef<str>>(&self, keys: &[S]) -> u64 {
        let mut data = self.write();
        let mut deleted = 0;
        for key in keys {
            let key: &str = key.as_ref();
            self.del_count.fetch_add(1, Ordering::Relaxed);
            if data.remove(key).is_some() {
                deleted += 1;
            }
        }
        deleted
    }

    /// Checks if a key exists.
    pub fn exists(&self, key: &str) -> bool {
        self.read().contains_key(key)
    }

    /// Counts how many of the given keys exist. Duplicates are counted each time.
    pub fn exists_many<S: AsRef<str>>(&self, keys: &[S]) -> u64 {
        let data = self.read();
        keys.iter()
            .filter(|key| {
                let key: &str = key.as_ref();
                data.contains_key(key)
            })
            .count() as u64
    }

    /// Adds `delta` to the integer stored at `key`.
    ///
    /// An absent key takes `delta` itself as its new value. A present key must
    /// hold a decimal integer (optional leading `-`, then digits) that fits in
    /// an `i64`, and the sum must not overflow; otherwise the key is left
    /// untouched and [`StoreError::NotAnInteger`] is returned.
    pub fn incr_by(&self, key: &str, delta: i64) -> Result<i64, StoreError> {
        self.incr_count.fetch_add(1, Ordering::Relaxed);
        let mut data = self.write();

        let new_value = match data.get(key) {
            Some(current) => parse_integer(current)
                .and_then(|n| n.checked_add(delta))
                .ok_or(StoreError::NotAnInteger)?,
            None => delta,
        };

        data.insert(key.to_string(), new_value.to_string());
        Ok(new_value)
    }

    /// Returns the number of keys in the store.
    pub fn len(&self) -> u64 {
        self.read().len() as u64
    }

    /// Returns true if the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Returns store statistics.
    pub fn stats(&self) -> StorageStats {
        StorageStats {
            keys: self.len(),
            get_ops: self.get_count.load(Ordering::Relaxed),
            set_ops: self.set_count.load(Ordering::Relaxed),
            del_ops: self.del_count.load(Ordering::Relaxed),
            incr_ops: self.incr_count.load(Ordering::Relaxed),
        }
    }
}

/// Checks the integer literal shape: an optional single `-` followed by one or
/// more ASCII digits. Nothing else is accepted, not even a leading `+`.
pub fn is_integer_literal(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Parses an integer literal into an `i64`.
///
/// Returns `None` if `s` is not an integer literal or does not fit.
pub fn parse_integer(s: &str) -> Option<i64> {
    if !is_integer_literal(s) {
        return None;
    }
    s.parse().ok()
}
