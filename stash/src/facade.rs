use crate::clock::{SystemClock, format_utc_time};
use crate::domain::{EntryInfo, StoredEntry};
use crate::ports::{Clock, KeyValueStore};
use serde::Serialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde_json::Value;
use shared::{Error, FailureKind, Result, TtlMinutes};
use tracing::{debug, error, warn};

/// What a read found under a key
enum Lookup<T> {
    Missing,
    Stale,
    Live(StoredEntry<T>),
}

/// Typed get/set/delete over a raw string store, with lazy expiration.
///
/// Every plain operation is total: faults are logged and turned into the
/// operation's default (`false`, the fallback, an empty list, `0` or `None`).
/// The `try_*` variants return the underlying [`Error`] instead.
///
/// The facade keeps no state between calls; everything lives in the store.
pub struct ExpiringStore<S, C = SystemClock> {
    store: S,
    clock: C,
    default_ttl: Option<TtlMinutes>,
}

impl<S: KeyValueStore> ExpiringStore<S, SystemClock> {
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: KeyValueStore, C: Clock> ExpiringStore<S, C> {
    pub fn with_clock(store: S, clock: C) -> Self {
        Self {
            store,
            clock,
            default_ttl: None,
        }
    }

    /// TTL applied to writes that do not pass one
    pub fn with_default_ttl(mut self, ttl: Option<TtlMinutes>) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Store `value` under `key`, replacing whatever was there.
    pub fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Option<TtlMinutes>) -> bool {
        match self.try_write(key, value, ttl) {
            Ok(()) => true,
            Err(err) => {
                report("write", key, &err);
                false
            }
        }
    }

    pub fn try_write<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<TtlMinutes>,
    ) -> Result<()> {
        let ttl = ttl.or(self.default_ttl);
        if let Some(ttl) = ttl.filter(|ttl| !ttl.is_encodable()) {
            return Err(Error::InvalidTtl(ttl.0));
        }

        // Encode the whole record before touching the store
        let entry = StoredEntry::new(value, self.clock.now_ms(), ttl);
        let raw = serde_json::to_string(&entry).map_err(|e| Error::Serialization(e.to_string()))?;

        self.store.set(key, &raw)?;
        let ttl_minutes = ttl.map(|ttl| ttl.0);
        debug!(key = %key, ttl_minutes = ?ttl_minutes, "stored entry");
        Ok(())
    }

    /// The live value under `key`, or `fallback` when it is missing, stale,
    /// unreadable or the store fails. A stale entry is deleted on the way.
    pub fn read<T: DeserializeOwned>(&self, key: &str, fallback: Option<T>) -> Option<T> {
        match self.try_read(key) {
            Ok(Some(value)) => Some(value),
            Ok(None) => fallback,
            Err(err) => {
                report("read", key, &err);
                fallback
            }
        }
    }

    pub fn try_read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.lookup(key)? {
            Lookup::Missing => Ok(None),
            Lookup::Stale => {
                debug!(key = %key, "entry expired, removing");
                self.remove(key);
                Ok(None)
            }
            Lookup::Live(entry) => Ok(Some(entry.value)),
        }
    }

    /// Delete `key`. Succeeds whether or not the key was present.
    pub fn remove(&self, key: &str) -> bool {
        match self.try_remove(key) {
            Ok(()) => true,
            Err(err) => {
                report("remove", key, &err);
                false
            }
        }
    }

    pub fn try_remove(&self, key: &str) -> Result<()> {
        self.store.delete(key)
    }

    /// Delete every key in the store
    pub fn clear_all(&self) -> bool {
        match self.try_clear_all() {
            Ok(()) => true,
            Err(err) => {
                error!(error = %err, "failed to clear store");
                false
            }
        }
    }

    pub fn try_clear_all(&self) -> Result<()> {
        self.store.clear()
    }

    pub fn list_keys(&self) -> Vec<String> {
        self.try_list_keys().unwrap_or_else(|err| {
            error!(error = %err, "failed to list keys");
            Vec::new()
        })
    }

    pub fn try_list_keys(&self) -> Result<Vec<String>> {
        self.store.keys()
    }

    /// True when `key` holds a live, readable, non-null value.
    ///
    /// A stored JSON `null` therefore reads as absent. Like `read`, this
    /// deletes a stale entry.
    pub fn exists(&self, key: &str) -> bool {
        self.read::<Option<IgnoredAny>>(key, None).flatten().is_some()
    }

    /// Minutes left before `key` expires. `None` when the key is missing,
    /// unreadable or has no TTL. Never deletes anything.
    pub fn remaining_ttl_minutes(&self, key: &str) -> Option<u64> {
        self.try_remaining_ttl_minutes(key).unwrap_or_else(|err| {
            report("remaining ttl", key, &err);
            None
        })
    }

    pub fn try_remaining_ttl_minutes(&self, key: &str) -> Result<Option<u64>> {
        let Some(raw) = self.fetch_raw(key)? else {
            return Ok(None);
        };
        let entry = decode::<IgnoredAny>(&raw)?;
        Ok(entry.remaining_minutes_at(self.clock.now_ms()))
    }

    /// Record metadata for `key`, stale or not. Never deletes anything.
    pub fn describe(&self, key: &str) -> Option<EntryInfo> {
        self.try_describe(key).unwrap_or_else(|err| {
            report("describe", key, &err);
            None
        })
    }

    pub fn try_describe(&self, key: &str) -> Result<Option<EntryInfo>> {
        let Some(raw) = self.fetch_raw(key)? else {
            return Ok(None);
        };
        let entry = decode::<IgnoredAny>(&raw)?;

        Ok(Some(EntryInfo {
            written_at_ms: entry.written_at,
            written_at_utc: format_utc_time(entry.written_at),
            ttl_minutes: entry.ttl(),
            expires_at_ms: entry.expires_at_ms().map(|at| at as u64),
            expired: !entry.is_live_at(self.clock.now_ms()),
            size_bytes: raw.len() as u64,
        }))
    }

    /// Sum of the UTF-8 length of every raw record. Store overhead is not
    /// counted.
    pub fn total_size_bytes(&self) -> u64 {
        self.try_total_size_bytes().unwrap_or_else(|err| {
            error!(error = %err, "failed to measure store size");
            0
        })
    }

    pub fn try_total_size_bytes(&self) -> Result<u64> {
        let mut total = 0;
        for key in self.try_list_keys()? {
            if let Some(raw) = self.store.get(&key)? {
                total += raw.len() as u64;
            }
        }
        Ok(total)
    }

    fn fetch_raw(&self, key: &str) -> Result<Option<String>> {
        Ok(self.store.get(key)?.filter(|raw| !raw.is_empty()))
    }

    fn lookup<T: DeserializeOwned>(&self, key: &str) -> Result<Lookup<T>> {
        let Some(raw) = self.fetch_raw(key)? else {
            return Ok(Lookup::Missing);
        };
        // Liveness only needs the envelope; a stale record is dropped
        // whatever its value looks like
        let entry = decode::<Value>(&raw)?;
        if !entry.is_live_at(self.clock.now_ms()) {
            return Ok(Lookup::Stale);
        }

        let value = serde_json::from_value(entry.value)
            .map_err(|e| Error::Deserialization(e.to_string()))?;
        Ok(Lookup::Live(StoredEntry {
            value,
            written_at: entry.written_at,
            ttl_minutes: entry.ttl_minutes,
        }))
    }
}

fn decode<T: DeserializeOwned>(raw: &str) -> Result<StoredEntry<T>> {
    serde_json::from_str(raw).map_err(|e| Error::Deserialization(e.to_string()))
}

fn report(op: &str, key: &str, err: &Error) {
    match err.kind() {
        FailureKind::Deserialization => warn!(key = %key, error = %err, "{} failed: corrupt record", op),
        FailureKind::Serialization | FailureKind::StoreFault => {
            error!(key = %key, error = %err, "{} failed", op)
        }
    }
}
