use serde::{Deserialize, Serialize};
use shared::TtlMinutes;

/// The record persisted under each key.
///
/// Field names follow the JSON record format. The `timestamp` and
/// `expirationInMinutes` aliases keep records from the first wrapper version
/// readable. Unknown fields are ignored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredEntry<T> {
    pub value: T,
    #[serde(alias = "timestamp")]
    pub written_at: u64,
    #[serde(default, alias = "expirationInMinutes")]
    pub ttl_minutes: Option<f64>,
}

impl<T> StoredEntry<T> {
    pub fn new(value: T, written_at: u64, ttl: Option<TtlMinutes>) -> Self {
        Self {
            value,
            written_at,
            ttl_minutes: ttl.map(|ttl| ttl.0),
        }
    }

    /// The TTL that actually applies. Zero means the entry never expires;
    /// a negative TTL is already past.
    pub fn ttl(&self) -> Option<TtlMinutes> {
        self.ttl_minutes.map(TtlMinutes).filter(TtlMinutes::expires)
    }

    pub fn expires_at_ms(&self) -> Option<f64> {
        self.ttl().map(|ttl| self.written_at as f64 + ttl.as_ms())
    }

    pub fn is_live_at(&self, now_ms: u64) -> bool {
        match self.expires_at_ms() {
            Some(expires_at) => now_ms as f64 <= expires_at,
            None => true,
        }
    }

    /// Whole minutes left before expiry, rounded, never below zero
    pub fn remaining_minutes_at(&self, now_ms: u64) -> Option<u64> {
        self.expires_at_ms().map(|expires_at| {
            let remaining = (expires_at - now_ms as f64) / TtlMinutes::MS_PER_MINUTE;
            if remaining > 0.0 {
                remaining.round() as u64
            } else {
                0
            }
        })
    }
}

/// Metadata about a stored record, as seen at a given instant
#[derive(Clone, Debug, PartialEq)]
pub struct EntryInfo {
    pub written_at_ms: u64,
    pub written_at_utc: String,
    pub ttl_minutes: Option<TtlMinutes>,
    pub expires_at_ms: Option<u64>,
    pub expired: bool,
    pub size_bytes: u64,
}
