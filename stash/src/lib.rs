pub mod clock;
pub mod domain;
pub mod facade;
pub mod memory;
pub mod ports;

// Re-export commonly used types
pub use clock::{ManualClock, SystemClock, format_utc_time};
pub use domain::{EntryInfo, StoredEntry};
pub use facade::ExpiringStore;
pub use memory::MemoryStore;
pub use ports::{Clock, KeyValueStore};
pub use shared::{Error, FailureKind, Result, TtlMinutes};
