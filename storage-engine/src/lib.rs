pub mod sled_store;

pub use sled_store::SledStore;

use shared::Result;
use shared::config::StoreConfig;
use stash::ExpiringStore;

/// Open the sled store described by `config` behind an expiring facade,
/// applying the configured default TTL.
pub fn open_expiring_store(config: &StoreConfig) -> Result<ExpiringStore<SledStore>> {
    let store = SledStore::from_config(config)?;
    Ok(ExpiringStore::new(store).with_default_ttl(config.default_ttl))
}
