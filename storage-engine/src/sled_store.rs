use shared::config::StoreConfig;
use shared::{Error, Result};
use stash::KeyValueStore;
use std::path::Path;
use tracing::info;

/// Durable string store backed by a single sled tree
#[derive(Clone)]
pub struct SledStore {
    db: sled::Db,
    tree: sled::Tree,
}

impl SledStore {
    /// Open the database at `path` and the named tree inside it.
    /// Creates the parent directory if it doesn't exist.
    pub fn open(path: impl AsRef<Path>, tree_name: &str) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Store(format!("Failed to create directory: {}", e)))?;
        }

        let db = sled::open(path)
            .map_err(|e| Error::Store(format!("Failed to open Sled database: {}", e)))?;
        let tree = db
            .open_tree(tree_name)
            .map_err(|e| Error::Store(format!("Failed to open tree '{}': {}", tree_name, e)))?;

        info!(path = %path.display(), tree = tree_name, entries = tree.len(), "opened sled store");
        Ok(Self { db, tree })
    }

    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        Self::open(config.db_path(), &config.tree)
    }

    fn flush(&self) -> Result<()> {
        self.tree
            .flush()
            .map_err(|e| Error::Store(format!("Failed to flush database: {}", e)))?;
        Ok(())
    }

    /// Size of the database on disk, including sled's own overhead
    pub fn size_on_disk(&self) -> Result<u64> {
        self.db
            .size_on_disk()
            .map_err(|e| Error::Store(format!("Failed to read database size: {}", e)))
    }
}

fn utf8(bytes: &[u8], what: &str) -> Result<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|_| Error::Store(format!("Stored {} is not valid UTF-8", what)))
}

impl KeyValueStore for SledStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .tree
            .get(key.as_bytes())
            .map_err(|e| Error::Store(format!("Failed to get '{}': {}", key, e)))?;

        value.map(|bytes| utf8(&bytes, "value")).transpose()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.tree
            .insert(key.as_bytes(), value.as_bytes())
            .map_err(|e| Error::Store(format!("Failed to save '{}': {}", key, e)))?;
        self.flush()
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.tree
            .remove(key.as_bytes())
            .map_err(|e| Error::Store(format!("Failed to delete '{}': {}", key, e)))?;
        self.flush()
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();

        for result in self.tree.iter().keys() {
            let key = result.map_err(|e| Error::Store(format!("Failed to iterate database: {}", e)))?;
            keys.push(utf8(&key, "key")?);
        }

        Ok(keys)
    }

    fn clear(&self) -> Result<()> {
        self.tree
            .clear()
            .map_err(|e| Error::Store(format!("Failed to clear tree: {}", e)))?;
        self.flush()
    }
}

impl std::fmt::Debug for SledStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SledStore")
            .field("tree", &String::from_utf8_lossy(&self.tree.name()))
            .field("entries", &self.tree.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sled_store_set_get_delete() {
        let temp_dir = TempDir::new().unwrap();
        let store = SledStore::open(temp_dir.path().join("test.sled"), "stash").unwrap();

        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "v1").unwrap();
        store.set("k", "v2").unwrap();
        assert_eq!(store.get("k").unwrap(), Some("v2".to_string()));

        store.delete("k").unwrap();
        store.delete("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn test_sled_store_keys_and_clear() {
        let temp_dir = TempDir::new().unwrap();
        let store = SledStore::open(temp_dir.path().join("test.sled"), "stash").unwrap();

        store.set("b", "2").unwrap();
        store.set("a", "1").unwrap();
        // sled enumerates in key order
        assert_eq!(store.keys().unwrap(), vec!["a", "b"]);

        store.clear().unwrap();
        assert!(store.keys().unwrap().is_empty());
    }

    #[test]
    fn test_trees_are_isolated() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test.sled");
        let prefs = SledStore::open(&path, "prefs").unwrap();
        let other = SledStore {
            db: prefs.db.clone(),
            tree: prefs.db.open_tree("other").unwrap(),
        };

        prefs.set("k", "prefs").unwrap();
        other.set("k", "other").unwrap();
        prefs.clear().unwrap();

        assert_eq!(prefs.get("k").unwrap(), None);
        assert_eq!(other.get("k").unwrap(), Some("other".to_string()));
    }

    #[test]
    fn test_non_utf8_value_is_a_store_fault() {
        let temp_dir = TempDir::new().unwrap();
        let store = SledStore::open(temp_dir.path().join("test.sled"), "stash").unwrap();
        store.tree.insert("bin", &[0xff, 0xfe][..]).unwrap();

        let err = store.get("bin").unwrap_err();
        assert_eq!(err.kind(), shared::FailureKind::StoreFault);
    }

    #[test]
    fn test_from_config_creates_data_dir() {
        let temp_dir = TempDir::new().unwrap();
        let config = StoreConfig {
            data_dir: temp_dir.path().join("nested").display().to_string(),
            tree: "stash".to_string(),
            default_ttl: None,
        };

        let store = SledStore::from_config(&config).unwrap();
        store.set("k", "v").unwrap();
        assert!(temp_dir.path().join("nested").exists());
        assert!(store.size_on_disk().unwrap() > 0);
    }
}
