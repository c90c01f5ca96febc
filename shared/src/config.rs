use crate::TtlMinutes;
use tracing::{info, warn};

pub struct StoreConfig {
    pub data_dir: String,
    pub tree: String,
    pub default_ttl: Option<TtlMinutes>,
}

impl StoreConfig {
    const DEFAULT_DATA_DIR: &str = "./data";
    const DEFAULT_TREE: &str = "stash";

    /// Load a `.env` file if one is present, then read the environment.
    pub fn load() -> Self {
        match dotenvy::dotenv() {
            Ok(path) => info!("Loaded environment variables from {}", path.display()),
            Err(_) => info!("No .env file found, using system environment variables"),
        }
        Self::from_env()
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let default_ttl = lookup("STASH_DEFAULT_TTL_MINUTES").and_then(|raw| {
            match raw.trim().parse::<f64>().map(TtlMinutes) {
                Ok(ttl) if ttl.is_positive() => Some(ttl),
                _ => {
                    warn!("Ignoring invalid STASH_DEFAULT_TTL_MINUTES value '{}'", raw);
                    None
                }
            }
        });

        Self {
            data_dir: lookup("STASH_DATA_DIR").unwrap_or_else(|| Self::DEFAULT_DATA_DIR.to_string()),
            tree: lookup("STASH_TREE").unwrap_or_else(|| Self::DEFAULT_TREE.to_string()),
            default_ttl,
        }
    }

    pub fn db_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.data_dir).join("stash.sled")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = StoreConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config.data_dir, "./data");
        assert_eq!(config.tree, "stash");
        assert!(config.default_ttl.is_none());
        assert!(config.db_path().ends_with("stash.sled"));
    }

    #[test]
    fn test_overrides() {
        let config = StoreConfig::from_lookup(lookup_from(&[
            ("STASH_DATA_DIR", "/tmp/stash"),
            ("STASH_TREE", "prefs"),
            ("STASH_DEFAULT_TTL_MINUTES", "15"),
        ]));
        assert_eq!(config.data_dir, "/tmp/stash");
        assert_eq!(config.tree, "prefs");
        assert_eq!(config.default_ttl, Some(TtlMinutes(15.0)));
    }

    #[test]
    fn test_load_falls_back_to_environment() {
        let config = StoreConfig::load();
        assert!(!config.data_dir.is_empty());
    }

    #[test]
    fn test_invalid_default_ttl_is_ignored() {
        for raw in ["abc", "0", "-5", "inf"] {
            let config =
                StoreConfig::from_lookup(lookup_from(&[("STASH_DEFAULT_TTL_MINUTES", raw)]));
            assert!(config.default_ttl.is_none(), "accepted {}", raw);
        }
    }
}
