//! Runtime store configuration.

use std::path::PathBuf;
use udmf_storage::{KvManagerConfig, SecurityFlag, SecurityLevel, SecurityOption, StoreOptions};

/// Physical root directory shared by every runtime store.
pub const DEFAULT_BASE_DIR: &str = "/data/service/el1/public/database/distributeddata/kvdb";

/// App identity the runtime stores are opened under.
pub const DEFAULT_APP_ID: &str = "distributeddata";

/// User identity the runtime stores are opened under.
pub const DEFAULT_USER_ID: &str = "default";

/// Configuration for opening a runtime store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Root directory; each store id gets its own sub-directory.
    pub base_dir: PathBuf,

    /// App identity.
    pub app_id: String,

    /// User identity.
    pub user_id: String,

    /// Whether to create the store if it doesn't exist.
    pub create_if_missing: bool,

    /// Whether the store lives in memory only.
    pub memory_db: bool,

    /// Whether the store directory is named by store id only.
    pub create_dir_by_store_id_only: bool,

    /// Whether the store is encrypted at rest.
    pub encrypted: bool,

    /// Whether a corrupted log tail is dropped on open.
    pub remove_corrupted: bool,

    /// Whether sync uses (user, app) tuples.
    pub sync_dual_tuple_mode: bool,

    /// Security label.
    pub security: SecurityOption,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from(DEFAULT_BASE_DIR),
            app_id: DEFAULT_APP_ID.to_string(),
            user_id: DEFAULT_USER_ID.to_string(),
            create_if_missing: true,
            memory_db: false,
            create_dir_by_store_id_only: true,
            encrypted: false,
            remove_corrupted: true,
            sync_dual_tuple_mode: true,
            security: SecurityOption {
                level: SecurityLevel::S2,
                flag: SecurityFlag::Ece,
            },
        }
    }
}

impl StoreConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the root directory.
    #[must_use]
    pub fn base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    /// Sets whether the store lives in memory only.
    #[must_use]
    pub const fn memory_db(mut self, value: bool) -> Self {
        self.memory_db = value;
        self
    }

    /// Sets whether to create the store if missing.
    #[must_use]
    pub const fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    /// Sets whether a corrupted log tail is dropped on open.
    #[must_use]
    pub const fn remove_corrupted(mut self, value: bool) -> Self {
        self.remove_corrupted = value;
        self
    }

    /// Returns the manager-wide configuration.
    #[must_use]
    pub fn manager_config(&self) -> KvManagerConfig {
        KvManagerConfig::new(self.base_dir.clone())
    }

    /// Returns the options used to open the store.
    #[must_use]
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            create_if_missing: self.create_if_missing,
            memory_db: self.memory_db,
            create_dir_by_store_id_only: self.create_dir_by_store_id_only,
            encrypted: self.encrypted,
            remove_corrupted: self.remove_corrupted,
            sync_dual_tuple_mode: self.sync_dual_tuple_mode,
            security: self.security,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.base_dir, PathBuf::from(DEFAULT_BASE_DIR));
        assert_eq!(config.app_id, "distributeddata");

        let options = config.store_options();
        assert!(options.create_if_missing);
        assert!(!options.memory_db);
        assert!(options.create_dir_by_store_id_only);
        assert!(!options.encrypted);
        assert!(options.remove_corrupted);
        assert!(options.sync_dual_tuple_mode);
        assert_eq!(options.security.level, SecurityLevel::S2);
        assert_eq!(options.security.flag, SecurityFlag::Ece);
    }

    #[test]
    fn builder_pattern() {
        let config = StoreConfig::new()
            .base_dir("/tmp/udmf")
            .memory_db(true)
            .create_if_missing(false);

        assert_eq!(config.manager_config().base_dir, PathBuf::from("/tmp/udmf"));
        assert!(config.store_options().memory_db);
        assert!(!config.store_options().create_if_missing);
    }
}
