//! Settings registry
//!
//! Process-wide singleton holding the enable flag and the earn rate.
//! Explicitly constructed and injected into the ledger; writers are
//! serialized by an internal lock.

use crate::{
    storage::Storage,
    types::{Settings, SettingsPatch},
    Result,
};
use parking_lot::RwLock;
use std::sync::Arc;

/// Registry for the loyalty program settings singleton
pub struct SettingsRegistry {
    storage: Arc<Storage>,
    inner: RwLock<Settings>,
}

impl SettingsRegistry {
    /// Load the stored settings, falling back to `defaults` before the
    /// first write
    pub fn load(storage: Arc<Storage>, defaults: Settings) -> Result<Self> {
        let current = storage.load_settings()?.unwrap_or(defaults);

        Ok(Self {
            storage,
            inner: RwLock::new(current),
        })
    }

    /// Current settings
    pub fn current(&self) -> Settings {
        *self.inner.read()
    }

    /// Merge a patch and persist.
    ///
    /// No numeric validation: a zero or negative rate is accepted and
    /// makes earning grant zero or negative points.
    pub fn update(&self, patch: SettingsPatch) -> Result<Settings> {
        let mut guard = self.inner.write();

        let mut next = *guard;
        if let Some(enabled) = patch.enabled {
            next.enabled = enabled;
        }
        if let Some(rate) = patch.rate_per_euro {
            next.rate_per_euro = rate;
        }

        // Persist before committing so memory never runs ahead of disk
        self.storage.put_settings(&next)?;
        *guard = next;

        tracing::info!(
            enabled = next.enabled,
            rate_per_euro = next.rate_per_euro,
            "Settings updated"
        );

        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;
    use tempfile::TempDir;

    fn test_registry() -> (SettingsRegistry, Arc<Storage>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.data_dir = temp_dir.path().to_path_buf();

        let storage = Arc::new(Storage::open(&config).unwrap());
        let registry = SettingsRegistry::load(storage.clone(), Settings::default()).unwrap();
        (registry, storage, temp_dir)
    }

    #[test]
    fn test_defaults_before_first_write() {
        let (registry, _storage, _temp) = test_registry();

        let settings = registry.current();
        assert!(settings.enabled);
        assert_eq!(settings.rate_per_euro, 10);
    }

    #[test]
    fn test_update_merges_and_persists() {
        let (registry, storage, _temp) = test_registry();

        let updated = registry
            .update(SettingsPatch {
                enabled: Some(false),
                rate_per_euro: None,
            })
            .unwrap();

        assert!(!updated.enabled);
        assert_eq!(updated.rate_per_euro, 10);

        // Stored record wins over defaults on reload
        let reloaded = SettingsRegistry::load(storage, Settings::default()).unwrap();
        assert!(!reloaded.current().enabled);
    }

    #[test]
    fn test_zero_and_negative_rates_accepted() {
        let (registry, _storage, _temp) = test_registry();

        let updated = registry
            .update(SettingsPatch {
                enabled: None,
                rate_per_euro: Some(0),
            })
            .unwrap();
        assert_eq!(updated.rate_per_euro, 0);

        let updated = registry
            .update(SettingsPatch {
                enabled: None,
                rate_per_euro: Some(-3),
            })
            .unwrap();
        assert_eq!(updated.rate_per_euro, -3);
    }
}
