//! Configuration for the loyalty ledger

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Ledger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory for RocksDB
    pub data_dir: PathBuf,

    /// Service name
    pub service_name: String,

    /// RocksDB configuration
    pub rocksdb: RocksDbConfig,

    /// Program defaults, used only when the store holds no settings yet
    pub program: ProgramConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data/loyalty"),
            service_name: "loyalty-core".to_string(),
            rocksdb: RocksDbConfig::default(),
            program: ProgramConfig::default(),
        }
    }
}

/// RocksDB configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RocksDbConfig {
    /// Write buffer size (MB)
    pub write_buffer_size_mb: usize,

    /// Max write buffers
    pub max_write_buffer_number: i32,

    /// Max background jobs (compaction + flush)
    pub max_background_jobs: i32,
}

impl Default for RocksDbConfig {
    fn default() -> Self {
        Self {
            write_buffer_size_mb: 64,
            max_write_buffer_number: 2,
            max_background_jobs: 2,
        }
    }
}

/// Program defaults seeding the settings record on first start
///
/// A stored settings record always wins over these values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramConfig {
    /// Earning enabled
    pub enabled: bool,

    /// Points granted per whole currency unit spent
    pub rate_per_euro: i64,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            rate_per_euro: 10,
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(data_dir) = std::env::var("LOYALTY_DATA_DIR") {
            config.data_dir = PathBuf::from(data_dir);
        }

        if let Ok(enabled) = std::env::var("LOYALTY_PROGRAM_ENABLED") {
            config.program.enabled = enabled
                .parse()
                .map_err(|_| crate::Error::Config(format!("Invalid bool: {}", enabled)))?;
        }

        if let Ok(rate) = std::env::var("LOYALTY_RATE_PER_EURO") {
            config.program.rate_per_euro = rate
                .parse()
                .map_err(|_| crate::Error::Config(format!("Invalid rate: {}", rate)))?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service_name, "loyalty-core");
        assert!(config.program.enabled);
        assert_eq!(config.program.rate_per_euro, 10);
    }

    #[test]
    fn test_from_toml() {
        let toml = r#"
            data_dir = "/tmp/loyalty"
            service_name = "loyalty-core"

            [rocksdb]
            write_buffer_size_mb = 32
            max_write_buffer_number = 2
            max_background_jobs = 1

            [program]
            enabled = false
            rate_per_euro = 5
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/loyalty"));
        assert!(!config.program.enabled);
        assert_eq!(config.program.rate_per_euro, 5);
    }
}
