//! Storage layer using RocksDB
//!
//! # Column Families
//!
//! - `accounts` - Account snapshots (key: customer id)
//! - `rewards` - Reward catalog entries (key: reward id)
//! - `settings` - Program settings singleton (fixed key)
//!
//! Each value is a full bincode snapshot of its record, rewritten after
//! every mutation; all three families are scanned once at startup.

use crate::{
    error::{Error, Result},
    types::{Account, Reward, Settings},
    Config,
};
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, IteratorMode, Options, DB};
use std::sync::Arc;
use uuid::Uuid;

/// Column family names
const CF_ACCOUNTS: &str = "accounts";
const CF_REWARDS: &str = "rewards";
const CF_SETTINGS: &str = "settings";

/// Key under which the settings singleton is stored
const SETTINGS_KEY: &[u8] = b"settings";

/// Storage wrapper for RocksDB
pub struct Storage {
    db: Arc<DB>,
}

impl Storage {
    /// Open or create database
    pub fn open(config: &Config) -> Result<Self> {
        let path = &config.data_dir;

        // Create directory if not exists
        std::fs::create_dir_all(path)?;

        // Database options
        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);

        // Tuning from config
        db_opts.set_write_buffer_size(config.rocksdb.write_buffer_size_mb * 1024 * 1024);
        db_opts.set_max_write_buffer_number(config.rocksdb.max_write_buffer_number);
        db_opts.set_max_background_jobs(config.rocksdb.max_background_jobs);

        // Column family descriptors
        let cf_descriptors = vec![
            ColumnFamilyDescriptor::new(CF_ACCOUNTS, Self::cf_options_accounts()),
            ColumnFamilyDescriptor::new(CF_REWARDS, Options::default()),
            ColumnFamilyDescriptor::new(CF_SETTINGS, Options::default()),
        ];

        // Open database
        let db = DB::open_cf_descriptors(&db_opts, path, cf_descriptors)?;

        tracing::info!("Opened RocksDB at {:?}", path);

        Ok(Self { db: Arc::new(db) })
    }

    fn cf_options_accounts() -> Options {
        let mut opts = Options::default();
        // Account snapshots grow with their ledgers
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        opts
    }

    // Helper: get column family handle

    fn cf_handle(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| Error::Storage(format!("Column family {} not found", name)))
    }

    // Account operations

    /// Write the full snapshot for one account
    pub fn put_account(&self, account: &Account) -> Result<()> {
        let cf = self.cf_handle(CF_ACCOUNTS)?;
        let key = account.customer_id.as_str().as_bytes();
        let value = bincode::serialize(account)?;

        self.db.put_cf(cf, key, &value)?;

        tracing::debug!(
            customer_id = %account.customer_id,
            points = account.points,
            "Account snapshot written"
        );

        Ok(())
    }

    /// Load all account snapshots (startup only)
    pub fn load_accounts(&self) -> Result<Vec<Account>> {
        let cf = self.cf_handle(CF_ACCOUNTS)?;

        let mut accounts = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_, value) = item?;
            accounts.push(bincode::deserialize(&value)?);
        }

        Ok(accounts)
    }

    // Reward operations

    /// Write one reward entry
    ///
    /// Keys are UUIDv7 bytes, so scan order equals creation order.
    pub fn put_reward(&self, reward: &Reward) -> Result<()> {
        let cf = self.cf_handle(CF_REWARDS)?;
        let value = bincode::serialize(reward)?;

        self.db.put_cf(cf, reward.id.as_bytes(), &value)?;

        Ok(())
    }

    /// Hard-delete one reward entry
    pub fn delete_reward(&self, id: Uuid) -> Result<()> {
        let cf = self.cf_handle(CF_REWARDS)?;
        self.db.delete_cf(cf, id.as_bytes())?;
        Ok(())
    }

    /// Load the full catalog in creation order (startup only)
    pub fn load_rewards(&self) -> Result<Vec<Reward>> {
        let cf = self.cf_handle(CF_REWARDS)?;

        let mut rewards = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_, value) = item?;
            rewards.push(bincode::deserialize(&value)?);
        }

        Ok(rewards)
    }

    // Settings operations

    /// Write the settings singleton
    pub fn put_settings(&self, settings: &Settings) -> Result<()> {
        let cf = self.cf_handle(CF_SETTINGS)?;
        let value = bincode::serialize(settings)?;

        self.db.put_cf(cf, SETTINGS_KEY, &value)?;

        Ok(())
    }

    /// Load the settings singleton, `None` before first write
    pub fn load_settings(&self) -> Result<Option<Settings>> {
        let cf = self.cf_handle(CF_SETTINGS)?;

        match self.db.get_cf(cf, SETTINGS_KEY)? {
            Some(value) => Ok(Some(bincode::deserialize(&value)?)),
            None => Ok(None),
        }
    }
}
