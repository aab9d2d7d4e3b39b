//! Account directory
//!
//! Maps each customer id to exactly one live account, created lazily on
//! first access. Every account sits behind its own async mutex; the
//! ledger holds that lock across the whole read-balance, append,
//! persist sequence, so mutations against one account are serialized
//! while different accounts proceed in parallel.

use crate::{
    storage::Storage,
    types::{Account, CustomerId},
    Result,
};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// One live account behind its serialization lock
pub type AccountSlot = Arc<Mutex<Account>>;

/// Directory of live accounts
pub struct AccountDirectory {
    accounts: DashMap<CustomerId, AccountSlot>,
}

impl AccountDirectory {
    /// Load all stored accounts (startup only)
    pub fn load(storage: &Storage) -> Result<Self> {
        let accounts = DashMap::new();
        for account in storage.load_accounts()? {
            accounts.insert(
                account.customer_id.clone(),
                Arc::new(Mutex::new(account)),
            );
        }

        tracing::info!(count = accounts.len(), "Accounts loaded");

        Ok(Self { accounts })
    }

    /// Resolve or create the account for `customer_id`; never fails.
    ///
    /// A fresh account has zero balance and an empty ledger; it is not
    /// persisted until its first mutation.
    pub fn account(&self, customer_id: &CustomerId) -> AccountSlot {
        self.accounts
            .entry(customer_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(Account::new(customer_id.clone()))))
            .clone()
    }

    /// Existing account for `customer_id`, without creating one.
    ///
    /// Read paths use this so lookups of never-seen customers do not
    /// grow the directory.
    pub fn get(&self, customer_id: &CustomerId) -> Option<AccountSlot> {
        self.accounts
            .get(customer_id)
            .map(|entry| entry.value().clone())
    }

    /// All live account slots, for cross-account scans
    pub(crate) fn slots(&self) -> Vec<AccountSlot> {
        self.accounts.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Number of live accounts
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// True when no account has been touched yet
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}
