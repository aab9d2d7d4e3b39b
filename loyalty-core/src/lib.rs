//! Loyalty Points Ledger
//!
//! Append-only, per-account point ledger backing a storefront loyalty
//! program: earning on completed orders, redemption against a reward
//! catalog, manual adjustment and transactional revocation.
//!
//! # Invariants
//!
//! - Balances are never negative: debits clamp at zero
//! - Append-only: transactions are never modified or deleted
//! - One revoke at most per order, always backed by an earlier earn
//! - Single writer per account: mutations on one account are serialized
//!   across the whole read, append, persist sequence

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod catalog;
pub mod config;
pub mod directory;
pub mod error;
pub mod ledger;
pub mod metrics;
pub mod settings;
pub mod storage;
pub mod types;

// Re-exports
pub use catalog::{next_reward, progress_percent, RewardCatalog};
pub use config::Config;
pub use directory::{AccountDirectory, AccountSlot};
pub use error::{Error, Result};
pub use ledger::Ledger;
pub use metrics::Metrics;
pub use settings::SettingsRegistry;
pub use storage::Storage;
pub use types::{
    Account, AppliedDiscount, CustomerId, Order, OrderId, OrderItem, Reward, RewardKind,
    RewardPatch, RewardSpec, Revocation, Settings, SettingsPatch, Transaction, TransactionKind,
};
