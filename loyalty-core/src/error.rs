//! Error types for the loyalty ledger

use thiserror::Error;
use uuid::Uuid;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ledger errors
#[derive(Error, Debug)]
pub enum Error {
    /// Storage error (RocksDB)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// Reward missing from the catalog or not redeemable
    #[error("Reward {0} not found or inactive")]
    RewardUnavailable(Uuid),

    /// Balance below the reward's point cost
    #[error(
        "Insufficient points: {required} required, {available} available ({} missing)",
        .required - .available
    )]
    InsufficientPoints {
        /// Point cost of the reward
        required: u64,
        /// Current account balance
        available: u64,
    },

    /// No unrevoked earn transaction matches the order
    #[error("No revocable earn transaction for order {0}")]
    NoEarnForOrder(String),

    /// Metrics registration error
    #[error("Metrics error: {0}")]
    Metrics(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rocksdb::Error> for Error {
    fn from(err: rocksdb::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

impl From<prometheus::Error> for Error {
    fn from(err: prometheus::Error) -> Self {
        Error::Metrics(err.to_string())
    }
}
