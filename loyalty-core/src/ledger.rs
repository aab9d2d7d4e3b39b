//! Main ledger orchestration layer
//!
//! Ties together storage, the account directory, the reward catalog and
//! the settings registry into the four mutating operations of the
//! loyalty program: earn, redeem, adjust, revoke.
//!
//! # Example
//!
//! ```no_run
//! use loyalty_core::{Config, CustomerId, Ledger, Order, OrderId};
//! use rust_decimal::Decimal;
//!
//! #[tokio::main]
//! async fn main() -> loyalty_core::Result<()> {
//!     let ledger = Ledger::open(Config::default())?;
//!
//!     let order = Order {
//!         order_id: OrderId::new("123"),
//!         amount_ttc_after_discounts: Decimal::from(100),
//!         items: vec![],
//!     };
//!     let granted = ledger.earn_points(&CustomerId::new("c1"), &order).await?;
//!     assert_eq!(granted, 1000);
//!
//!     Ok(())
//! }
//! ```

use crate::{
    catalog::RewardCatalog,
    directory::AccountDirectory,
    metrics::Metrics,
    settings::SettingsRegistry,
    types::{
        Account, AppliedDiscount, CustomerId, Order, OrderId, Revocation, Settings, Transaction,
    },
    Config, Error, Result, Storage,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

/// Main ledger interface
pub struct Ledger {
    /// Durable store, written after every mutation
    storage: Arc<Storage>,

    /// Per-account serialization and lazy creation
    directory: AccountDirectory,

    /// Redeemable reward set
    catalog: RewardCatalog,

    /// Program settings singleton
    settings: SettingsRegistry,

    /// Prometheus counters
    metrics: Metrics,
}

impl Ledger {
    /// Open ledger with configuration
    pub fn open(config: Config) -> Result<Self> {
        let storage = Arc::new(Storage::open(&config)?);

        let directory = AccountDirectory::load(&storage)?;
        let catalog = RewardCatalog::load(storage.clone())?;
        let settings = SettingsRegistry::load(
            storage.clone(),
            Settings {
                enabled: config.program.enabled,
                rate_per_euro: config.program.rate_per_euro,
            },
        )?;
        let metrics = Metrics::new()?;

        Ok(Self {
            storage,
            directory,
            catalog,
            settings,
            metrics,
        })
    }

    /// Reward catalog (administrative CRUD)
    pub fn catalog(&self) -> &RewardCatalog {
        &self.catalog
    }

    /// Settings registry (administrative updates)
    pub fn settings(&self) -> &SettingsRegistry {
        &self.settings
    }

    /// Metrics collector
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Credit points for a completed order.
    ///
    /// Returns the granted points: `floor(amount × rate)`, or `0` with
    /// no transaction recorded when the program is disabled, the amount
    /// is non-positive, or the product does not fit the point range.
    /// A zero return is not an error.
    ///
    /// Not idempotent per order id: a retried checkout callback appends
    /// a second earn entry and double-credits. Callers own at-most-once
    /// delivery; only [`Ledger::revoke_for_order`] guards against
    /// duplicate application.
    pub async fn earn_points(&self, customer_id: &CustomerId, order: &Order) -> Result<i64> {
        let settings = self.settings.current();
        if !settings.enabled {
            tracing::debug!(order_id = %order.order_id, "Earning disabled, no points granted");
            return Ok(0);
        }
        if order.amount_ttc_after_discounts <= Decimal::ZERO {
            return Ok(0);
        }

        // Out-of-range products grant nothing rather than panicking or
        // minting a misleading zero-point entry
        let granted = order
            .amount_ttc_after_discounts
            .checked_mul(Decimal::from(settings.rate_per_euro))
            .and_then(|points| points.floor().to_i64());
        let Some(granted) = granted else {
            tracing::warn!(
                order_id = %order.order_id,
                rate_per_euro = settings.rate_per_euro,
                "Point computation out of range, no points granted"
            );
            return Ok(0);
        };

        let slot = self.directory.account(customer_id);
        let mut account = slot.lock().await;

        let tx = Transaction::earn(granted, order.order_id.clone());
        self.commit(&mut account, tx)?;

        self.metrics.earns_total.inc();
        if granted > 0 {
            self.metrics.points_granted_total.inc_by(granted as u64);
        }

        tracing::debug!(
            customer_id = %customer_id,
            order_id = %order.order_id,
            granted,
            balance = account.points,
            "Points earned"
        );

        Ok(granted)
    }

    /// Redeem a reward against the account balance.
    ///
    /// Fails with [`Error::RewardUnavailable`] when the reward is
    /// missing or inactive, and with [`Error::InsufficientPoints`] when
    /// the balance is below its cost. On success the returned discount
    /// is a snapshot of the reward definition at redemption time.
    pub async fn use_reward(
        &self,
        customer_id: &CustomerId,
        reward_id: Uuid,
    ) -> Result<AppliedDiscount> {
        let reward = self
            .catalog
            .active(reward_id)
            .ok_or(Error::RewardUnavailable(reward_id))?;

        let slot = self.directory.account(customer_id);
        let mut account = slot.lock().await;

        if account.points < reward.points_required {
            return Err(Error::InsufficientPoints {
                required: reward.points_required,
                available: account.points,
            });
        }

        let tx = Transaction::redeem(reward.id, reward.points_required);
        self.commit(&mut account, tx)?;

        self.metrics.redemptions_total.inc();
        self.metrics
            .points_redeemed_total
            .inc_by(reward.points_required);

        tracing::info!(
            customer_id = %customer_id,
            reward_id = %reward.id,
            cost = reward.points_required,
            balance = account.points,
            "Reward redeemed"
        );

        Ok(AppliedDiscount::from(&reward))
    }

    /// Manually credit or debit points with a justification.
    ///
    /// A zero delta is a no-op with no transaction. The new balance is
    /// clamped at zero while the transaction records the requested
    /// delta; once a clamp has fired the balance, not a ledger fold, is
    /// the authoritative value.
    pub async fn adjust_points(
        &self,
        customer_id: &CustomerId,
        delta: i64,
        note: impl Into<String>,
    ) -> Result<u64> {
        let slot = self.directory.account(customer_id);
        let mut account = slot.lock().await;

        if delta == 0 {
            return Ok(account.points);
        }

        let tx = Transaction::adjust(delta, note.into());
        self.commit(&mut account, tx)?;

        self.metrics.adjustments_total.inc();

        tracing::info!(
            customer_id = %customer_id,
            delta,
            balance = account.points,
            "Points adjusted"
        );

        Ok(account.points)
    }

    /// Reverse the earn recorded for an order.
    ///
    /// Scans all accounts for an earn transaction with `order_id` that
    /// has no revoke yet; fails with [`Error::NoEarnForOrder`] otherwise
    /// (including when the order was already revoked), which makes the
    /// operation idempotent in effect.
    pub async fn revoke_for_order(&self, order_id: &OrderId) -> Result<Revocation> {
        for slot in self.directory.slots() {
            let mut account = slot.lock().await;

            let Some(earned) = account.revocable_earn(order_id) else {
                continue;
            };

            let tx = Transaction::revoke(order_id.clone(), -earned);
            self.commit(&mut account, tx)?;

            self.metrics.revocations_total.inc();

            let revocation = Revocation {
                customer_id: account.customer_id.clone(),
                revoked_points: earned.unsigned_abs(),
            };

            tracing::info!(
                customer_id = %revocation.customer_id,
                order_id = %order_id,
                revoked_points = revocation.revoked_points,
                "Earn revoked"
            );

            return Ok(revocation);
        }

        Err(Error::NoEarnForOrder(order_id.to_string()))
    }

    /// Current balance; zero for a never-seen customer, whose account
    /// is not created by the lookup
    pub async fn balance(&self, customer_id: &CustomerId) -> u64 {
        match self.directory.get(customer_id) {
            Some(slot) => slot.lock().await.points,
            None => 0,
        }
    }

    /// Transaction history, newest first; empty for a never-seen
    /// customer, whose account is not created by the lookup
    pub async fn history(&self, customer_id: &CustomerId) -> Vec<Transaction> {
        match self.directory.get(customer_id) {
            Some(slot) => slot.lock().await.ledger.iter().cloned().collect(),
            None => Vec::new(),
        }
    }

    /// Append a transaction, update the balance and persist.
    ///
    /// The in-memory mutation is rolled back when the store write
    /// fails; memory never runs ahead of disk.
    fn commit(&self, account: &mut Account, tx: Transaction) -> Result<()> {
        let previous_points = account.points;

        let clamped = account.apply_delta(tx.points);
        account.record(tx);

        if let Err(err) = self.storage.put_account(account) {
            account.rollback_last(previous_points);
            return Err(err);
        }

        if clamped {
            tracing::warn!(
                customer_id = %account.customer_id,
                "Debit clamped at zero; balance and ledger sum now diverge"
            );
        }

        Ok(())
    }
}
