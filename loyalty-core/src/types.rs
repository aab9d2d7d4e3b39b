//! Core types for the loyalty ledger
//!
//! All types are designed for:
//! - Deterministic serialization (bincode)
//! - Exact arithmetic (Decimal for money)
//! - Non-negative balances (u64 with clamped debits)

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use uuid::Uuid;

/// Customer identifier (opaque id supplied by the storefront)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(String);

impl CustomerId {
    /// Create new customer ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Order identifier supplied by the checkout flow
///
/// Must be stable and unique per order; earn and revoke transactions are
/// correlated through it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(String);

impl OrderId {
    /// Create new order ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Transaction kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Points credited for a completed purchase
    Earn,
    /// Points debited to claim a reward
    Use,
    /// Manual credit or debit with a justification
    Adjust,
    /// Reversal of a prior earn, tied to the same order
    Revoke,
}

/// One append-only ledger entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction ID (UUIDv7 for time-ordering)
    pub id: Uuid,

    /// Kind of transaction
    pub kind: TransactionKind,

    /// Signed point delta as requested at insertion time
    ///
    /// When a debit is clamped, the balance reflects the clamp but this
    /// field keeps the requested delta; history shows intent.
    pub points: i64,

    /// Originating order (earn) or reversed order (revoke)
    pub order_id: Option<OrderId>,

    /// Redeemed reward (use only)
    pub reward_id: Option<Uuid>,

    /// Free-text justification (adjust only)
    pub note: Option<String>,

    /// Creation timestamp, immutable
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    fn new(kind: TransactionKind, points: i64) -> Self {
        Self {
            id: Uuid::now_v7(),
            kind,
            points,
            order_id: None,
            reward_id: None,
            note: None,
            created_at: Utc::now(),
        }
    }

    /// Earn entry crediting `points` for `order_id`
    pub fn earn(points: i64, order_id: OrderId) -> Self {
        let mut tx = Self::new(TransactionKind::Earn, points);
        tx.order_id = Some(order_id);
        tx
    }

    /// Use entry debiting `cost` points against `reward_id`
    pub fn redeem(reward_id: Uuid, cost: u64) -> Self {
        let mut tx = Self::new(TransactionKind::Use, -(cost as i64));
        tx.reward_id = Some(reward_id);
        tx
    }

    /// Adjust entry carrying the requested delta and its justification
    pub fn adjust(delta: i64, note: String) -> Self {
        let mut tx = Self::new(TransactionKind::Adjust, delta);
        tx.note = Some(note);
        tx
    }

    /// Revoke entry reversing the earn recorded for `order_id`
    pub fn revoke(order_id: OrderId, points: i64) -> Self {
        let mut tx = Self::new(TransactionKind::Revoke, points);
        tx.order_id = Some(order_id);
        tx
    }
}

/// Loyalty account: cached balance plus newest-first transaction history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Owning customer
    pub customer_id: CustomerId,

    /// Cached balance, never negative
    ///
    /// Authoritative running value; equals the ledger sum until a debit
    /// has been clamped at zero, after which the two diverge.
    pub points: u64,

    /// Transactions, newest first; never mutated or removed
    pub ledger: VecDeque<Transaction>,
}

impl Account {
    /// Fresh account with zero balance and empty history
    pub fn new(customer_id: CustomerId) -> Self {
        Self {
            customer_id,
            points: 0,
            ledger: VecDeque::new(),
        }
    }

    /// Apply a signed delta to the balance, clamping at zero.
    ///
    /// Returns `true` when the clamp fired (requested debit exceeded the
    /// balance).
    pub(crate) fn apply_delta(&mut self, delta: i64) -> bool {
        if delta >= 0 {
            self.points = self.points.saturating_add(delta as u64);
            false
        } else {
            let debit = delta.unsigned_abs();
            let clamped = debit > self.points;
            self.points = self.points.saturating_sub(debit);
            clamped
        }
    }

    /// Prepend a transaction (ledger is newest-first)
    pub(crate) fn record(&mut self, tx: Transaction) {
        self.ledger.push_front(tx);
    }

    /// Undo the most recent `record` + `apply_delta` pair.
    ///
    /// Only used when the store write fails, so memory never runs ahead
    /// of disk.
    pub(crate) fn rollback_last(&mut self, previous_points: u64) {
        self.ledger.pop_front();
        self.points = previous_points;
    }

    /// Points of the earn transaction for `order_id`, provided no revoke
    /// for the same order exists yet
    pub fn revocable_earn(&self, order_id: &OrderId) -> Option<i64> {
        let already_revoked = self.ledger.iter().any(|tx| {
            tx.kind == TransactionKind::Revoke && tx.order_id.as_ref() == Some(order_id)
        });
        if already_revoked {
            return None;
        }

        self.ledger
            .iter()
            .find(|tx| tx.kind == TransactionKind::Earn && tx.order_id.as_ref() == Some(order_id))
            .map(|tx| tx.points)
    }

    /// Sum of all transaction deltas
    ///
    /// Equals `points` only while no clamp has ever fired.
    pub fn ledger_sum(&self) -> i64 {
        self.ledger.iter().map(|tx| tx.points).sum()
    }
}

/// Reward payout kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewardKind {
    /// Fixed amount off the order total
    Amount,
    /// Percentage off the order total
    Percent,
    /// Free shipping
    Shipping,
    /// Free gift item
    Gift,
}

/// Redeemable catalog entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reward {
    /// Unique reward ID (UUIDv7)
    pub id: Uuid,

    /// Payout kind
    pub kind: RewardKind,

    /// Point cost, positive
    pub points_required: u64,

    /// Payout magnitude; meaning depends on `kind`
    ///
    /// Stored as a string: bincode cannot drive `Decimal`'s
    /// self-describing default deserializer.
    #[serde(with = "rust_decimal::serde::str")]
    pub value: Decimal,

    /// Gifted product (gift rewards only)
    pub gift_product_id: Option<String>,

    /// Display label
    pub label: String,

    /// Redeemable only while true
    pub is_active: bool,
}

/// Input for creating a reward; the catalog assigns the id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardSpec {
    /// Payout kind
    pub kind: RewardKind,
    /// Point cost, positive
    pub points_required: u64,
    /// Payout magnitude
    pub value: Decimal,
    /// Gifted product (gift rewards only)
    pub gift_product_id: Option<String>,
    /// Display label
    pub label: String,
    /// Redeemable flag
    pub is_active: bool,
}

/// Partial reward update; `None` fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RewardPatch {
    /// New payout kind
    pub kind: Option<RewardKind>,
    /// New point cost
    pub points_required: Option<u64>,
    /// New payout magnitude
    pub value: Option<Decimal>,
    /// New gifted product; `Some(None)` clears it
    pub gift_product_id: Option<Option<String>>,
    /// New display label
    pub label: Option<String>,
    /// New redeemable flag
    pub is_active: Option<bool>,
}

/// Discount granted by a successful redemption
///
/// Snapshot of the reward definition at redemption time; later edits to
/// the reward do not alter an already-applied discount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedDiscount {
    /// Payout kind
    pub kind: RewardKind,
    /// Payout magnitude
    pub value: Decimal,
    /// Gifted product (gift rewards only)
    pub gift_product_id: Option<String>,
}

impl From<&Reward> for AppliedDiscount {
    fn from(reward: &Reward) -> Self {
        Self {
            kind: reward.kind,
            value: reward.value,
            gift_product_id: reward.gift_product_id.clone(),
        }
    }
}

/// Process-wide loyalty program settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Gates all earning; redemption and adjustment stay available
    pub enabled: bool,

    /// Points granted per whole currency unit spent
    ///
    /// Accepted without validation; zero or negative rates make
    /// `earn_points` grant zero or negative points.
    pub rate_per_euro: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            rate_per_euro: 10,
        }
    }
}

/// Partial settings update; `None` fields are left unchanged
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SettingsPatch {
    /// New enable flag
    pub enabled: Option<bool>,
    /// New earn rate
    pub rate_per_euro: Option<i64>,
}

/// Completed order as reported by the checkout flow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Stable, unique order identifier
    pub order_id: OrderId,

    /// Post-discount payable total in the base currency unit
    pub amount_ttc_after_discounts: Decimal,

    /// Line items; carried for callers, not consulted by the engine
    pub items: Vec<OrderItem>,
}

/// One order line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    /// Purchased product
    pub product_id: String,
    /// Quantity
    pub quantity: u32,
    /// Unit price
    pub unit_price: Decimal,
}

/// Outcome of a successful revocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revocation {
    /// Account the earn was reversed on
    pub customer_id: CustomerId,
    /// Magnitude of the reversed earn
    pub revoked_points: u64,
}
