//! Metrics collection for observability
//!
//! # Metrics
//!
//! - `loyalty_earn_transactions_total` - Earn transactions appended
//! - `loyalty_use_transactions_total` - Redemptions appended
//! - `loyalty_adjust_transactions_total` - Manual adjustments appended
//! - `loyalty_revoke_transactions_total` - Revocations appended
//! - `loyalty_points_granted_total` - Points credited through earning
//! - `loyalty_points_redeemed_total` - Points debited through redemption

use prometheus::{IntCounter, Registry};
use std::sync::Arc;

/// Metrics collector
///
/// Counters live on a per-ledger registry rather than the process-wide
/// default, so several ledgers can coexist in one process (tests open
/// many).
#[derive(Clone)]
pub struct Metrics {
    /// Earn transactions appended
    pub earns_total: IntCounter,

    /// Redemptions appended
    pub redemptions_total: IntCounter,

    /// Manual adjustments appended
    pub adjustments_total: IntCounter,

    /// Revocations appended
    pub revocations_total: IntCounter,

    /// Points credited through earning
    pub points_granted_total: IntCounter,

    /// Points debited through redemption
    pub points_redeemed_total: IntCounter,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let earns_total = IntCounter::new(
            "loyalty_earn_transactions_total",
            "Earn transactions appended",
        )?;
        registry.register(Box::new(earns_total.clone()))?;

        let redemptions_total = IntCounter::new(
            "loyalty_use_transactions_total",
            "Redemptions appended",
        )?;
        registry.register(Box::new(redemptions_total.clone()))?;

        let adjustments_total = IntCounter::new(
            "loyalty_adjust_transactions_total",
            "Manual adjustments appended",
        )?;
        registry.register(Box::new(adjustments_total.clone()))?;

        let revocations_total = IntCounter::new(
            "loyalty_revoke_transactions_total",
            "Revocations appended",
        )?;
        registry.register(Box::new(revocations_total.clone()))?;

        let points_granted_total = IntCounter::new(
            "loyalty_points_granted_total",
            "Points credited through earning",
        )?;
        registry.register(Box::new(points_granted_total.clone()))?;

        let points_redeemed_total = IntCounter::new(
            "loyalty_points_redeemed_total",
            "Points debited through redemption",
        )?;
        registry.register(Box::new(points_redeemed_total.clone()))?;

        Ok(Self {
            earns_total,
            redemptions_total,
            adjustments_total,
            revocations_total,
            points_granted_total,
            points_redeemed_total,
            registry,
        })
    }
}
