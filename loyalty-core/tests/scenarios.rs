//! End-to-end scenarios: full purchase/redeem/revoke flows, restart
//! durability and same-account concurrency.

use loyalty_core::{
    Config, CustomerId, Error, Ledger, Order, OrderId, RewardKind, RewardSpec, SettingsPatch,
    TransactionKind,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use tempfile::TempDir;

fn test_config() -> (Config, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let mut config = Config::default();
    config.data_dir = temp_dir.path().to_path_buf();
    (config, temp_dir)
}

fn order(id: &str, amount: i64) -> Order {
    Order {
        order_id: OrderId::new(id),
        amount_ttc_after_discounts: Decimal::from(amount),
        items: vec![],
    }
}

fn shipping_reward(points_required: u64) -> RewardSpec {
    RewardSpec {
        kind: RewardKind::Shipping,
        points_required,
        value: Decimal::ZERO,
        gift_product_id: None,
        label: "free shipping".to_string(),
        is_active: true,
    }
}

#[tokio::test]
async fn test_full_customer_lifecycle() {
    let (config, _temp) = test_config();
    let ledger = Ledger::open(config).unwrap();
    let customer = CustomerId::new("customer-42");

    // Two purchases
    ledger.earn_points(&customer, &order("o-1", 100)).await.unwrap();
    ledger.earn_points(&customer, &order("o-2", 35)).await.unwrap();
    assert_eq!(ledger.balance(&customer).await, 1350);

    // Redeem free shipping
    let reward = ledger.catalog().create_reward(shipping_reward(400)).unwrap();
    let discount = ledger.use_reward(&customer, reward.id).await.unwrap();
    assert_eq!(discount.kind, RewardKind::Shipping);
    assert_eq!(ledger.balance(&customer).await, 950);

    // Support credits goodwill points
    ledger
        .adjust_points(&customer, 50, "late delivery goodwill")
        .await
        .unwrap();
    assert_eq!(ledger.balance(&customer).await, 1000);

    // Second order cancelled, its earn reversed
    let revocation = ledger.revoke_for_order(&OrderId::new("o-2")).await.unwrap();
    assert_eq!(revocation.revoked_points, 350);
    assert_eq!(ledger.balance(&customer).await, 650);

    // History is newest-first: revoke, adjust, use, earn, earn
    let history = ledger.history(&customer).await;
    let kinds: Vec<_> = history.iter().map(|tx| tx.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TransactionKind::Revoke,
            TransactionKind::Adjust,
            TransactionKind::Use,
            TransactionKind::Earn,
            TransactionKind::Earn,
        ]
    );
}

#[tokio::test]
async fn test_state_survives_restart() {
    let (config, _temp) = test_config();

    let reward_id;
    {
        let ledger = Ledger::open(config.clone()).unwrap();
        let customer = CustomerId::new("c1");

        ledger.earn_points(&customer, &order("o-1", 80)).await.unwrap();
        reward_id = ledger.catalog().create_reward(shipping_reward(300)).unwrap().id;
        ledger
            .settings()
            .update(SettingsPatch {
                enabled: Some(false),
                rate_per_euro: None,
            })
            .unwrap();
    }

    // Reopen against the same data directory
    let ledger = Ledger::open(config).unwrap();
    let customer = CustomerId::new("c1");

    assert_eq!(ledger.balance(&customer).await, 800);
    assert_eq!(ledger.history(&customer).await.len(), 1);
    assert_eq!(ledger.catalog().rewards().len(), 1);
    assert!(!ledger.settings().current().enabled);

    // Revocation still works on reloaded history
    let revocation = ledger.revoke_for_order(&OrderId::new("o-1")).await.unwrap();
    assert_eq!(revocation.revoked_points, 800);

    // And redemption against the reloaded catalog
    ledger.adjust_points(&customer, 300, "manual top-up").await.unwrap();
    ledger.use_reward(&customer, reward_id).await.unwrap();
    assert_eq!(ledger.balance(&customer).await, 0);
}

#[tokio::test]
async fn test_no_lost_updates_on_same_account() {
    let (config, _temp) = test_config();
    let ledger = Arc::new(Ledger::open(config).unwrap());
    let customer = CustomerId::new("hot");

    let mut handles = Vec::new();
    for i in 0..50 {
        let ledger = ledger.clone();
        let customer = customer.clone();
        handles.push(tokio::spawn(async move {
            ledger
                .earn_points(&customer, &order(&format!("o-{i}"), 1))
                .await
                .unwrap()
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap(), 10);
    }

    assert_eq!(ledger.balance(&customer).await, 500);
    assert_eq!(ledger.history(&customer).await.len(), 50);
}

#[tokio::test]
async fn test_concurrent_redeem_and_adjust_keep_balance_consistent() {
    let (config, _temp) = test_config();
    let ledger = Arc::new(Ledger::open(config).unwrap());
    let customer = CustomerId::new("mixed");

    ledger.earn_points(&customer, &order("seed", 100)).await.unwrap();
    let reward = ledger.catalog().create_reward(shipping_reward(100)).unwrap();

    let mut handles = Vec::new();
    for _ in 0..5 {
        let redeem_ledger = ledger.clone();
        let redeem_customer = customer.clone();
        let reward_id = reward.id;
        handles.push(tokio::spawn(async move {
            let _ = redeem_ledger.use_reward(&redeem_customer, reward_id).await;
        }));
        let adjust_ledger = ledger.clone();
        let adjust_customer = customer.clone();
        handles.push(tokio::spawn(async move {
            adjust_ledger.adjust_points(&adjust_customer, -100, "sweep").await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    // Whatever the interleaving, the balance never went negative and
    // every successful debit was exactly 100 points.
    let history = ledger.history(&customer).await;
    let redeemed = history.iter().filter(|tx| tx.kind == TransactionKind::Use).count();
    assert!(redeemed <= 5);
    assert_eq!(ledger.metrics().redemptions_total.get(), redeemed as u64);
}

#[tokio::test]
async fn test_accounts_do_not_interfere() {
    let (config, _temp) = test_config();
    let ledger = Arc::new(Ledger::open(config).unwrap());

    let mut handles = Vec::new();
    for i in 0..10 {
        let ledger = ledger.clone();
        handles.push(tokio::spawn(async move {
            let customer = CustomerId::new(format!("c-{i}"));
            for j in 0..5 {
                ledger
                    .earn_points(&customer, &order(&format!("o-{i}-{j}"), 10))
                    .await
                    .unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    for i in 0..10 {
        let customer = CustomerId::new(format!("c-{i}"));
        assert_eq!(ledger.balance(&customer).await, 500);
    }
}

#[tokio::test]
async fn test_revoked_order_stays_revoked_across_restart() {
    let (config, _temp) = test_config();

    {
        let ledger = Ledger::open(config.clone()).unwrap();
        let customer = CustomerId::new("c1");
        ledger.earn_points(&customer, &order("o-1", 50)).await.unwrap();
        ledger.revoke_for_order(&OrderId::new("o-1")).await.unwrap();
    }

    let ledger = Ledger::open(config).unwrap();
    let second = ledger.revoke_for_order(&OrderId::new("o-1")).await;
    assert!(matches!(second, Err(Error::NoEarnForOrder(_))));
}
