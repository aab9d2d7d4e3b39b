//! Reward catalog
//!
//! CRUD over the redeemable reward set, plus the pure progress views the
//! storefront renders. The catalog is a process-wide singleton with an
//! internal lock; redemption reads a snapshot of the reward so later
//! edits never alter an already-applied discount.

use crate::{
    storage::Storage,
    types::{Reward, RewardPatch, RewardSpec},
    Result,
};
use parking_lot::RwLock;
use std::sync::Arc;
use uuid::Uuid;

/// Catalog of redeemable rewards, in creation order
pub struct RewardCatalog {
    storage: Arc<Storage>,
    inner: RwLock<Vec<Reward>>,
}

impl RewardCatalog {
    /// Load the stored catalog
    pub fn load(storage: Arc<Storage>) -> Result<Self> {
        let rewards = storage.load_rewards()?;

        Ok(Self {
            storage,
            inner: RwLock::new(rewards),
        })
    }

    /// Create a reward; the catalog assigns the id
    pub fn create_reward(&self, spec: RewardSpec) -> Result<Reward> {
        let reward = Reward {
            id: Uuid::now_v7(),
            kind: spec.kind,
            points_required: spec.points_required,
            value: spec.value,
            gift_product_id: spec.gift_product_id,
            label: spec.label,
            is_active: spec.is_active,
        };

        let mut guard = self.inner.write();
        self.storage.put_reward(&reward)?;
        guard.push(reward.clone());

        tracing::info!(reward_id = %reward.id, label = %reward.label, "Reward created");

        Ok(reward)
    }

    /// Apply a partial update; `Ok(None)` when the id is unknown
    pub fn update_reward(&self, id: Uuid, patch: RewardPatch) -> Result<Option<Reward>> {
        let mut guard = self.inner.write();

        let Some(slot) = guard.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };

        let mut updated = slot.clone();
        if let Some(kind) = patch.kind {
            updated.kind = kind;
        }
        if let Some(points_required) = patch.points_required {
            updated.points_required = points_required;
        }
        if let Some(value) = patch.value {
            updated.value = value;
        }
        if let Some(gift_product_id) = patch.gift_product_id {
            updated.gift_product_id = gift_product_id;
        }
        if let Some(label) = patch.label {
            updated.label = label;
        }
        if let Some(is_active) = patch.is_active {
            updated.is_active = is_active;
        }

        self.storage.put_reward(&updated)?;
        *slot = updated.clone();

        Ok(Some(updated))
    }

    /// Hard-delete a reward; `Ok(false)` when the id is unknown.
    ///
    /// Historical `use` transactions keep the orphaned reward id.
    pub fn delete_reward(&self, id: Uuid) -> Result<bool> {
        let mut guard = self.inner.write();

        let Some(position) = guard.iter().position(|r| r.id == id) else {
            return Ok(false);
        };

        self.storage.delete_reward(id)?;
        guard.remove(position);

        tracing::info!(reward_id = %id, "Reward deleted");

        Ok(true)
    }

    /// All rewards in creation order, active and inactive
    pub fn rewards(&self) -> Vec<Reward> {
        self.inner.read().clone()
    }

    /// Snapshot of a reward, only while it is active
    pub(crate) fn active(&self, id: Uuid) -> Option<Reward> {
        self.inner
            .read()
            .iter()
            .find(|r| r.id == id && r.is_active)
            .cloned()
    }
}

/// Cheapest active reward the balance cannot afford yet
pub fn next_reward(points: u64, rewards: &[Reward]) -> Option<&Reward> {
    rewards
        .iter()
        .filter(|r| r.is_active && r.points_required > points)
        .min_by_key(|r| r.points_required)
}

/// Progress toward a reward, 0-100
pub fn progress_percent(points: u64, reward: &Reward) -> u8 {
    if reward.points_required == 0 {
        return 100;
    }
    let percent = points.saturating_mul(100) / reward.points_required;
    percent.min(100) as u8
}
