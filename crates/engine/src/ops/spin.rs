//! The reward distributor.
//!
//! A spin debits the fixed points cost, draws one reward by weighted random
//! selection and credits its payout, all inside a single database
//! transaction: the cost is never lost without a reward and a reward is
//! never granted unpaid. The draw normalizes against whatever the active
//! probabilities actually sum to, so a catalog that sums to 0.97 still
//! always produces a winner.

use chrono::Utc;
use rand::Rng;
use uuid::Uuid;

use sea_orm::{ActiveModelTrait, TransactionTrait};

use crate::{
    CacheKey, EngineError, Notification, ResultEngine, Reward, RewardKind, SpinRecord,
    Transaction, TransactionKind, TransactionStatus, notifications, reward_history,
};

use super::rewards::load_active_rewards;
use super::{Engine, with_tx};

/// Result of a successful spin.
#[derive(Clone, Debug)]
pub struct SpinOutcome {
    pub reward: Reward,
    pub balance_minor: i64,
    pub points: i64,
}

impl Engine {
    /// Performs one spin for `account_id`.
    ///
    /// Fails with `InsufficientFunds` when the account holds fewer points
    /// than the spin cost (checked by the conditional debit, before any
    /// catalog work) and with `NoActiveRewards` on an empty catalog (the
    /// cost debit rolls back with the transaction).
    pub async fn spin(&self, account_id: Uuid) -> ResultEngine<SpinOutcome> {
        // OS-seeded thread RNG. The wheel angle shown to players is derived
        // from the selected reward by the presentation layer, never the
        // other way around.
        let roll: f64 = rand::rng().random();
        self.spin_with_roll(account_id, roll).await
    }

    async fn spin_with_roll(&self, account_id: Uuid, roll: f64) -> ResultEngine<SpinOutcome> {
        let outcome = with_tx!(self, |db_tx| {
            let now = Utc::now();
            self.apply_points_debit(&db_tx, account_id, self.spin_cost)
                .await?;

            let active = load_active_rewards(&db_tx).await?;
            let reward = pick_reward(&active, roll)?.clone();

            match reward.kind {
                RewardKind::Balance => {
                    self.apply_balance_credit(&db_tx, account_id, reward.value)
                        .await?;
                }
                RewardKind::Points => {
                    self.apply_points_credit(&db_tx, account_id, reward.value)
                        .await?;
                }
            }

            let mut cost_tx = Transaction::new(
                account_id,
                TransactionKind::PointsRedeemed,
                0,
                0,
                -self.spin_cost,
                TransactionStatus::Completed,
                now,
            )?;
            cost_tx.note = Some("lucky wheel spin".to_string());
            self.record_transaction(&db_tx, &cost_tx).await?;

            let mut payout_tx = match reward.kind {
                RewardKind::Balance => Transaction::new(
                    account_id,
                    TransactionKind::Bonus,
                    reward.value,
                    0,
                    0,
                    TransactionStatus::Completed,
                    now,
                )?,
                RewardKind::Points => Transaction::new(
                    account_id,
                    TransactionKind::PointsEarned,
                    0,
                    0,
                    reward.value,
                    TransactionStatus::Completed,
                    now,
                )?,
            };
            payout_tx.note = Some(format!("lucky wheel: {}", reward.name));
            self.record_transaction(&db_tx, &payout_tx).await?;

            let record = SpinRecord::new(account_id, reward.id, self.spin_cost, now);
            reward_history::ActiveModel::from(&record)
                .insert(&db_tx)
                .await?;

            let notification =
                Notification::new(account_id, format!("You won {}", reward.name), now);
            notifications::ActiveModel::from(&notification)
                .insert(&db_tx)
                .await?;

            let account = self.require_account(&db_tx, account_id).await?;
            Ok::<_, EngineError>(SpinOutcome {
                reward,
                balance_minor: account.balance_minor,
                points: account.points,
            })
        })?;
        self.cache.delete(&CacheKey::profile(account_id));
        Ok(outcome)
    }
}

/// Maps a uniform draw in `[0, 1)` onto the catalog by cumulative weight.
///
/// The draw is scaled by the actual probability total, so selection stays
/// proportional to weight whatever the catalog sums to. Walk order is the
/// stable catalog order the caller loaded.
fn pick_reward(rewards: &[Reward], roll: f64) -> ResultEngine<&Reward> {
    let total: f64 = rewards.iter().map(|reward| reward.probability).sum();
    let target = roll * total;
    let mut cumulative = 0.0;
    for reward in rewards {
        cumulative += reward.probability;
        if cumulative > target {
            return Ok(reward);
        }
    }
    // Float edges (or an all-zero-weight catalog) fall through to the last
    // entry; only an empty catalog yields no winner.
    rewards.last().ok_or(EngineError::NoActiveRewards)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<Reward> {
        let mut created_at = Utc::now();
        [("A", 0.5), ("B", 0.3), ("C", 0.2)]
            .into_iter()
            .map(|(name, probability)| {
                created_at += chrono::Duration::seconds(1);
                Reward::new(
                    name.to_string(),
                    RewardKind::Points,
                    10,
                    probability,
                    "#336699".to_string(),
                    created_at,
                )
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn low_draw_selects_first_reward() {
        let rewards = catalog();
        assert_eq!(pick_reward(&rewards, 0.1).unwrap().name, "A");
    }

    #[test]
    fn mid_draw_selects_second_reward() {
        let rewards = catalog();
        assert_eq!(pick_reward(&rewards, 0.6).unwrap().name, "B");
    }

    #[test]
    fn high_draw_selects_last_reward() {
        let rewards = catalog();
        assert_eq!(pick_reward(&rewards, 0.95).unwrap().name, "C");
    }

    #[test]
    fn selection_normalizes_against_partial_totals() {
        let mut rewards = catalog();
        // Drop C so the weights sum to 0.8; every draw must still win.
        rewards.pop();
        assert_eq!(pick_reward(&rewards, 0.0).unwrap().name, "A");
        // 0.5 / 0.8 is the exact boundary between A and B.
        assert_eq!(pick_reward(&rewards, 0.624).unwrap().name, "A");
        assert_eq!(pick_reward(&rewards, 0.625).unwrap().name, "B");
        assert_eq!(pick_reward(&rewards, 0.999).unwrap().name, "B");
    }

    #[test]
    fn all_zero_weights_fall_back_to_last_entry() {
        let rewards: Vec<Reward> = catalog()
            .into_iter()
            .map(|mut reward| {
                reward.probability = 0.0;
                reward
            })
            .collect();
        assert_eq!(pick_reward(&rewards, 0.4).unwrap().name, "C");
    }

    #[test]
    fn empty_catalog_has_no_winner() {
        assert_eq!(
            pick_reward(&[], 0.4).unwrap_err(),
            EngineError::NoActiveRewards
        );
    }
}
