//! Reward catalog administration.
//!
//! Infrequent, single-admin cadence: plain statements, no transactional
//! choreography. Validation happens before anything reaches storage.

use chrono::Utc;
use uuid::Uuid;

use sea_orm::{ActiveValue, QueryFilter, QueryOrder, prelude::*};

use crate::{EngineError, ResultEngine, Reward, RewardUpsertCmd, rewards};

use super::Engine;

/// Active rewards in the stable order the distributor walks them:
/// catalog insertion order.
pub(super) async fn load_active_rewards<C: ConnectionTrait>(db: &C) -> ResultEngine<Vec<Reward>> {
    let models = rewards::Entity::find()
        .filter(rewards::Column::IsActive.eq(true))
        .order_by_asc(rewards::Column::CreatedAt)
        .order_by_asc(rewards::Column::Id)
        .all(db)
        .await?;
    models.into_iter().map(Reward::try_from).collect()
}

impl Engine {
    /// Returns all `is_active` rewards in distributor order.
    pub async fn list_active_rewards(&self) -> ResultEngine<Vec<Reward>> {
        load_active_rewards(&self.database).await
    }

    /// Returns the whole catalog, active or not (admin surface).
    pub async fn list_rewards(&self) -> ResultEngine<Vec<Reward>> {
        let models = rewards::Entity::find()
            .order_by_asc(rewards::Column::CreatedAt)
            .order_by_asc(rewards::Column::Id)
            .all(&self.database)
            .await?;
        models.into_iter().map(Reward::try_from).collect()
    }

    /// Sum of the active probabilities.
    ///
    /// The catalog never blocks on this value; it is surfaced so the admin
    /// console can warn when it deviates from 1.
    pub async fn probability_sum(&self) -> ResultEngine<f64> {
        let rewards = self.list_active_rewards().await?;
        Ok(rewards.iter().map(|reward| reward.probability).sum())
    }

    /// Creates (`id: None`) or updates (`id: Some`) a catalog entry.
    pub async fn upsert_reward(&self, cmd: RewardUpsertCmd) -> ResultEngine<Reward> {
        match cmd.id {
            None => {
                let mut reward = Reward::new(
                    cmd.name,
                    cmd.kind,
                    cmd.value,
                    cmd.probability,
                    cmd.color,
                    Utc::now(),
                )?;
                reward.is_active = cmd.is_active;
                rewards::ActiveModel::from(&reward)
                    .insert(&self.database)
                    .await?;
                Ok(reward)
            }
            Some(id) => {
                let name = rewards::validate_name(&cmd.name)?;
                rewards::validate_probability(cmd.probability)?;
                rewards::validate_value(cmd.value)?;
                let color = rewards::validate_color(&cmd.color)?;

                let model = rewards::Entity::find_by_id(id.to_string())
                    .one(&self.database)
                    .await?
                    .ok_or_else(|| EngineError::NotFound("reward not exists".to_string()))?;
                let mut active: rewards::ActiveModel = model.into();
                active.name = ActiveValue::Set(name);
                active.kind = ActiveValue::Set(cmd.kind.as_str().to_string());
                active.value = ActiveValue::Set(cmd.value);
                active.probability = ActiveValue::Set(cmd.probability);
                active.color = ActiveValue::Set(color);
                active.is_active = ActiveValue::Set(cmd.is_active);
                let updated = active.update(&self.database).await?;
                Reward::try_from(updated)
            }
        }
    }

    /// Removes a catalog entry. History rows keep referring to the deleted
    /// id; they are snapshots, not owners.
    pub async fn delete_reward(&self, id: Uuid) -> ResultEngine<()> {
        let result = rewards::Entity::delete_by_id(id.to_string())
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::NotFound("reward not exists".to_string()));
        }
        Ok(())
    }
}
