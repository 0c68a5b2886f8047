//! Reward history records.
//!
//! One row per successful spin, never mutated. `reward_id` is a reference,
//! not ownership: catalog entries may be edited or deleted independently,
//! so the row intentionally carries no foreign key to `rewards`.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinRecord {
    pub id: Uuid,
    pub account_id: Uuid,
    pub reward_id: Uuid,
    /// Points spent to perform the spin.
    pub cost_points: i64,
    pub created_at: DateTime<Utc>,
}

impl SpinRecord {
    pub fn new(
        account_id: Uuid,
        reward_id: Uuid,
        cost_points: i64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            reward_id,
            cost_points,
            created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "reward_history")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub account_id: String,
    pub reward_id: String,
    pub cost_points: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Accounts,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&SpinRecord> for ActiveModel {
    fn from(record: &SpinRecord) -> Self {
        Self {
            id: ActiveValue::Set(record.id.to_string()),
            account_id: ActiveValue::Set(record.account_id.to_string()),
            reward_id: ActiveValue::Set(record.reward_id.to_string()),
            cost_points: ActiveValue::Set(record.cost_points),
            created_at: ActiveValue::Set(record.created_at),
        }
    }
}

impl TryFrom<Model> for SpinRecord {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::NotFound("spin record not exists".to_string()))?,
            account_id: Uuid::parse_str(&model.account_id)
                .map_err(|_| EngineError::NotFound("account not exists".to_string()))?,
            reward_id: Uuid::parse_str(&model.reward_id)
                .map_err(|_| EngineError::NotFound("reward not exists".to_string()))?,
            cost_points: model.cost_points,
            created_at: model.created_at,
        })
    }
}
