//! Account primitives.
//!
//! An `Account` carries the two ledger values of a shop user: the monetary
//! `balance_minor` (minor currency units) and the loyalty `points` counter.
//! Both are owned exclusively by the ledger: no other component writes them
//! directly, and every mutation goes through the credit/debit operations.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    /// Stable identifier, generated once and persisted.
    pub id: Uuid,
    pub username: String,
    pub avatar: Option<String>,
    pub balance_minor: i64,
    pub points: i64,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn new(username: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            avatar: None,
            balance_minor: 0,
            points: 0,
            updated_at: created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub username: String,
    pub password: String,
    pub avatar: Option<String>,
    pub balance_minor: i64,
    pub points: i64,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
    #[sea_orm(has_many = "super::reward_history::Entity")]
    RewardHistory,
    #[sea_orm(has_many = "super::notifications::Entity")]
    Notifications,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::reward_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RewardHistory.def()
    }
}

impl Related<super::notifications::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notifications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Account> for ActiveModel {
    fn from(account: &Account) -> Self {
        Self {
            id: ActiveValue::Set(account.id.to_string()),
            username: ActiveValue::Set(account.username.clone()),
            password: ActiveValue::NotSet,
            avatar: ActiveValue::Set(account.avatar.clone()),
            balance_minor: ActiveValue::Set(account.balance_minor),
            points: ActiveValue::Set(account.points),
            updated_at: ActiveValue::Set(account.updated_at),
        }
    }
}

impl TryFrom<Model> for Account {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::NotFound("account not exists".to_string()))?,
            username: model.username,
            avatar: model.avatar,
            balance_minor: model.balance_minor,
            points: model.points,
            updated_at: model.updated_at,
        })
    }
}
