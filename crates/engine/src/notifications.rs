//! Notifications (minimal entity).
//!
//! The profile aggregation only needs an unread count; rows are written by
//! the spin and topup-settlement paths.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub id: Uuid,
    pub account_id: Uuid,
    pub title: String,
    pub body: Option<String>,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(account_id: Uuid, title: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            title,
            body: None,
            read_at: None,
            created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub account_id: String,
    pub title: String,
    pub body: Option<String>,
    pub read_at: Option<DateTimeUtc>,
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

impl From<&Notification> for ActiveModel {
    fn from(notification: &Notification) -> Self {
        Self {
            id: ActiveValue::Set(notification.id.to_string()),
            account_id: ActiveValue::Set(notification.account_id.to_string()),
            title: ActiveValue::Set(notification.title.clone()),
            body: ActiveValue::Set(notification.body.clone()),
            read_at: ActiveValue::Set(notification.read_at),
            created_at: ActiveValue::Set(notification.created_at),
        }
    }
}
