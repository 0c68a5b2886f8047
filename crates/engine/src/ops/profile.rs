//! Profile / dashboard aggregation (read path).
//!
//! Composes the current ledger values with aggregates over completed
//! purchases and the unread-notification count. Read-through cached: the
//! cache only accelerates this query and is invalidated by every ledger
//! mutation, so a hit is never older than the latest mutation.

use chrono::Utc;
use uuid::Uuid;

use sea_orm::{ActiveValue, PaginatorTrait, QueryFilter, Statement, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{
    CacheKey, EngineError, PROFILE_CACHE_TTL, ResultEngine, TransactionKind, TransactionStatus,
    accounts, notifications,
};

use super::{Engine, normalize_optional_text};

/// Denormalized profile snapshot, as cached and as served.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    pub id: Uuid,
    pub username: String,
    pub avatar: Option<String>,
    pub balance_minor: i64,
    pub points: i64,
    pub orders_count: u64,
    pub total_spent_minor: i64,
    pub unread_notifications: u64,
}

impl Engine {
    /// Returns the profile snapshot, from cache when fresh.
    pub async fn profile(&self, account_id: Uuid) -> ResultEngine<ProfileSnapshot> {
        let key = CacheKey::profile(account_id);
        if let Some(snapshot) = self.cache.get::<ProfileSnapshot>(&key) {
            return Ok(snapshot);
        }
        let snapshot = self.load_profile(account_id).await?;
        self.cache.set(&key, &snapshot, PROFILE_CACHE_TTL);
        Ok(snapshot)
    }

    async fn load_profile(&self, account_id: Uuid) -> ResultEngine<ProfileSnapshot> {
        let account = accounts::Entity::find_by_id(account_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound("account not exists".to_string()))?;

        // Purchases store negative deltas; spent is their absolute sum.
        let backend = self.database.get_database_backend();
        let stmt = Statement::from_sql_and_values(
            backend,
            "SELECT COUNT(*) AS orders, COALESCE(SUM(-amount_minor), 0) AS spent \
             FROM transactions \
             WHERE account_id = ? AND kind = ? AND status = ?",
            vec![
                account_id.to_string().into(),
                TransactionKind::Purchase.as_str().into(),
                TransactionStatus::Completed.as_str().into(),
            ],
        );
        let row = self.database.query_one(stmt).await?;
        let orders_count: i64 = row
            .as_ref()
            .and_then(|r| r.try_get("", "orders").ok())
            .unwrap_or(0);
        let total_spent_minor: i64 = row
            .as_ref()
            .and_then(|r| r.try_get("", "spent").ok())
            .unwrap_or(0);

        let unread_notifications = notifications::Entity::find()
            .filter(notifications::Column::AccountId.eq(account_id.to_string()))
            .filter(notifications::Column::ReadAt.is_null())
            .count(&self.database)
            .await?;

        Ok(ProfileSnapshot {
            id: account_id,
            username: account.username,
            avatar: account.avatar,
            balance_minor: account.balance_minor,
            points: account.points,
            orders_count: orders_count.max(0) as u64,
            total_spent_minor,
            unread_notifications,
        })
    }

    /// Updates the avatar and invalidates the cached snapshot. Not a
    /// balance mutation.
    pub async fn update_avatar(
        &self,
        account_id: Uuid,
        avatar: Option<String>,
    ) -> ResultEngine<()> {
        let avatar = normalize_optional_text(avatar.as_deref());
        let model = accounts::Entity::find_by_id(account_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound("account not exists".to_string()))?;
        let mut active: accounts::ActiveModel = model.into();
        active.avatar = ActiveValue::Set(avatar);
        active.updated_at = ActiveValue::Set(Utc::now());
        active.update(&self.database).await?;
        self.cache.delete(&CacheKey::profile(account_id));
        Ok(())
    }
}
