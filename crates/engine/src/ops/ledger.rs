//! Atomic credit/debit primitives over `balance_minor` and `points`.
//!
//! The debit path is a single conditional write evaluated by the storage
//! layer (`UPDATE .. SET x = x - ? WHERE id = ? AND x >= ?`), never a
//! read-then-compare-then-write sequence in application code: two
//! concurrent debits against the same account serialize at the storage
//! layer and can never drive a value negative. The follow-up read that
//! distinguishes "account missing" from "insufficient funds" happens only
//! on the zero-rows-affected path.

use chrono::Utc;
use uuid::Uuid;

use sea_orm::sea_query::Expr;
use sea_orm::{DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*};

use crate::{
    BalanceChange, CacheKey, EngineError, PointsChange, ResultEngine, Transaction,
    TransactionStatus, accounts, transactions,
};

use super::{Engine, normalize_optional_text, with_tx};

impl Engine {
    /// Increases an account balance. Credits cannot fail on the ledger's
    /// own invariant; returns the new balance in minor units.
    pub async fn credit(&self, cmd: BalanceChange) -> ResultEngine<i64> {
        require_positive(cmd.amount_minor, "amount_minor")?;
        let new_balance = with_tx!(self, |db_tx| {
            if self.is_replay(&db_tx, cmd.account_id, cmd.idempotency_key.as_deref())
                .await?
            {
                let account = self.require_account(&db_tx, cmd.account_id).await?;
                Ok::<_, EngineError>(account.balance_minor)
            } else {
                self.apply_balance_credit(&db_tx, cmd.account_id, cmd.amount_minor)
                    .await?;
                let mut tx = Transaction::new(
                    cmd.account_id,
                    cmd.kind,
                    cmd.amount_minor,
                    0,
                    0,
                    TransactionStatus::Completed,
                    Utc::now(),
                )?;
                tx.note = normalize_optional_text(cmd.note.as_deref());
                tx.idempotency_key = cmd.idempotency_key.clone();
                self.record_transaction(&db_tx, &tx).await?;
                let account = self.require_account(&db_tx, cmd.account_id).await?;
                Ok(account.balance_minor)
            }
        })?;
        self.cache.delete(&CacheKey::profile(cmd.account_id));
        Ok(new_balance)
    }

    /// Decreases an account balance, only if the current balance covers the
    /// amount; fails with `InsufficientFunds` otherwise and leaves the
    /// balance untouched. Returns the new balance on success.
    pub async fn debit(&self, cmd: BalanceChange) -> ResultEngine<i64> {
        require_positive(cmd.amount_minor, "amount_minor")?;
        let new_balance = with_tx!(self, |db_tx| {
            if self.is_replay(&db_tx, cmd.account_id, cmd.idempotency_key.as_deref())
                .await?
            {
                let account = self.require_account(&db_tx, cmd.account_id).await?;
                Ok::<_, EngineError>(account.balance_minor)
            } else {
                self.apply_balance_debit(&db_tx, cmd.account_id, cmd.amount_minor)
                    .await?;
                let mut tx = Transaction::new(
                    cmd.account_id,
                    cmd.kind,
                    -cmd.amount_minor,
                    0,
                    0,
                    TransactionStatus::Completed,
                    Utc::now(),
                )?;
                tx.note = normalize_optional_text(cmd.note.as_deref());
                tx.idempotency_key = cmd.idempotency_key.clone();
                self.record_transaction(&db_tx, &tx).await?;
                let account = self.require_account(&db_tx, cmd.account_id).await?;
                Ok(account.balance_minor)
            }
        })?;
        self.cache.delete(&CacheKey::profile(cmd.account_id));
        Ok(new_balance)
    }

    /// Increases an account points counter. Returns the new counter.
    pub async fn credit_points(&self, cmd: PointsChange) -> ResultEngine<i64> {
        require_positive(cmd.points, "points")?;
        let new_points = with_tx!(self, |db_tx| {
            if self.is_replay(&db_tx, cmd.account_id, cmd.idempotency_key.as_deref())
                .await?
            {
                let account = self.require_account(&db_tx, cmd.account_id).await?;
                Ok::<_, EngineError>(account.points)
            } else {
                self.apply_points_credit(&db_tx, cmd.account_id, cmd.points)
                    .await?;
                let mut tx = Transaction::new(
                    cmd.account_id,
                    cmd.kind,
                    0,
                    0,
                    cmd.points,
                    TransactionStatus::Completed,
                    Utc::now(),
                )?;
                tx.note = normalize_optional_text(cmd.note.as_deref());
                tx.idempotency_key = cmd.idempotency_key.clone();
                self.record_transaction(&db_tx, &tx).await?;
                let account = self.require_account(&db_tx, cmd.account_id).await?;
                Ok(account.points)
            }
        })?;
        self.cache.delete(&CacheKey::profile(cmd.account_id));
        Ok(new_points)
    }

    /// Decreases an account points counter under the same conditional-write
    /// contract as [`debit`].
    ///
    /// [`debit`]: Engine::debit
    pub async fn debit_points(&self, cmd: PointsChange) -> ResultEngine<i64> {
        require_positive(cmd.points, "points")?;
        let new_points = with_tx!(self, |db_tx| {
            if self.is_replay(&db_tx, cmd.account_id, cmd.idempotency_key.as_deref())
                .await?
            {
                let account = self.require_account(&db_tx, cmd.account_id).await?;
                Ok::<_, EngineError>(account.points)
            } else {
                self.apply_points_debit(&db_tx, cmd.account_id, cmd.points)
                    .await?;
                let mut tx = Transaction::new(
                    cmd.account_id,
                    cmd.kind,
                    0,
                    0,
                    -cmd.points,
                    TransactionStatus::Completed,
                    Utc::now(),
                )?;
                tx.note = normalize_optional_text(cmd.note.as_deref());
                tx.idempotency_key = cmd.idempotency_key.clone();
                self.record_transaction(&db_tx, &tx).await?;
                let account = self.require_account(&db_tx, cmd.account_id).await?;
                Ok(account.points)
            }
        })?;
        self.cache.delete(&CacheKey::profile(cmd.account_id));
        Ok(new_points)
    }

    pub(super) async fn apply_balance_credit(
        &self,
        db_tx: &DatabaseTransaction,
        account_id: Uuid,
        amount_minor: i64,
    ) -> ResultEngine<()> {
        let result = accounts::Entity::update_many()
            .col_expr(
                accounts::Column::BalanceMinor,
                Expr::col(accounts::Column::BalanceMinor).add(amount_minor),
            )
            .col_expr(accounts::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(accounts::Column::Id.eq(account_id.to_string()))
            .exec(db_tx)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::NotFound("account not exists".to_string()));
        }
        Ok(())
    }

    pub(super) async fn apply_balance_debit(
        &self,
        db_tx: &DatabaseTransaction,
        account_id: Uuid,
        amount_minor: i64,
    ) -> ResultEngine<()> {
        let result = accounts::Entity::update_many()
            .col_expr(
                accounts::Column::BalanceMinor,
                Expr::col(accounts::Column::BalanceMinor).sub(amount_minor),
            )
            .col_expr(accounts::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(accounts::Column::Id.eq(account_id.to_string()))
            .filter(accounts::Column::BalanceMinor.gte(amount_minor))
            .exec(db_tx)
            .await?;
        if result.rows_affected == 0 {
            self.require_account(db_tx, account_id).await?;
            return Err(EngineError::InsufficientFunds(format!(
                "balance below {amount_minor}"
            )));
        }
        Ok(())
    }

    pub(super) async fn apply_points_credit(
        &self,
        db_tx: &DatabaseTransaction,
        account_id: Uuid,
        points: i64,
    ) -> ResultEngine<()> {
        let result = accounts::Entity::update_many()
            .col_expr(
                accounts::Column::Points,
                Expr::col(accounts::Column::Points).add(points),
            )
            .col_expr(accounts::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(accounts::Column::Id.eq(account_id.to_string()))
            .exec(db_tx)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::NotFound("account not exists".to_string()));
        }
        Ok(())
    }

    pub(super) async fn apply_points_debit(
        &self,
        db_tx: &DatabaseTransaction,
        account_id: Uuid,
        points: i64,
    ) -> ResultEngine<()> {
        let result = accounts::Entity::update_many()
            .col_expr(
                accounts::Column::Points,
                Expr::col(accounts::Column::Points).sub(points),
            )
            .col_expr(accounts::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(accounts::Column::Id.eq(account_id.to_string()))
            .filter(accounts::Column::Points.gte(points))
            .exec(db_tx)
            .await?;
        if result.rows_affected == 0 {
            self.require_account(db_tx, account_id).await?;
            return Err(EngineError::InsufficientFunds(format!(
                "points below {points}"
            )));
        }
        Ok(())
    }

    pub(super) async fn require_account(
        &self,
        db_tx: &DatabaseTransaction,
        account_id: Uuid,
    ) -> ResultEngine<accounts::Model> {
        accounts::Entity::find_by_id(account_id.to_string())
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::NotFound("account not exists".to_string()))
    }

    pub(super) async fn record_transaction(
        &self,
        db_tx: &DatabaseTransaction,
        tx: &Transaction,
    ) -> ResultEngine<()> {
        transactions::ActiveModel::from(tx).insert(db_tx).await?;
        Ok(())
    }

    pub(super) async fn keyed_transaction(
        &self,
        db_tx: &DatabaseTransaction,
        account_id: Uuid,
        key: &str,
    ) -> ResultEngine<Option<transactions::Model>> {
        let existing = transactions::Entity::find()
            .filter(transactions::Column::AccountId.eq(account_id.to_string()))
            .filter(transactions::Column::IdempotencyKey.eq(key.to_string()))
            .one(db_tx)
            .await?;
        Ok(existing)
    }

    /// A keyed command whose `(account_id, idempotency_key)` is already
    /// recorded is a replay: nothing gets re-applied.
    pub(super) async fn is_replay(
        &self,
        db_tx: &DatabaseTransaction,
        account_id: Uuid,
        idempotency_key: Option<&str>,
    ) -> ResultEngine<bool> {
        match idempotency_key {
            Some(key) => Ok(self.keyed_transaction(db_tx, account_id, key).await?.is_some()),
            None => Ok(false),
        }
    }
}

pub(super) fn require_positive(value: i64, label: &str) -> ResultEngine<()> {
    if value <= 0 {
        return Err(EngineError::InvalidInput(format!("{label} must be > 0")));
    }
    Ok(())
}
