//! Transaction history and the topup settlement surface.
//!
//! History is served newest first with an opaque `(created_at, id)` cursor.
//! Topups are the payment collaborator's interface: a pending record is
//! created up front, and money lands only when the collaborator settles it
//! as completed — through the same ledger primitive as every other credit.

use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::{
    ActiveValue, Condition, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*,
};

use crate::{
    CacheKey, EngineError, Notification, ResultEngine, TopupCmd, Transaction, TransactionKind,
    TransactionStatus, notifications, transactions,
};

use super::ledger::require_positive;
use super::{Engine, normalize_optional_text, with_tx};

/// Hard cap on one history page.
const MAX_PAGE_SIZE: u64 = 50;

#[derive(Clone, Debug, Serialize, Deserialize)]
struct HistoryCursor {
    created_at: DateTime<Utc>,
    transaction_id: String,
}

impl HistoryCursor {
    fn encode(&self) -> ResultEngine<String> {
        let bytes = serde_json::to_vec(self)
            .map_err(|_| EngineError::InvalidCursor("invalid history cursor".to_string()))?;
        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
    }

    fn decode(input: &str) -> ResultEngine<Self> {
        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(input)
            .map_err(|_| EngineError::InvalidCursor("invalid history cursor".to_string()))?;
        serde_json::from_slice(&bytes)
            .map_err(|_| EngineError::InvalidCursor("invalid history cursor".to_string()))
    }
}

impl Engine {
    /// Lists an account's transaction records, newest first.
    ///
    /// Returns `(records, next_cursor)`; `next_cursor` is `None` on the
    /// last page. `limit` is clamped to the page cap.
    pub async fn list_transactions(
        &self,
        account_id: Uuid,
        limit: u64,
        cursor: Option<&str>,
    ) -> ResultEngine<(Vec<Transaction>, Option<String>)> {
        let limit = limit.clamp(1, MAX_PAGE_SIZE);
        let mut query = transactions::Entity::find()
            .filter(transactions::Column::AccountId.eq(account_id.to_string()))
            .order_by_desc(transactions::Column::CreatedAt)
            .order_by_desc(transactions::Column::Id)
            .limit(limit + 1);

        if let Some(cursor) = cursor {
            let cursor = HistoryCursor::decode(cursor)?;
            query = query.filter(
                Condition::any()
                    .add(transactions::Column::CreatedAt.lt(cursor.created_at))
                    .add(
                        Condition::all()
                            .add(transactions::Column::CreatedAt.eq(cursor.created_at))
                            .add(transactions::Column::Id.lt(cursor.transaction_id.clone())),
                    ),
            );
        }

        let models = query.all(&self.database).await?;
        let has_more = models.len() as u64 > limit;

        let mut out = Vec::with_capacity(models.len().min(limit as usize));
        for model in models.into_iter().take(limit as usize) {
            out.push(Transaction::try_from(model)?);
        }

        let next_cursor = if has_more {
            out.last()
                .map(|tx| {
                    HistoryCursor {
                        created_at: tx.created_at,
                        transaction_id: tx.id.to_string(),
                    }
                    .encode()
                })
                .transpose()?
        } else {
            None
        };

        Ok((out, next_cursor))
    }

    /// Records a pending topup. No balance change happens here.
    pub async fn record_topup(&self, cmd: TopupCmd) -> ResultEngine<Transaction> {
        require_positive(cmd.amount_minor, "amount_minor")?;
        with_tx!(self, |db_tx| {
            if let Some(key) = cmd.idempotency_key.as_deref()
                && let Some(existing) = self.keyed_transaction(&db_tx, cmd.account_id, key).await?
            {
                return Ok(Transaction::try_from(existing)?);
            }

            self.require_account(&db_tx, cmd.account_id).await?;
            let mut tx = Transaction::new(
                cmd.account_id,
                TransactionKind::Topup,
                cmd.amount_minor,
                cmd.bonus_minor,
                0,
                TransactionStatus::Pending,
                Utc::now(),
            )?;
            tx.payment_method = normalize_optional_text(cmd.payment_method.as_deref());
            tx.payment_ref = normalize_optional_text(cmd.payment_ref.as_deref());
            tx.idempotency_key = cmd.idempotency_key.clone();
            self.record_transaction(&db_tx, &tx).await?;
            Ok(tx)
        })
    }

    /// Settles a pending topup exactly once.
    ///
    /// `completed` credits `amount + bonus` through the ledger primitive in
    /// the same transaction as the status transition; `cancelled`/`failed`
    /// only transition the status. Terminal records never transition again.
    pub async fn settle_topup(
        &self,
        transaction_id: Uuid,
        outcome: TransactionStatus,
    ) -> ResultEngine<Transaction> {
        if !outcome.is_terminal() {
            return Err(EngineError::InvalidInput(
                "settlement status must be terminal".to_string(),
            ));
        }
        let settled = with_tx!(self, |db_tx| {
            let model = transactions::Entity::find_by_id(transaction_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::NotFound("transaction not exists".to_string()))?;
            let tx = Transaction::try_from(model.clone())?;
            if tx.kind != TransactionKind::Topup {
                return Err(EngineError::InvalidInput(
                    "only topups can be settled".to_string(),
                ));
            }
            if tx.status != TransactionStatus::Pending {
                return Err(EngineError::InvalidInput(
                    "topup already settled".to_string(),
                ));
            }

            if outcome == TransactionStatus::Completed {
                self.apply_balance_credit(&db_tx, tx.account_id, tx.amount_minor + tx.bonus_minor)
                    .await?;
                let notification = Notification::new(
                    tx.account_id,
                    "Topup completed".to_string(),
                    Utc::now(),
                );
                notifications::ActiveModel::from(&notification)
                    .insert(&db_tx)
                    .await?;
            }

            let mut active: transactions::ActiveModel = model.into();
            active.status = ActiveValue::Set(outcome.as_str().to_string());
            let updated = active.update(&db_tx).await?;
            Ok::<_, EngineError>(Transaction::try_from(updated)?)
        })?;
        if settled.status == TransactionStatus::Completed {
            self.cache.delete(&CacheKey::profile(settled.account_id));
        }
        Ok(settled)
    }
}
