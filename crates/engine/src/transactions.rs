//! Transaction record primitives.
//!
//! A `Transaction` is the append-only audit record of a ledger-affecting
//! operation. Rows are created at the moment the operation is requested and
//! never mutated afterwards, except for `status`, which may transition once
//! from `pending` to a terminal state (topup settlement).

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Topup,
    Purchase,
    Refund,
    Bonus,
    PointsEarned,
    PointsRedeemed,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Topup => "topup",
            Self::Purchase => "purchase",
            Self::Refund => "refund",
            Self::Bonus => "bonus",
            Self::PointsEarned => "points_earned",
            Self::PointsRedeemed => "points_redeemed",
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "topup" => Ok(Self::Topup),
            "purchase" => Ok(Self::Purchase),
            "refund" => Ok(Self::Refund),
            "bonus" => Ok(Self::Bonus),
            "points_earned" => Ok(Self::PointsEarned),
            "points_redeemed" => Ok(Self::PointsRedeemed),
            other => Err(EngineError::InvalidInput(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Cancelled,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        }
    }

    /// Terminal statuses never transition again.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl TryFrom<&str> for TransactionStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            "failed" => Ok(Self::Failed),
            other => Err(EngineError::InvalidInput(format!(
                "invalid transaction status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub account_id: Uuid,
    pub kind: TransactionKind,
    /// Signed monetary delta in minor units; zero for points-only records.
    pub amount_minor: i64,
    /// Supplementary monetary credit granted on top of `amount_minor`.
    pub bonus_minor: i64,
    /// Signed points delta; zero for money-only records.
    pub points: i64,
    pub status: TransactionStatus,
    pub payment_method: Option<String>,
    pub payment_ref: Option<String>,
    pub note: Option<String>,
    pub idempotency_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        account_id: Uuid,
        kind: TransactionKind,
        amount_minor: i64,
        bonus_minor: i64,
        points: i64,
        status: TransactionStatus,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if bonus_minor < 0 {
            return Err(EngineError::InvalidInput(
                "bonus_minor must be >= 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            account_id,
            kind,
            amount_minor,
            bonus_minor,
            points,
            status,
            payment_method: None,
            payment_ref: None,
            note: None,
            idempotency_key: None,
            created_at,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub account_id: String,
    pub kind: String,
    pub amount_minor: i64,
    pub bonus_minor: i64,
    pub points: i64,
    pub status: String,
    pub payment_method: Option<String>,
    pub payment_ref: Option<String>,
    pub note: Option<String>,
    pub idempotency_key: Option<String>,
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

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            account_id: ActiveValue::Set(tx.account_id.to_string()),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            amount_minor: ActiveValue::Set(tx.amount_minor),
            bonus_minor: ActiveValue::Set(tx.bonus_minor),
            points: ActiveValue::Set(tx.points),
            status: ActiveValue::Set(tx.status.as_str().to_string()),
            payment_method: ActiveValue::Set(tx.payment_method.clone()),
            payment_ref: ActiveValue::Set(tx.payment_ref.clone()),
            note: ActiveValue::Set(tx.note.clone()),
            idempotency_key: ActiveValue::Set(tx.idempotency_key.clone()),
            created_at: ActiveValue::Set(tx.created_at),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::NotFound("transaction not exists".to_string()))?,
            account_id: Uuid::parse_str(&model.account_id)
                .map_err(|_| EngineError::NotFound("account not exists".to_string()))?,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            amount_minor: model.amount_minor,
            bonus_minor: model.bonus_minor,
            points: model.points,
            status: TransactionStatus::try_from(model.status.as_str())?,
            payment_method: model.payment_method,
            payment_ref: model.payment_ref,
            note: model.note,
            idempotency_key: model.idempotency_key,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_str() {
        for kind in [
            TransactionKind::Topup,
            TransactionKind::Purchase,
            TransactionKind::Refund,
            TransactionKind::Bonus,
            TransactionKind::PointsEarned,
            TransactionKind::PointsRedeemed,
        ] {
            assert_eq!(TransactionKind::try_from(kind.as_str()).unwrap(), kind);
        }
    }

    #[test]
    fn only_pending_is_not_terminal() {
        assert!(!TransactionStatus::Pending.is_terminal());
        assert!(TransactionStatus::Completed.is_terminal());
        assert!(TransactionStatus::Cancelled.is_terminal());
        assert!(TransactionStatus::Failed.is_terminal());
    }

    #[test]
    fn negative_bonus_is_rejected() {
        let err = Transaction::new(
            Uuid::new_v4(),
            TransactionKind::Topup,
            1000,
            -1,
            0,
            TransactionStatus::Pending,
            chrono::Utc::now(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidInput("bonus_minor must be >= 0".to_string())
        );
    }
}
