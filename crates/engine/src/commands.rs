//! Command structs for engine operations.
//!
//! These types group parameters for write operations (credit/debit, topup,
//! catalog upsert), keeping call sites readable and giving admin-facing
//! input a strictly validated shape before it reaches the ledger.

use uuid::Uuid;

use crate::{RewardKind, TransactionKind};

/// Change a monetary balance by a positive amount of minor units.
///
/// The same command feeds both `credit` and `debit`; `kind` names the flow
/// that caused the change and ends up on the transaction record.
#[derive(Clone, Debug)]
pub struct BalanceChange {
    pub account_id: Uuid,
    pub amount_minor: i64,
    pub kind: TransactionKind,
    pub note: Option<String>,
    pub idempotency_key: Option<String>,
}

impl BalanceChange {
    #[must_use]
    pub fn new(account_id: Uuid, amount_minor: i64, kind: TransactionKind) -> Self {
        Self {
            account_id,
            amount_minor,
            kind,
            note: None,
            idempotency_key: None,
        }
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    #[must_use]
    pub fn idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }
}

/// Change a points counter by a positive amount.
#[derive(Clone, Debug)]
pub struct PointsChange {
    pub account_id: Uuid,
    pub points: i64,
    pub kind: TransactionKind,
    pub note: Option<String>,
    pub idempotency_key: Option<String>,
}

impl PointsChange {
    #[must_use]
    pub fn new(account_id: Uuid, points: i64, kind: TransactionKind) -> Self {
        Self {
            account_id,
            points,
            kind,
            note: None,
            idempotency_key: None,
        }
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    #[must_use]
    pub fn idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }
}

/// Record a pending topup on behalf of the payment collaborator.
///
/// No balance changes here: money lands only when the topup is settled as
/// completed.
#[derive(Clone, Debug)]
pub struct TopupCmd {
    pub account_id: Uuid,
    pub amount_minor: i64,
    /// Supplementary credit granted on settlement (promotions), `>= 0`.
    pub bonus_minor: i64,
    pub payment_method: Option<String>,
    pub payment_ref: Option<String>,
    pub idempotency_key: Option<String>,
}

impl TopupCmd {
    #[must_use]
    pub fn new(account_id: Uuid, amount_minor: i64) -> Self {
        Self {
            account_id,
            amount_minor,
            bonus_minor: 0,
            payment_method: None,
            payment_ref: None,
            idempotency_key: None,
        }
    }

    #[must_use]
    pub fn bonus_minor(mut self, bonus_minor: i64) -> Self {
        self.bonus_minor = bonus_minor;
        self
    }

    #[must_use]
    pub fn payment_method(mut self, method: impl Into<String>) -> Self {
        self.payment_method = Some(method.into());
        self
    }

    #[must_use]
    pub fn payment_ref(mut self, reference: impl Into<String>) -> Self {
        self.payment_ref = Some(reference.into());
        self
    }

    #[must_use]
    pub fn idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }
}

/// Create or update a reward catalog entry.
#[derive(Clone, Debug)]
pub struct RewardUpsertCmd {
    /// `None` creates a new entry; `Some` updates an existing one.
    pub id: Option<Uuid>,
    pub name: String,
    pub kind: RewardKind,
    pub value: i64,
    pub probability: f64,
    pub color: String,
    pub is_active: bool,
}
