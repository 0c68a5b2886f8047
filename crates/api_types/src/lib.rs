use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod profile {
    use super::*;

    /// Cache-backed profile snapshot served on `GET /profile`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProfileResponse {
        pub id: Uuid,
        pub username: String,
        pub avatar: Option<String>,
        pub balance_minor: i64,
        pub points: i64,
        pub orders_count: u64,
        pub total_spent_minor: i64,
        pub unread_notifications: u64,
    }

    /// Request body for `PATCH /profile` (avatar is the only editable
    /// field on this surface).
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProfileUpdate {
        pub avatar: Option<String>,
    }
}

pub mod reward {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum RewardKind {
        Points,
        Balance,
    }

    /// Request body for creating/updating a catalog entry.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct RewardUpsert {
        /// Omitted on create, set on update.
        pub id: Option<Uuid>,
        pub name: String,
        pub kind: RewardKind,
        pub value: i64,
        pub probability: f64,
        pub color: String,
        /// Defaults to true on create.
        pub is_active: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RewardView {
        pub id: Uuid,
        pub name: String,
        pub kind: RewardKind,
        pub value: i64,
        pub probability: f64,
        pub color: String,
        pub is_active: bool,
    }

    /// Catalog listing. `probability_sum` is surfaced so the admin console
    /// can warn when the active weights do not sum to 1.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct RewardsResponse {
        pub rewards: Vec<RewardView>,
        pub probability_sum: f64,
    }
}

pub mod spin {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RewardWon {
        pub name: String,
        pub kind: super::reward::RewardKind,
        pub value: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SpinResponse {
        pub reward: RewardWon,
        pub balance_minor: i64,
        pub points: i64,
    }
}

pub mod transaction {
    use super::*;

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

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionStatus {
        Pending,
        Completed,
        Cancelled,
        Failed,
    }

    /// Query parameters for `GET /transactions`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionList {
        pub limit: Option<u64>,
        /// Opaque pagination cursor (base64), from `next_cursor`.
        ///
        /// Newest → older pagination.
        pub cursor: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub kind: TransactionKind,
        pub amount_minor: i64,
        pub bonus_minor: i64,
        pub points: i64,
        pub status: TransactionStatus,
        pub payment_method: Option<String>,
        pub payment_ref: Option<String>,
        pub note: Option<String>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionListResponse {
        pub transactions: Vec<TransactionView>,
        pub next_cursor: Option<String>,
    }
}

pub mod topup {
    use super::*;

    /// Request body for `POST /topup` (payment collaborator surface).
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TopupNew {
        pub amount_minor: i64,
        pub bonus_minor: Option<i64>,
        pub payment_method: Option<String>,
        pub payment_ref: Option<String>,
        pub idempotency_key: Option<String>,
    }

    /// Request body for `POST /topup/{id}/settle`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TopupSettle {
        pub outcome: super::transaction::TransactionStatus,
    }
}

pub mod admin {
    use super::*;

    /// Manual balance adjustment; positive credits, negative debits.
    /// Routed through the ledger primitives, never written directly.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceAdjust {
        pub account_id: Uuid,
        pub amount_minor: i64,
        pub note: Option<String>,
        pub idempotency_key: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceAdjusted {
        pub balance_minor: i64,
    }

    /// Manual points adjustment; positive credits, negative debits.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct PointsAdjust {
        pub account_id: Uuid,
        pub points: i64,
        pub note: Option<String>,
        pub idempotency_key: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PointsAdjusted {
        pub points: i64,
    }
}
