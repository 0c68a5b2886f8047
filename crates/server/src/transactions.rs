//! Transaction history API endpoints

use api_types::transaction::{
    TransactionKind as ApiKind, TransactionList, TransactionListResponse,
    TransactionStatus as ApiStatus, TransactionView,
};
use axum::{
    Extension, Json,
    extract::{Query, State},
};

use crate::{ServerError, account_uuid, server::ServerState};
use engine::accounts;

pub(crate) fn map_kind(kind: engine::TransactionKind) -> ApiKind {
    match kind {
        engine::TransactionKind::Topup => ApiKind::Topup,
        engine::TransactionKind::Purchase => ApiKind::Purchase,
        engine::TransactionKind::Refund => ApiKind::Refund,
        engine::TransactionKind::Bonus => ApiKind::Bonus,
        engine::TransactionKind::PointsEarned => ApiKind::PointsEarned,
        engine::TransactionKind::PointsRedeemed => ApiKind::PointsRedeemed,
    }
}

pub(crate) fn map_status(status: engine::TransactionStatus) -> ApiStatus {
    match status {
        engine::TransactionStatus::Pending => ApiStatus::Pending,
        engine::TransactionStatus::Completed => ApiStatus::Completed,
        engine::TransactionStatus::Cancelled => ApiStatus::Cancelled,
        engine::TransactionStatus::Failed => ApiStatus::Failed,
    }
}

pub(crate) fn map_view(tx: engine::Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        kind: map_kind(tx.kind),
        amount_minor: tx.amount_minor,
        bonus_minor: tx.bonus_minor,
        points: tx.points,
        status: map_status(tx.status),
        payment_method: tx.payment_method,
        payment_ref: tx.payment_ref,
        note: tx.note,
        created_at: tx.created_at,
    }
}

/// Handle `GET /transactions`: the caller's records, newest first, bounded.
pub async fn list(
    Extension(account): Extension<accounts::Model>,
    State(state): State<ServerState>,
    Query(payload): Query<TransactionList>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let account_id = account_uuid(&account)?;
    let limit = payload.limit.unwrap_or(50);

    let (transactions, next_cursor) = state
        .engine
        .list_transactions(account_id, limit, payload.cursor.as_deref())
        .await?;

    Ok(Json(TransactionListResponse {
        transactions: transactions.into_iter().map(map_view).collect(),
        next_cursor,
    }))
}
