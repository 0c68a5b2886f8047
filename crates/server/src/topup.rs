//! Topup API endpoints (payment collaborator surface)
//!
//! The gateway records a pending topup before collecting money and settles
//! it exactly once afterwards; only a `completed` settlement credits the
//! ledger.

use api_types::topup::{TopupNew, TopupSettle};
use api_types::transaction::{TransactionStatus as ApiStatus, TransactionView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, account_uuid, server::ServerState, transactions::map_view};
use engine::{TopupCmd, TransactionStatus, accounts};

fn map_status(status: ApiStatus) -> TransactionStatus {
    match status {
        ApiStatus::Pending => TransactionStatus::Pending,
        ApiStatus::Completed => TransactionStatus::Completed,
        ApiStatus::Cancelled => TransactionStatus::Cancelled,
        ApiStatus::Failed => TransactionStatus::Failed,
    }
}

/// Handle `POST /topup`: create the pending record, no balance change.
pub async fn create(
    Extension(account): Extension<accounts::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<TopupNew>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let account_id = account_uuid(&account)?;

    let mut cmd = TopupCmd::new(account_id, payload.amount_minor);
    if let Some(bonus_minor) = payload.bonus_minor {
        cmd = cmd.bonus_minor(bonus_minor);
    }
    if let Some(method) = payload.payment_method {
        cmd = cmd.payment_method(method);
    }
    if let Some(reference) = payload.payment_ref {
        cmd = cmd.payment_ref(reference);
    }
    if let Some(key) = payload.idempotency_key {
        cmd = cmd.idempotency_key(key);
    }

    let tx = state.engine.record_topup(cmd).await?;
    Ok((StatusCode::CREATED, Json(map_view(tx))))
}

/// Handle `POST /topup/{id}/settle`.
pub async fn settle(
    Extension(_account): Extension<accounts::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TopupSettle>,
) -> Result<Json<TransactionView>, ServerError> {
    let tx = state
        .engine
        .settle_topup(id, map_status(payload.outcome))
        .await?;
    Ok(Json(map_view(tx)))
}
