//! Manual adjustment API endpoints (admin console surface)
//!
//! The console never writes `balance_minor`/`points` columns: both
//! endpoints route through the ledger credit/debit primitives, so manual
//! edits obey the same non-negativity invariant and leave the same audit
//! trail as every other flow.

use api_types::admin::{BalanceAdjust, BalanceAdjusted, PointsAdjust, PointsAdjusted};
use axum::{Extension, Json, extract::State};

use crate::{ServerError, server::ServerState};
use engine::{BalanceChange, PointsChange, TransactionKind, accounts};

/// Handle `POST /admin/balance`: positive amounts credit, negative debit.
/// Both directions are recorded as `bonus` adjustments with a signed delta.
pub async fn adjust_balance(
    Extension(_account): Extension<accounts::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<BalanceAdjust>,
) -> Result<Json<BalanceAdjusted>, ServerError> {
    if payload.amount_minor == 0 {
        return Err(ServerError::Generic(
            "amount_minor must not be zero".to_string(),
        ));
    }

    let mut cmd = BalanceChange::new(
        payload.account_id,
        payload.amount_minor.abs(),
        TransactionKind::Bonus,
    );
    if let Some(note) = payload.note {
        cmd = cmd.note(note);
    }
    if let Some(key) = payload.idempotency_key {
        cmd = cmd.idempotency_key(key);
    }

    let balance_minor = if payload.amount_minor > 0 {
        state.engine.credit(cmd).await?
    } else {
        state.engine.debit(cmd).await?
    };

    Ok(Json(BalanceAdjusted { balance_minor }))
}

/// Handle `POST /admin/points`: positive amounts credit, negative debit.
pub async fn adjust_points(
    Extension(_account): Extension<accounts::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<PointsAdjust>,
) -> Result<Json<PointsAdjusted>, ServerError> {
    if payload.points == 0 {
        return Err(ServerError::Generic("points must not be zero".to_string()));
    }

    let kind = if payload.points > 0 {
        TransactionKind::PointsEarned
    } else {
        TransactionKind::PointsRedeemed
    };
    let mut cmd = PointsChange::new(payload.account_id, payload.points.abs(), kind);
    if let Some(note) = payload.note {
        cmd = cmd.note(note);
    }
    if let Some(key) = payload.idempotency_key {
        cmd = cmd.idempotency_key(key);
    }

    let points = if payload.points > 0 {
        state.engine.credit_points(cmd).await?
    } else {
        state.engine.debit_points(cmd).await?
    };

    Ok(Json(PointsAdjusted { points }))
}
