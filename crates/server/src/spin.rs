//! Lucky wheel API endpoint

use api_types::reward::RewardKind as ApiRewardKind;
use api_types::spin::{RewardWon, SpinResponse};
use axum::{Extension, Json, extract::State};

use crate::{ServerError, account_uuid, server::ServerState};
use engine::accounts;

pub(crate) fn map_reward_kind(kind: engine::RewardKind) -> ApiRewardKind {
    match kind {
        engine::RewardKind::Points => ApiRewardKind::Points,
        engine::RewardKind::Balance => ApiRewardKind::Balance,
    }
}

/// Handle `POST /spin`.
pub async fn spin(
    Extension(account): Extension<accounts::Model>,
    State(state): State<ServerState>,
) -> Result<Json<SpinResponse>, ServerError> {
    let account_id = account_uuid(&account)?;
    let outcome = state.engine.spin(account_id).await?;

    Ok(Json(SpinResponse {
        reward: RewardWon {
            name: outcome.reward.name,
            kind: map_reward_kind(outcome.reward.kind),
            value: outcome.reward.value,
        },
        balance_minor: outcome.balance_minor,
        points: outcome.points,
    }))
}
