//! Reward catalog API endpoints (admin surface)

use api_types::reward::{RewardKind as ApiRewardKind, RewardUpsert, RewardView, RewardsResponse};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, spin::map_reward_kind};
use engine::{RewardUpsertCmd, accounts};

fn map_kind(kind: ApiRewardKind) -> engine::RewardKind {
    match kind {
        ApiRewardKind::Points => engine::RewardKind::Points,
        ApiRewardKind::Balance => engine::RewardKind::Balance,
    }
}

fn map_view(reward: engine::Reward) -> RewardView {
    RewardView {
        id: reward.id,
        name: reward.name,
        kind: map_reward_kind(reward.kind),
        value: reward.value,
        probability: reward.probability,
        color: reward.color,
        is_active: reward.is_active,
    }
}

/// Handle `GET /rewards`: the whole catalog plus the active-probability
/// sum, so the console can warn when it deviates from 1.
pub async fn list(
    Extension(_account): Extension<accounts::Model>,
    State(state): State<ServerState>,
) -> Result<Json<RewardsResponse>, ServerError> {
    let rewards = state.engine.list_rewards().await?;
    let probability_sum = rewards
        .iter()
        .filter(|reward| reward.is_active)
        .map(|reward| reward.probability)
        .sum();

    Ok(Json(RewardsResponse {
        rewards: rewards.into_iter().map(map_view).collect(),
        probability_sum,
    }))
}

/// Handle `POST /rewards` (create or update).
pub async fn upsert(
    Extension(_account): Extension<accounts::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<RewardUpsert>,
) -> Result<Json<RewardView>, ServerError> {
    let cmd = RewardUpsertCmd {
        id: payload.id,
        name: payload.name,
        kind: map_kind(payload.kind),
        value: payload.value,
        probability: payload.probability,
        color: payload.color,
        is_active: payload.is_active.unwrap_or(true),
    };
    let reward = state.engine.upsert_reward(cmd).await?;
    Ok(Json(map_view(reward)))
}

/// Handle `DELETE /rewards/{id}`.
pub async fn remove(
    Extension(_account): Extension<accounts::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_reward(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
