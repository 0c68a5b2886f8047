//! Profile API endpoints

use api_types::profile::{ProfileResponse, ProfileUpdate};
use axum::{Extension, Json, extract::State, http::StatusCode};

use crate::{ServerError, account_uuid, server::ServerState};
use engine::accounts;

/// Handle `GET /profile` (cache-backed snapshot).
pub async fn get(
    Extension(account): Extension<accounts::Model>,
    State(state): State<ServerState>,
) -> Result<Json<ProfileResponse>, ServerError> {
    let account_id = account_uuid(&account)?;
    let snapshot = state.engine.profile(account_id).await?;

    Ok(Json(ProfileResponse {
        id: snapshot.id,
        username: snapshot.username,
        avatar: snapshot.avatar,
        balance_minor: snapshot.balance_minor,
        points: snapshot.points,
        orders_count: snapshot.orders_count,
        total_spent_minor: snapshot.total_spent_minor,
        unread_notifications: snapshot.unread_notifications,
    }))
}

/// Handle `PATCH /profile`. Avatar is the only editable field; the update
/// invalidates the cached snapshot and never touches ledger values.
pub async fn update(
    Extension(account): Extension<accounts::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ProfileUpdate>,
) -> Result<StatusCode, ServerError> {
    let account_id = account_uuid(&account)?;
    state.engine.update_avatar(account_id, payload.avatar).await?;
    Ok(StatusCode::NO_CONTENT)
}
