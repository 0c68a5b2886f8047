use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;
use uuid::Uuid;

use serde::Serialize;
pub use server::{run, run_with_listener, spawn_with_listener};

mod admin;
mod profile;
mod rewards;
mod server;
mod spin;
mod topup;
mod transactions;

pub mod types {
    pub mod profile {
        pub use api_types::profile::{ProfileResponse, ProfileUpdate};
    }

    pub mod reward {
        pub use api_types::reward::{RewardKind, RewardUpsert, RewardView, RewardsResponse};
    }

    pub mod spin {
        pub use api_types::spin::{RewardWon, SpinResponse};
    }

    pub mod transaction {
        pub use api_types::transaction::{
            TransactionKind, TransactionList, TransactionListResponse, TransactionStatus,
            TransactionView,
        };
    }

    pub mod topup {
        pub use api_types::topup::{TopupNew, TopupSettle};
    }

    pub mod admin {
        pub use api_types::admin::{BalanceAdjust, BalanceAdjusted, PointsAdjust, PointsAdjusted};
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

/// Stable machine-readable error payload.
#[derive(Serialize)]
struct Error {
    kind: &'static str,
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::NotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InsufficientFunds(_)
        | EngineError::NoActiveRewards
        | EngineError::InvalidInput(_)
        | EngineError::InvalidCursor(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn kind_for_engine_error(err: &EngineError) -> &'static str {
    match err {
        EngineError::NotFound(_) => "not_found",
        EngineError::InsufficientFunds(_) => "insufficient_funds",
        EngineError::NoActiveRewards => "no_active_rewards",
        EngineError::ExistingKey(_) => "conflict",
        EngineError::InvalidInput(_) | EngineError::InvalidCursor(_) => "validation",
        EngineError::Database(_) => "internal",
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, kind, error) = match self {
            ServerError::Engine(err) => (
                status_for_engine_error(&err),
                kind_for_engine_error(&err),
                message_for_engine_error(err),
            ),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, "validation", err),
        };

        (status, Json(Error { kind, error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

/// The auth middleware stores the raw account row; handlers need its uuid.
pub(crate) fn account_uuid(account: &engine::accounts::Model) -> Result<Uuid, ServerError> {
    Uuid::parse_str(&account.id)
        .map_err(|_| ServerError::Generic("invalid account id".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::NotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflict_maps_to_409() {
        let res = ServerError::from(EngineError::ExistingKey("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_insufficient_funds_maps_to_422() {
        let res =
            ServerError::from(EngineError::InsufficientFunds("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn engine_no_active_rewards_maps_to_422() {
        let res = ServerError::from(EngineError::NoActiveRewards).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn engine_validation_maps_to_422() {
        let res = ServerError::from(EngineError::InvalidInput("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn kinds_are_stable_tokens() {
        assert_eq!(
            kind_for_engine_error(&EngineError::NotFound("x".to_string())),
            "not_found"
        );
        assert_eq!(
            kind_for_engine_error(&EngineError::InsufficientFunds("x".to_string())),
            "insufficient_funds"
        );
        assert_eq!(
            kind_for_engine_error(&EngineError::NoActiveRewards),
            "no_active_rewards"
        );
        assert_eq!(
            kind_for_engine_error(&EngineError::InvalidInput("x".to_string())),
            "validation"
        );
    }
}
