//! Manual recovery trigger.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use azerus_app::ports::{ActionExecutor, RecoverySteps, TriggerSourceControl};
use azerus_domain::recovery::RecoveryAttempt;

use crate::state::AppState;

/// Possible responses from the trigger endpoint.
pub enum TriggerResponse {
    /// The sequence ran; the body carries its outcome.
    Completed(Json<RecoveryAttempt>),
    /// Another sequence held the guard.
    Dropped(Json<RecoveryAttempt>),
}

impl IntoResponse for TriggerResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Completed(json) => json.into_response(),
            Self::Dropped(json) => (StatusCode::CONFLICT, json).into_response(),
        }
    }
}

/// `POST /api/recovery/trigger`
///
/// Runs the whole sequence before responding. A client that disconnects
/// early does not cancel it.
pub async fn trigger<A, R, S>(State(state): State<AppState<A, R, S>>) -> TriggerResponse
where
    A: ActionExecutor + 'static,
    R: RecoverySteps + 'static,
    S: TriggerSourceControl + 'static,
{
    match state.coordinator.manual_trigger().await {
        attempt @ RecoveryAttempt::Completed(_) => TriggerResponse::Completed(Json(attempt)),
        attempt @ RecoveryAttempt::Dropped => TriggerResponse::Dropped(Json(attempt)),
    }
}
