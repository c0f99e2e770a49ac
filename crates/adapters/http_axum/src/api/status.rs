//! Status snapshot endpoint, polled by presentation layers.

use axum::Json;
use axum::extract::State;

use azerus_app::ports::{ActionExecutor, RecoverySteps, TriggerSourceControl};
use azerus_domain::status::StatusSnapshot;

use crate::state::AppState;

/// `GET /api/status`
pub async fn get<A, R, S>(State(state): State<AppState<A, R, S>>) -> Json<StatusSnapshot>
where
    A: ActionExecutor + 'static,
    R: RecoverySteps + 'static,
    S: TriggerSourceControl + 'static,
{
    Json(state.coordinator.status())
}
