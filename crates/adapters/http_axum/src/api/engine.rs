//! Action loop controls.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;

use azerus_app::ports::{ActionExecutor, RecoverySteps, TriggerSourceControl};
use azerus_domain::status::EngineStatus;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for changing the action rate.
#[derive(Deserialize)]
pub struct SetRateRequest {
    /// Actions per second.
    pub rate: f64,
}

/// `POST /api/engine/toggle`
pub async fn toggle<A, R, S>(State(state): State<AppState<A, R, S>>) -> Json<EngineStatus>
where
    A: ActionExecutor + 'static,
    R: RecoverySteps + 'static,
    S: TriggerSourceControl + 'static,
{
    let running = state.coordinator.toggle().await;
    tracing::info!(running, "action loop toggled over HTTP");
    Json(state.coordinator.engine().status())
}

/// `PUT /api/engine/rate`
pub async fn set_rate<A, R, S>(
    State(state): State<AppState<A, R, S>>,
    Json(req): Json<SetRateRequest>,
) -> Result<Json<EngineStatus>, ApiError>
where
    A: ActionExecutor + 'static,
    R: RecoverySteps + 'static,
    S: TriggerSourceControl + 'static,
{
    state.coordinator.set_rate(req.rate)?;
    Ok(Json(state.coordinator.engine().status()))
}
