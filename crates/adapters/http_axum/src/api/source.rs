//! Trigger source endpoints.

use std::path::PathBuf;

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use azerus_app::ports::{ActionExecutor, RecoverySteps, TriggerSourceControl};
use azerus_domain::error::ValidationError;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for repointing the watched log.
#[derive(Deserialize)]
pub struct SetSourceRequest {
    pub path: String,
}

/// Currently watched log, if any.
#[derive(Serialize)]
pub struct SourceResponse {
    pub path: Option<String>,
}

impl SourceResponse {
    fn from_source(path: Option<PathBuf>) -> Self {
        Self {
            path: path.map(|p| p.display().to_string()),
        }
    }
}

/// `GET /api/trigger-source`
pub async fn get<A, R, S>(State(state): State<AppState<A, R, S>>) -> Json<SourceResponse>
where
    A: ActionExecutor + 'static,
    R: RecoverySteps + 'static,
    S: TriggerSourceControl + 'static,
{
    Json(SourceResponse::from_source(state.trigger_source.source()))
}

/// `PUT /api/trigger-source`
///
/// Accessibility of the file is not checked here; the tail picks it up on
/// its next poll.
pub async fn set<A, R, S>(
    State(state): State<AppState<A, R, S>>,
    Json(req): Json<SetSourceRequest>,
) -> Result<Json<SourceResponse>, ApiError>
where
    A: ActionExecutor + 'static,
    R: RecoverySteps + 'static,
    S: TriggerSourceControl + 'static,
{
    let path = req.path.trim();
    if path.is_empty() {
        return Err(ValidationError::EmptySourcePath.into());
    }
    state.trigger_source.set_source(PathBuf::from(path));
    Ok(Json(SourceResponse::from_source(state.trigger_source.source())))
}
