//! JSON API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod engine;
#[allow(clippy::missing_errors_doc)]
pub mod recovery;
#[allow(clippy::missing_errors_doc)]
pub mod source;
pub mod status;

use axum::Router;
use axum::routing::{get, post, put};

use azerus_app::ports::{ActionExecutor, RecoverySteps, TriggerSourceControl};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<A, R, S>() -> Router<AppState<A, R, S>>
where
    A: ActionExecutor + 'static,
    R: RecoverySteps + 'static,
    S: TriggerSourceControl + 'static,
{
    Router::new()
        .route("/status", get(status::get::<A, R, S>))
        // Action loop
        .route("/engine/toggle", post(engine::toggle::<A, R, S>))
        .route("/engine/rate", put(engine::set_rate::<A, R, S>))
        // Recovery
        .route("/recovery/trigger", post(recovery::trigger::<A, R, S>))
        // Trigger source
        .route(
            "/trigger-source",
            get(source::get::<A, R, S>).put(source::set::<A, R, S>),
        )
}
