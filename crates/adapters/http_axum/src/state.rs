//! Shared application state for axum handlers.

use std::sync::Arc;

use azerus_app::coordinator::Coordinator;
use azerus_app::ports::{ActionExecutor, RecoverySteps, TriggerSourceControl};

/// Application state shared across all axum handlers.
///
/// Generic over the executor backends and the trigger source to avoid
/// dynamic dispatch. `Clone` is implemented manually so the underlying types
/// themselves do not need to be `Clone`; only the `Arc` wrappers are cloned.
pub struct AppState<A, R, S> {
    /// Gate, engine and recovery state machine.
    pub coordinator: Arc<Coordinator<A, R>>,
    /// Watched log stream.
    pub trigger_source: Arc<S>,
}

impl<A, R, S> Clone for AppState<A, R, S> {
    fn clone(&self) -> Self {
        Self {
            coordinator: Arc::clone(&self.coordinator),
            trigger_source: Arc::clone(&self.trigger_source),
        }
    }
}

impl<A, R, S> AppState<A, R, S>
where
    A: ActionExecutor + 'static,
    R: RecoverySteps + 'static,
    S: TriggerSourceControl + 'static,
{
    /// Create the state from components already shared with background
    /// tasks (the log tail holds the same coordinator).
    pub fn new(coordinator: Arc<Coordinator<A, R>>, trigger_source: Arc<S>) -> Self {
        Self {
            coordinator,
            trigger_source,
        }
    }
}
