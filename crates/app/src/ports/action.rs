//! Action executor port — the single repetitive in-game action.

use std::future::Future;
use std::sync::Arc;

use azerus_domain::error::ActionError;

/// Performs the periodic action (typically one mouse click).
///
/// Driven by [`PeriodicActionEngine`](crate::action_engine::PeriodicActionEngine)
/// once per due cycle.
pub trait ActionExecutor: Send + Sync {
    /// Whether the backend can inject input at all.
    ///
    /// The engine refuses to start when this returns `false`.
    fn is_available(&self) -> bool {
        true
    }

    /// Fire exactly one action.
    fn perform_one_action(&self) -> impl Future<Output = Result<(), ActionError>> + Send;

    /// Release any input state the action may have left held (e.g. a mouse
    /// button). Called after every stop.
    fn release_input(&self) -> impl Future<Output = Result<(), ActionError>> + Send {
        async { Ok(()) }
    }
}

impl<T: ActionExecutor> ActionExecutor for Arc<T> {
    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn perform_one_action(&self) -> impl Future<Output = Result<(), ActionError>> + Send {
        (**self).perform_one_action()
    }

    fn release_input(&self) -> impl Future<Output = Result<(), ActionError>> + Send {
        (**self).release_input()
    }
}
