//! Recovery steps port — the input and screen primitives a recovery needs.

use std::future::Future;
use std::sync::Arc;

use azerus_domain::error::StepError;
use azerus_domain::recovery::Detections;

/// Primitives invoked by the
/// [`RecoveryCoordinator`](crate::recovery::RecoveryCoordinator), always in
/// the fixed order open → neutral move → locate → assign → close.
///
/// Each primitive is independently fallible; the coordinator decides which
/// failures abort the sequence.
pub trait RecoverySteps: Send + Sync {
    /// Open the recovery context (e.g. press the inventory key).
    fn open_context(&self) -> impl Future<Output = Result<(), StepError>> + Send;

    /// Close the recovery context. Mirrors [`open_context`](Self::open_context).
    fn close_context(&self) -> impl Future<Output = Result<(), StepError>> + Send;

    /// Move the pointer to absolute screen coordinates.
    fn move_pointer(&self, x: i32, y: i32) -> impl Future<Output = Result<(), StepError>> + Send;

    /// Press and release a single key.
    fn press_key(&self, key: &str) -> impl Future<Output = Result<(), StepError>> + Send;

    /// Run both target detectors against the current screen.
    fn locate_target(&self) -> impl Future<Output = Result<Detections, StepError>> + Send;

    /// Screen dimensions `(width, height)` in pixels.
    fn screen_size(&self) -> impl Future<Output = Result<(u32, u32), StepError>> + Send;

    /// Release any held pointer button.
    fn release_input(&self) -> impl Future<Output = Result<(), StepError>> + Send {
        async { Ok(()) }
    }
}

impl<T: RecoverySteps> RecoverySteps for Arc<T> {
    fn open_context(&self) -> impl Future<Output = Result<(), StepError>> + Send {
        (**self).open_context()
    }

    fn close_context(&self) -> impl Future<Output = Result<(), StepError>> + Send {
        (**self).close_context()
    }

    fn move_pointer(&self, x: i32, y: i32) -> impl Future<Output = Result<(), StepError>> + Send {
        (**self).move_pointer(x, y)
    }

    fn press_key(&self, key: &str) -> impl Future<Output = Result<(), StepError>> + Send {
        (**self).press_key(key)
    }

    fn locate_target(&self) -> impl Future<Output = Result<Detections, StepError>> + Send {
        (**self).locate_target()
    }

    fn screen_size(&self) -> impl Future<Output = Result<(u32, u32), StepError>> + Send {
        (**self).screen_size()
    }

    fn release_input(&self) -> impl Future<Output = Result<(), StepError>> + Send {
        (**self).release_input()
    }
}
