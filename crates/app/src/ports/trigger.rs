//! Trigger ports — how recovery requests enter the core, and how the
//! watched source is repointed.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use azerus_domain::recovery::{RecoveryAttempt, TriggerOrigin};

/// Entry point for recovery requests.
///
/// Every trigger (log stream or manual) goes through this one method so
/// that all of them share the same re-entrancy guard.
pub trait RecoveryTrigger: Send + Sync {
    /// Request a recovery sequence and run it on the caller's task.
    fn trigger(&self, origin: TriggerOrigin) -> impl Future<Output = RecoveryAttempt> + Send;
}

impl<T: RecoveryTrigger> RecoveryTrigger for Arc<T> {
    fn trigger(&self, origin: TriggerOrigin) -> impl Future<Output = RecoveryAttempt> + Send {
        (**self).trigger(origin)
    }
}

/// Control surface of a trigger source that watches a file.
pub trait TriggerSourceControl: Send + Sync {
    /// Repoint the watched stream. Accessibility is checked lazily.
    fn set_source(&self, path: PathBuf);

    /// The currently watched stream, if any.
    fn source(&self) -> Option<PathBuf>;
}

impl<T: TriggerSourceControl> TriggerSourceControl for Arc<T> {
    fn set_source(&self, path: PathBuf) {
        (**self).set_source(path);
    }

    fn source(&self) -> Option<PathBuf> {
        (**self).source()
    }
}
