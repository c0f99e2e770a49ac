//! Permission gate — the register pair coordinating the action loop and recovery.
//!
//! Both flags are independent atomics. Writers are responsible for the
//! ordering between them: recovery disallows actions *before* marking itself
//! in progress, and clears the in-progress mark *before* allowing actions
//! again. Readers never cache a value across loop iterations.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;

/// Shared "actions allowed" / "recovery in progress" flags.
#[derive(Debug)]
pub struct PermissionGate {
    actions_allowed: AtomicBool,
    recovery_in_progress: AtomicBool,
}

impl Default for PermissionGate {
    fn default() -> Self {
        Self {
            actions_allowed: AtomicBool::new(true),
            recovery_in_progress: AtomicBool::new(false),
        }
    }
}

impl PermissionGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_actions_allowed(&self, allowed: bool) {
        self.actions_allowed.store(allowed, Ordering::SeqCst);
    }

    #[must_use]
    pub fn are_actions_allowed(&self) -> bool {
        self.actions_allowed.load(Ordering::SeqCst)
    }

    pub fn set_recovery_in_progress(&self, in_progress: bool) {
        self.recovery_in_progress.store(in_progress, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_recovery_in_progress(&self) -> bool {
        self.recovery_in_progress.load(Ordering::SeqCst)
    }

    /// Read both flags. The pair is not read atomically as one unit.
    #[must_use]
    pub fn snapshot(&self) -> GateSnapshot {
        GateSnapshot {
            actions_allowed: self.are_actions_allowed(),
            recovery_in_progress: self.is_recovery_in_progress(),
        }
    }
}

/// Point-in-time view of the gate for status reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GateSnapshot {
    pub actions_allowed: bool,
    pub recovery_in_progress: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_allow_actions_and_not_be_recovering_by_default() {
        let gate = PermissionGate::new();
        assert!(gate.are_actions_allowed());
        assert!(!gate.is_recovery_in_progress());
    }

    #[test]
    fn should_update_flags_independently() {
        let gate = PermissionGate::new();
        gate.set_actions_allowed(false);
        assert!(!gate.are_actions_allowed());
        assert!(!gate.is_recovery_in_progress());

        gate.set_recovery_in_progress(true);
        assert_eq!(
            gate.snapshot(),
            GateSnapshot {
                actions_allowed: false,
                recovery_in_progress: true,
            }
        );
    }

    #[test]
    fn should_be_visible_across_threads() {
        let gate = std::sync::Arc::new(PermissionGate::new());
        let writer = std::sync::Arc::clone(&gate);
        std::thread::spawn(move || writer.set_actions_allowed(false))
            .join()
            .unwrap();
        assert!(!gate.are_actions_allowed());
    }
}
