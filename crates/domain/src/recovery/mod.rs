//! Recovery — value objects describing the weapon recovery sequence.
//!
//! A recovery sequence opens an in-game context (the inventory), locates the
//! knocked-out weapon, assigns it back to the hotbar and closes the context.
//! The orchestration itself lives in the `app` crate; this module only holds
//! the vocabulary shared by the coordinator, its ports and status readers.

mod outcome;
mod target;

pub use outcome::{RecoveryAttempt, RecoveryOutcome, RecoveryStep, TriggerOrigin};
pub use target::{Detections, TargetKind, TargetMatch};
