//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the coordinator core and the outside
//! world. They are defined here (in `app`) so that both the core and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod action;
pub mod recovery;
pub mod trigger;

pub use action::ActionExecutor;
pub use recovery::RecoverySteps;
pub use trigger::{RecoveryTrigger, TriggerSourceControl};
