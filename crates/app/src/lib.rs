//! # azerus-app
//!
//! Application layer — the coordination core and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters implement:
//!   - `ActionExecutor` — the single repetitive action
//!   - `RecoverySteps` — input and screen primitives of a recovery
//!   - `RecoveryTrigger` — entry point raised by trigger sources
//!   - `TriggerSourceControl` — re-point a trigger source at runtime
//! - Run the **periodic action engine** against the permission gate
//! - Run the **recovery state machine** with exclusive rights over the gate
//! - Expose the **coordinator façade** consumed by driving adapters
//!
//! ## Dependency rule
//! Depends on `azerus-domain` only (plus `tokio` for tasks and timers).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod action_engine;
pub mod coordinator;
pub mod ports;
pub mod recovery;
