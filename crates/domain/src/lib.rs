//! # azerus-domain
//!
//! Pure domain model for the azerus automation assistant.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define the **permission gate** shared by the action loop and recovery
//! - Define the validated **action rate** of the periodic action loop
//! - Define the **marker** searched for in the game log
//! - Define **recovery** value objects (outcomes, target matches, detections)
//! - Define **status snapshots** exposed to presentation layers
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod gate;
pub mod marker;
pub mod rate;
pub mod recovery;
pub mod status;
