//! # azerus-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a **JSON status endpoint** polled by presentation layers
//!   (`GET /api/status`)
//! - Serve the **control surface**: toggle the action loop, change its rate,
//!   trigger a recovery by hand, repoint the watched log
//! - Map HTTP requests into coordinator calls (driving adapter)
//! - Map domain errors into HTTP status codes and JSON bodies
//!
//! ## Dependency rule
//! Depends on `azerus-app` (for the coordinator and port traits) and
//! `azerus-domain` (for types used in request/response mapping). Never leaks
//! axum types into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
