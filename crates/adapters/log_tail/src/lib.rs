//! # azerus-adapter-log-tail
//!
//! Trigger source that watches the game's chat log.
//!
//! [`LogTail`] polls an append-only text file at a fixed interval, reads only
//! the bytes appended since the previous poll, and raises one recovery
//! trigger per line containing the configured [`Marker`](azerus_domain::marker::Marker).
//!
//! - History present when a file is first observed is skipped.
//! - A file that shrinks is treated as rotated and re-read from offset 0.
//! - A line split across two appends is reassembled before matching.
//! - Read failures are logged and retried on the next poll, never fatal.
//!
//! ## Dependency rule
//!
//! Depends on `azerus-app` (port traits) and `azerus-domain` only.

mod error;
mod lines;
mod tail;

pub use error::LogTailError;
pub use tail::LogTail;
