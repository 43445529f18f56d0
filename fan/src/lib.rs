#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

//! Single-write, multi-read futures and an unbounded broadcast built on them.
//!
//! - [`future::Future`] is written once and read by any number of threads or
//!   tasks. Reads wait for the write, either by parking the thread or through
//!   an awaitable readiness signal that composes with other futures.
//! - [`fan::Fan`] broadcasts an unbounded, ordered sequence of values. Each
//!   [`fan::Receiver`] walks its own cursor through a chain of futures and
//!   sees every value sent after it was created, at its own pace.

pub mod error;

pub mod fan;
pub mod future;
pub mod telemetry;

// Internal utilities - not part of public API
mod internal;
mod sync_util;

pub use error::{TryRecvError, TrySendError};
pub use fan::{Fan, Receiver};

// Helper function to check if a type is Send + Sync.
#[allow(dead_code)]
fn assert_send_sync<T: Send + Sync>() {}
