// src/future/mod.rs

//! A single-write, multi-read future.
//!
//! A [`Future`] is a cell that is written exactly once and read any number of
//! times, from any number of threads or tasks. Reads made before the write
//! wait for it: [`Future::get`] parks the calling thread, while
//! [`Future::sent`] and [`Future::get_async`] return futures that can be
//! awaited or raced against other futures (timers, other signals) in a
//! multi-way wait.
//!
//! Writing a second value is a usage error. [`Future::send`] panics on it;
//! [`Future::try_send`] hands the rejected value back instead.
//!
//! # Examples
//!
//! ```
//! use fibre_fan::future::Future;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let future = Arc::new(Future::new());
//!
//! let readers: Vec<_> = (0..3)
//!   .map(|_| {
//!     let future = Arc::clone(&future);
//!     thread::spawn(move || *future.get())
//!   })
//!   .collect();
//!
//! future.send(42);
//!
//! for reader in readers {
//!   assert_eq!(reader.join().unwrap(), 42);
//! }
//! ```
//!
//! ```
//! use fibre_fan::future::Future;
//! use std::time::Duration;
//!
//! // A timeout is built by racing the readiness signal against a timer.
//! tokio::runtime::Runtime::new().unwrap().block_on(async {
//!   let future = Future::<u32>::new();
//!   let waited = tokio::time::timeout(Duration::from_millis(10), future.sent()).await;
//!   assert!(waited.is_err());
//!
//!   future.send(7);
//!   future.sent().await;
//!   assert_eq!(future.try_get(), Some(&7));
//! });
//! ```

pub use crate::error::TrySendError;

use crate::internal::signal::{Signal, WaitKey};
use crate::telemetry;

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use once_cell::sync::OnceCell;

/// A value that can be written once and read many times.
///
/// Share it between readers and the writer with `Arc`, or by reference inside
/// a scope. All methods take `&self`.
pub struct Future<T> {
  value: OnceCell<T>,
  signal: Signal,
}

impl<T> fmt::Debug for Future<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Future")
      .field("sent", &self.is_sent())
      .field("signal", &self.signal)
      .finish_non_exhaustive()
  }
}

impl<T> Default for Future<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T> Future<T> {
  /// Creates an empty future.
  pub fn new() -> Self {
    Future {
      value: OnceCell::new(),
      signal: Signal::new(),
    }
  }

  /// Writes the value and wakes every current and future reader.
  ///
  /// # Panics
  ///
  /// Panics if a value has already been written. The stored value is left
  /// as it was.
  pub fn send(&self, value: T) {
    if self.try_send(value).is_err() {
      panic!("future already sent a value");
    }
  }

  /// Writes the value, returning it inside [`TrySendError::Sent`] if the
  /// future already holds one.
  pub fn try_send(&self, value: T) -> Result<(), TrySendError<T>> {
    self.set(value)?;
    // The value is visible before anyone is woken.
    self.wake_readers();
    Ok(())
  }

  /// Stores the value without waking anyone. Must be followed by
  /// [`wake_readers`](Self::wake_readers).
  pub(crate) fn set(&self, value: T) -> Result<(), TrySendError<T>> {
    self.value.set(value).map_err(TrySendError::Sent)
  }

  pub(crate) fn wake_readers(&self) {
    self.signal.fire();
  }

  pub(crate) fn signal(&self) -> &Signal {
    &self.signal
  }

  /// Returns the written value, parking the current thread until it exists.
  pub fn get(&self) -> &T {
    loop {
      if let Some(value) = self.value.get() {
        return value;
      }
      telemetry::increment_counter("Future::get", "Wait");
      self.signal.wait_sync();
    }
  }

  /// Returns the written value if there is one, without blocking.
  pub fn try_get(&self) -> Option<&T> {
    self.value.get()
  }

  /// Waits asynchronously for the value and returns it.
  ///
  /// Dropping the returned future before it completes withdraws its waker.
  pub async fn get_async(&self) -> &T {
    self.sent().await;
    self.get()
  }

  /// Returns a future that completes once a value has been written.
  ///
  /// Creating it never blocks, it can be created before [`send`](Self::send),
  /// and any number of them may be outstanding. Once it resolves,
  /// [`get`](Self::get) returns without blocking. It is not necessary to call
  /// this before `get`; `get` waits on its own.
  pub fn sent(&self) -> Sent<'_> {
    Sent {
      signal: &self.signal,
      key: None,
    }
  }

  /// Returns `true` once a value has been written.
  pub fn is_sent(&self) -> bool {
    self.value.get().is_some()
  }

  /// Consumes the future, returning the written value if there is one.
  pub fn into_inner(self) -> Option<T> {
    self.value.into_inner()
  }
}

/// The readiness signal of a [`Future`], returned by [`Future::sent`].
///
/// Resolves to `()` once the value has been written. Dropping it before then
/// removes its waker from the future.
#[must_use = "futures do nothing unless you .await or poll them"]
#[derive(Debug)]
pub struct Sent<'a> {
  signal: &'a Signal,
  key: Option<WaitKey>,
}

impl std::future::Future for Sent<'_> {
  type Output = ();

  fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
    let this = self.get_mut();
    this.signal.poll_wait(cx, &mut this.key)
  }
}

impl Drop for Sent<'_> {
  fn drop(&mut self) {
    if let Some(key) = self.key.take() {
      self.signal.cancel(key);
    }
  }
}
