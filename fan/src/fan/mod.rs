// src/fan/mod.rs

//! A one-to-many, unbounded broadcast built on a chain of [`Future`]s.
//!
//! A [`Fan`] holds the write cursor: the one future in its chain that has not
//! been written yet. Each [`Fan::send`] writes a link into that future,
//! carrying the value and a freshly allocated successor, then moves the write
//! cursor to the successor.
//!
//! Each [`Receiver`] holds its own read cursor into the same chain, starting at
//! whatever future was current when it was created. A receiver therefore sees
//! every value sent after its creation, in send order, none skipped and none
//! repeated, no matter how many other receivers exist or how fast they read.
//! Values sent before a receiver was created are never replayed to it.
//!
//! ## Memory
//!
//! There is no buffer to bound. A link is freed as soon as the fan has moved
//! past it and no receiver still points at or before it, so a receiver that
//! stops reading keeps everything sent after its position alive. Drop
//! receivers you no longer read from.
//!
//! # Examples
//!
//! ```
//! use fibre_fan::fan::Fan;
//!
//! let fan = Fan::new();
//! let mut early = fan.receiver();
//!
//! fan.send("a");
//! let mut late = fan.receiver();
//! fan.send("b");
//! fan.send("c");
//!
//! assert_eq!(early.get(), "a");
//! assert_eq!(early.get(), "b");
//! assert_eq!(early.get(), "c");
//!
//! // `late` was created after "a" went out.
//! assert_eq!(late.get(), "b");
//! assert_eq!(late.get(), "c");
//! ```

mod receiver;

pub use self::receiver::Receiver;

use crate::future::Future;
use crate::telemetry;

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

/// One position in a fan's chain.
type Slot<T> = Future<Link<T>>;

/// The payload of a written slot: a sent value and the slot after it.
pub(crate) struct Link<T> {
  pub(crate) value: T,
  // Always `Some` for a link reachable through the chain; only taken while
  // the chain is being torn down in `Drop`.
  pub(crate) next: Option<Arc<Slot<T>>>,
}

impl<T> Drop for Link<T> {
  // Unlink iteratively; a recursive drop overflows the stack on long chains.
  fn drop(&mut self) {
    let mut next = self.next.take();
    while let Some(slot) = next {
      next = match Arc::try_unwrap(slot) {
        Ok(slot) => slot.into_inner().and_then(|mut link| link.next.take()),
        // Someone else still holds the rest of the chain.
        Err(_) => None,
      };
    }
  }
}

/// The sending side of a broadcast: one ordered, unbounded stream of values
/// delivered to every [`Receiver`] created from it.
///
/// `send` and `receiver` both take `&self`, so a fan can be shared (for
/// example behind an `Arc`) by several threads. Concurrent sends serialize
/// into a single order that every receiver observes.
pub struct Fan<T> {
  // `None` until the first send or receiver needs a slot.
  cursor: RwLock<Option<Arc<Slot<T>>>>,
}

impl<T> fmt::Debug for Fan<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let initialized = self.cursor.read().is_some();
    f.debug_struct("Fan")
      .field("initialized", &initialized)
      .finish()
  }
}

impl<T> Default for Fan<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T> Fan<T> {
  /// Creates a fan. Nothing is allocated until the first send or receiver.
  pub fn new() -> Self {
    Fan {
      cursor: RwLock::new(None),
    }
  }

  /// Sends `value` to every receiver that currently exists.
  ///
  /// Never blocks on receivers; a receiver that has not caught up simply
  /// finds the value waiting in the chain.
  pub fn send(&self, value: T) {
    let written = {
      let mut cursor = self.cursor.write();
      let current = cursor.get_or_insert_with(|| {
        telemetry::log_event(None, "Fan::send", "ChainInit", None);
        Arc::new(Slot::new())
      });

      let next = Arc::new(Slot::new());
      let link = Link {
        value,
        next: Some(Arc::clone(&next)),
      };
      // The write cursor is only ever written here, under the write lock, so
      // the slot is guaranteed to be empty.
      if current.set(link).is_err() {
        unreachable!("fan write cursor was already written");
      }
      cursor.replace(next)
    };

    // Readers are woken after the lock is released so `receiver` and other
    // sends never wait behind the wakeups.
    if let Some(written) = written {
      written.wake_readers();
    }
    telemetry::increment_counter("Fan::send", "Sent");
  }

  /// Creates a receiver that will observe every value sent from now on.
  pub fn receiver(&self) -> Receiver<T> {
    // Fast path: once the chain exists, creation only needs a shared lock.
    if let Some(current) = self.cursor.read().as_ref() {
      return Receiver::new(Arc::clone(current));
    }

    // First use. Another thread may have initialized the chain (or sent)
    // between dropping the read lock and taking the write lock.
    let mut cursor = self.cursor.write();
    let current = cursor.get_or_insert_with(|| {
      telemetry::log_event(None, "Fan::receiver", "ChainInit", None);
      Arc::new(Slot::new())
    });
    Receiver::new(Arc::clone(current))
  }
}
