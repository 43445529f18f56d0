// src/fan/receiver.rs

use super::{Link, Slot};
use crate::error::TryRecvError;
use crate::future::Sent;
use crate::internal::signal::WaitKey;

use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::{ready, Stream};
use futures_util::future::poll_fn;

/// The receiving side of a [`Fan`](super::Fan).
///
/// A receiver is a private read cursor. Every method that consumes a value
/// takes `&mut self`, so one receiver cannot be read from two places at once;
/// each consumer needs its own, obtained from [`Fan::receiver`](super::Fan::receiver)
/// or by cloning an existing receiver.
///
/// Reading requires `T: Clone` because every receiver gets its own copy of
/// each value.
pub struct Receiver<T> {
  cursor: Arc<Slot<T>>,
  // Waker registration on `cursor` left by a pending `poll_get`.
  wait_key: Option<WaitKey>,
}

impl<T> fmt::Debug for Receiver<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Receiver")
      .field("ready", &self.is_ready())
      .finish()
  }
}

impl<T> Clone for Receiver<T> {
  /// Returns an independent receiver at the same position. Both observe the
  /// same remaining values.
  fn clone(&self) -> Self {
    Receiver {
      cursor: Arc::clone(&self.cursor),
      wait_key: None,
    }
  }
}

impl<T> Drop for Receiver<T> {
  fn drop(&mut self) {
    self.clear_wait();
  }
}

impl<T> Receiver<T> {
  pub(super) fn new(cursor: Arc<Slot<T>>) -> Self {
    Receiver {
      cursor,
      wait_key: None,
    }
  }

  /// Returns a future that completes once the next value is available.
  ///
  /// The signal belongs to the current position. It borrows the receiver, so
  /// it has to be dropped before the next read and fetched again afterwards.
  pub fn sent(&self) -> Sent<'_> {
    self.cursor.sent()
  }

  /// Returns `true` if [`get`](Self::get) would return without blocking.
  pub fn is_ready(&self) -> bool {
    self.cursor.is_sent()
  }

  #[cfg(test)]
  pub(super) fn cursor(&self) -> &Arc<Slot<T>> {
    &self.cursor
  }

  #[cfg(test)]
  pub(super) fn is_waiting(&self) -> bool {
    self.wait_key.is_some()
  }

  fn clear_wait(&mut self) {
    if let Some(key) = self.wait_key.take() {
      self.cursor.signal().cancel(key);
    }
  }

  fn advance(&mut self, next: Option<Arc<Slot<T>>>) {
    // The registration belongs to the slot being left.
    self.clear_wait();
    if let Some(next) = next {
      self.cursor = next;
    }
  }
}

impl<T: Clone> Receiver<T> {
  /// Returns the next value, blocking the current thread until it is sent.
  ///
  /// If several values were sent since the last call, this returns the
  /// oldest of them; values are never skipped.
  pub fn get(&mut self) -> T {
    let (value, next) = split(self.cursor.get());
    self.advance(next);
    value
  }

  /// Returns the next value if it has already been sent.
  pub fn try_get(&mut self) -> Result<T, TryRecvError> {
    let (value, next) = match self.cursor.try_get() {
      Some(link) => split(link),
      None => return Err(TryRecvError::Empty),
    };
    self.advance(next);
    Ok(value)
  }

  /// Waits asynchronously for the next value.
  ///
  /// If the returned future is dropped early, its waker stays registered
  /// until the receiver is read from again or dropped; polling again reuses
  /// the same registration.
  pub async fn get_async(&mut self) -> T {
    poll_fn(|cx| self.poll_get(cx)).await
  }

  /// Polls for the next value, registering `cx`'s waker if it isn't sent yet.
  pub fn poll_get(&mut self, cx: &mut Context<'_>) -> Poll<T> {
    loop {
      if let Some((value, next)) = self.cursor.try_get().map(split) {
        self.advance(next);
        return Poll::Ready(value);
      }
      ready!(self.cursor.signal().poll_wait(cx, &mut self.wait_key));
    }
  }
}

fn split<T: Clone>(link: &Link<T>) -> (T, Option<Arc<Slot<T>>>) {
  (link.value.clone(), link.next.clone())
}

/// An endless stream of the fan's values. It never yields `None`; a fan has
/// no notion of closing.
impl<T: Clone> Stream for Receiver<T> {
  type Item = T;

  fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
    self.get_mut().poll_get(cx).map(Some)
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    (0, None)
  }
}
