//! A one-time broadcast signal that wakes both blocked threads and async tasks.
//!
//! The signal starts unfired and can be fired exactly once. Every waiter
//! registered before the fire is woken by it, and every wait started after it
//! returns immediately. The waiter list is protected by a `parking_lot::Mutex`;
//! the `fired` flag is re-checked under that lock before a waiter enqueues, so a
//! fire can never slip between the check and the registration ("lost wakeup").

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll, Waker};
use std::thread::{self, Thread};

use parking_lot::Mutex;

use crate::sync_util;
use crate::telemetry;

/// Either a parked thread or an async task.
#[derive(Debug)]
enum Waiter {
  Sync(Thread),
  Async(Waker),
}

impl Waiter {
  /// Wakes the underlying thread or task.
  fn wake(self) {
    match self {
      Waiter::Sync(thread) => sync_util::unpark_thread(&thread),
      Waiter::Async(waker) => waker.wake(),
    }
  }

  fn will_wake(&self, waker: &Waker) -> bool {
    match self {
      Waiter::Async(self_waker) => self_waker.will_wake(waker),
      Waiter::Sync(_) => false,
    }
  }
}

/// Handle to a registered waiter, used to deregister it.
pub(crate) type WaitKey = u64;

#[derive(Debug, Default)]
struct SignalInternal {
  fired: bool,
  // Keys are never reused, so a stale key can't remove someone else's entry.
  next_key: WaitKey,
  waiters: HashMap<WaitKey, Waiter>,
}

impl SignalInternal {
  fn register(&mut self, waiter: Waiter) -> WaitKey {
    let key = self.next_key;
    self.next_key += 1;
    self.waiters.insert(key, waiter);
    key
  }
}

pub(crate) struct Signal {
  // Lock-free fast path mirror of `internal.fired`.
  fired: AtomicBool,
  internal: Mutex<SignalInternal>,
}

impl fmt::Debug for Signal {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let internal = self.internal.lock();
    f.debug_struct("Signal")
      .field("fired", &internal.fired)
      .field("waiters", &internal.waiters.len())
      .finish()
  }
}

impl Signal {
  pub(crate) fn new() -> Self {
    Signal {
      fired: AtomicBool::new(false),
      internal: Mutex::new(SignalInternal::default()),
    }
  }

  #[inline]
  pub(crate) fn is_fired(&self) -> bool {
    self.fired.load(Ordering::Acquire)
  }

  /// Fires the signal, waking every registered waiter.
  ///
  /// Returns `false` if the signal had already been fired.
  pub(crate) fn fire(&self) -> bool {
    let waiters = {
      let mut internal = self.internal.lock();
      if internal.fired {
        return false;
      }
      internal.fired = true;
      self.fired.store(true, Ordering::Release);
      std::mem::take(&mut internal.waiters)
    };

    telemetry::log_event(Some(waiters.len()), "Signal::fire", "Fired", None);
    // Wake outside the lock so woken threads don't immediately contend on it.
    for waiter in waiters.into_values() {
      waiter.wake();
    }
    true
  }

  /// Blocks the current thread until the signal has been fired.
  pub(crate) fn wait_sync(&self) {
    if self.is_fired() {
      return;
    }

    let mut internal = self.internal.lock();
    if internal.fired {
      return;
    }
    // Registered once; the entry stays put across spurious unparks and is
    // removed by `fire`, which is the only way out of the loop.
    internal.register(Waiter::Sync(thread::current()));
    while !internal.fired {
      drop(internal);
      telemetry::increment_counter("Signal::wait_sync", "Park");
      sync_util::park_thread();
      internal = self.internal.lock();
    }
  }

  /// Polls for the signal, registering the task's waker if it has not fired.
  ///
  /// `key` tracks the caller's registration across polls: a repeat poll
  /// refreshes the existing entry instead of adding one. Callers that stop
  /// polling before the signal fires must pass the key to [`cancel`](Self::cancel).
  pub(crate) fn poll_wait(&self, cx: &mut Context<'_>, key: &mut Option<WaitKey>) -> Poll<()> {
    if self.is_fired() {
      *key = None;
      return Poll::Ready(());
    }

    let mut internal = self.internal.lock();
    if internal.fired {
      *key = None;
      return Poll::Ready(());
    }
    match (*key).and_then(|k| internal.waiters.get_mut(&k)) {
      Some(waiter) => {
        if !waiter.will_wake(cx.waker()) {
          *waiter = Waiter::Async(cx.waker().clone());
        }
      }
      None => *key = Some(internal.register(Waiter::Async(cx.waker().clone()))),
    }
    Poll::Pending
  }

  /// Removes a registration made by [`poll_wait`](Self::poll_wait).
  pub(crate) fn cancel(&self, key: WaitKey) {
    if self.is_fired() {
      return;
    }
    self.internal.lock().waiters.remove(&key);
  }

  #[cfg(test)]
  pub(crate) fn waiter_count(&self) -> usize {
    self.internal.lock().waiters.len()
  }
}
