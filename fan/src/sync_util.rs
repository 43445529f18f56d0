//! Utilities for synchronous blocking and parking.
//! Minimal helpers around std::thread::park/unpark; the waiting state itself
//! lives in the signal that owns the waiter list.

use std::thread;

/// Parks the current thread.
#[inline]
pub(crate) fn park_thread() {
  thread::park();
}

/// Unparks the given thread.
#[inline]
pub(crate) fn unpark_thread(thread: &thread::Thread) {
  thread.unpark();
}
