// tests/future_sync.rs

mod common;
use common::*;

use fibre_fan::error::TrySendError;
use fibre_fan::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

#[test]
fn future_sync_scoped_readers_and_writer() {
  let future = Future::new();
  let written = AtomicBool::new(false);

  thread::scope(|s| {
    let readers: Vec<_> = (0..ITEMS_LOW)
      .map(|_| {
        s.spawn(|| {
          let v = *future.get();
          // A read can only complete after the write happened.
          assert!(written.load(Ordering::Acquire));
          v
        })
      })
      .collect();

    thread::sleep(SHORT_TIMEOUT / 10);
    written.store(true, Ordering::Release);
    future.send(17u32);

    for r in readers {
      assert_eq!(r.join().unwrap(), 17);
    }
  });
}

#[test]
fn future_sync_get_after_send_returns_immediately() {
  let future = Future::new();
  future.send('x');
  let start = std::time::Instant::now();
  for _ in 0..ITEMS_HIGH {
    assert_eq!(*future.get(), 'x');
  }
  assert!(start.elapsed() < LONG_TIMEOUT);
}

#[test]
fn future_sync_racing_writers_only_one_lands() {
  let future = Future::new();

  let outcomes: Vec<Result<(), TrySendError<usize>>> = thread::scope(|s| {
    let handles: Vec<_> = (0..8).map(|i| {
      let future = &future;
      s.spawn(move || future.try_send(i))
    }).collect();
    handles.into_iter().map(|h| h.join().unwrap()).collect()
  });

  let winners = outcomes.iter().filter(|o| o.is_ok()).count();
  assert_eq!(winners, 1);

  let stored = *future.get();
  for outcome in outcomes {
    if let Err(e) = outcome {
      assert_ne!(e.into_inner(), stored, "rejected value must not be the stored one");
    }
  }
}
