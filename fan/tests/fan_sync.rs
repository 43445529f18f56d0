// tests/fan_sync.rs

mod common;
use common::*;

use fibre_fan::error::TryRecvError;
use fibre_fan::fan::Fan;
use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

#[test]
fn fan_sync_late_receiver_sees_suffix() {
  let fan = Fan::new();
  let mut r0 = fan.receiver();
  fan.send("a".to_string());
  let mut r1 = fan.receiver();
  fan.send("b".to_string());
  fan.send("c".to_string());

  let seen0: Vec<String> = (0..3).map(|_| r0.get()).collect();
  let seen1: Vec<String> = (0..2).map(|_| r1.get()).collect();
  assert_eq!(seen0, ["a", "b", "c"]);
  assert_eq!(seen1, ["b", "c"]);
}

#[test]
fn fan_sync_three_receivers_before_any_send() {
  let fan = Arc::new(Fan::new());
  let receivers: Vec<_> = (0..3).map(|_| fan.receiver()).collect();

  // Readers consume at deliberately different speeds.
  let handles: Vec<_> = receivers
    .into_iter()
    .enumerate()
    .map(|(i, mut rx)| {
      thread::spawn(move || {
        let mut got = Vec::new();
        for _ in 0..4 {
          thread::sleep(Duration::from_millis(i as u64 * 5));
          got.push(rx.get());
        }
        got
      })
    })
    .collect();

  for v in 0..4 {
    fan.send(v);
  }

  for h in handles {
    assert_eq!(h.join().unwrap(), vec![0, 1, 2, 3]);
  }
}

#[test]
fn fan_sync_slow_receiver_gets_oldest_first() {
  let fan = Fan::new();
  let mut rx = fan.receiver();
  for i in 0..ITEMS_LOW {
    fan.send(i);
  }
  // Nothing was read while the values piled up; none were dropped.
  for i in 0..ITEMS_LOW {
    assert_eq!(rx.get(), i);
  }
  assert_eq!(rx.try_get(), Err(TryRecvError::Empty));
}

#[test]
fn fan_sync_receivers_join_midstream() {
  let fan = Fan::new();
  let mut receivers = Vec::new();

  // Receiver k is created right before value k is sent.
  for k in 0..ITEMS_LOW {
    receivers.push((k, fan.receiver()));
    fan.send(k);
  }

  for (start, mut rx) in receivers {
    for expected in start..ITEMS_LOW {
      assert_eq!(rx.get(), expected);
    }
    assert_eq!(rx.try_get(), Err(TryRecvError::Empty));
  }
}

#[test]
fn fan_sync_concurrent_senders_share_one_order() {
  const SENDERS: usize = 4;

  let fan = Arc::new(Fan::new());
  let mut rx_a = fan.receiver();
  let mut rx_b = fan.receiver();
  let barrier = Arc::new(Barrier::new(SENDERS));

  let handles: Vec<_> = (0..SENDERS)
    .map(|s| {
      let fan = Arc::clone(&fan);
      let barrier = Arc::clone(&barrier);
      thread::spawn(move || {
        barrier.wait();
        for i in 0..ITEMS_MEDIUM {
          fan.send(s * ITEMS_MEDIUM + i);
        }
      })
    })
    .collect();
  for h in handles {
    h.join().unwrap();
  }

  let total = SENDERS * ITEMS_MEDIUM;
  let order_a: Vec<usize> = (0..total).map(|_| rx_a.get()).collect();
  let order_b: Vec<usize> = (0..total).map(|_| rx_b.get()).collect();

  // Every receiver observes the same total order...
  assert_eq!(order_a, order_b);
  // ...containing every value exactly once...
  let unique: HashSet<_> = order_a.iter().copied().collect();
  assert_eq!(unique.len(), total);
  // ...with each sender's values in the order that sender sent them.
  for s in 0..SENDERS {
    let from_s: Vec<_> = order_a
      .iter()
      .copied()
      .filter(|v| v / ITEMS_MEDIUM == s)
      .collect();
    let expected: Vec<_> = (0..ITEMS_MEDIUM).map(|i| s * ITEMS_MEDIUM + i).collect();
    assert_eq!(from_s, expected);
  }
}

#[test]
fn fan_sync_receiver_creation_races_sends() {
  let fan = Arc::new(Fan::new());
  let barrier = Arc::new(Barrier::new(2));

  let creator = {
    let fan = Arc::clone(&fan);
    let barrier = Arc::clone(&barrier);
    thread::spawn(move || {
      barrier.wait();
      (0..ITEMS_LOW).map(|_| fan.receiver()).collect::<Vec<_>>()
    })
  };

  barrier.wait();
  for i in 0..ITEMS_HIGH {
    fan.send(i);
  }
  let receivers = creator.join().unwrap();

  // Whatever point each receiver attached at, it sees a gapless suffix.
  for mut rx in receivers {
    let mut prev: Option<usize> = None;
    while let Ok(v) = rx.try_get() {
      if let Some(p) = prev {
        assert_eq!(v, p + 1, "gap or duplicate in receiver sequence");
      }
      prev = Some(v);
    }
    if let Some(last) = prev {
      assert_eq!(last, ITEMS_HIGH - 1);
    }
  }
}

#[test]
fn fan_sync_blocked_readers_wake_on_send() {
  let fan = Arc::new(Fan::new());
  let handles: Vec<_> = (0..4)
    .map(|_| {
      let mut rx = fan.receiver();
      thread::spawn(move || rx.get())
    })
    .collect();

  thread::sleep(SHORT_TIMEOUT / 5);
  for h in &handles {
    assert!(!h.is_finished(), "reader returned before anything was sent");
  }

  fan.send("wake");
  for h in handles {
    assert_eq!(h.join().unwrap(), "wake");
  }
}

#[test]
fn fan_sync_stress_many_receivers() {
  const RECEIVERS: usize = 8;

  let fan = Arc::new(Fan::new());
  let handles: Vec<_> = (0..RECEIVERS)
    .map(|_| {
      let mut rx = fan.receiver();
      thread::spawn(move || {
        let mut sum = 0usize;
        for expected in 0..ITEMS_HIGH {
          let v = rx.get();
          assert_eq!(v, expected);
          sum += v;
        }
        sum
      })
    })
    .collect();

  for i in 0..ITEMS_HIGH {
    fan.send(i);
  }

  let expected_sum = (0..ITEMS_HIGH).sum::<usize>();
  for h in handles {
    assert_eq!(h.join().unwrap(), expected_sum);
  }
}
