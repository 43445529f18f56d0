// examples/broadcast.rs
use fibre_fan::fan::Fan;
use fibre_fan::future::Future;
use std::{sync::Arc, thread, time::Duration};

fn main() {
  println!("--- Future: one write, many reads ---");
  {
    let config = Arc::new(Future::new());
    let workers: Vec<_> = (0..3)
      .map(|i| {
        let config = Arc::clone(&config);
        thread::spawn(move || {
          let value: &String = config.get();
          println!("[Worker {}] Got config: {}", i, value);
        })
      })
      .collect();

    thread::sleep(Duration::from_millis(20));
    config.send("mode=fast".to_string());
    for w in workers {
      w.join().unwrap();
    }
  }

  println!("\n--- Fan: receivers see everything sent after they attach ---");
  {
    let fan = Arc::new(Fan::new());
    let mut early = fan.receiver();
    fan.send("a");
    let mut late = fan.receiver();
    fan.send("b");
    fan.send("c");

    let early_seen: Vec<_> = (0..3).map(|_| early.get()).collect();
    let late_seen: Vec<_> = (0..2).map(|_| late.get()).collect();
    println!("[Early] {:?}", early_seen);
    println!("[Late]  {:?}", late_seen);
  }

  println!("\n--- Fan: async consumers with a timeout ---");
  tokio::runtime::Runtime::new().unwrap().block_on(async {
    let fan = Arc::new(Fan::new());
    let mut rx = fan.receiver();

    {
      let fan = Arc::clone(&fan);
      tokio::spawn(async move {
        for i in 0..3 {
          tokio::time::sleep(Duration::from_millis(10)).await;
          fan.send(i);
        }
      });
    }

    loop {
      let ready = tokio::time::timeout(Duration::from_millis(100), rx.sent()).await;
      match ready {
        Ok(()) => println!("[Async] Received: {}", rx.get()),
        Err(_) => {
          println!("[Async] No value within 100ms, stopping.");
          break;
        }
      }
    }
  });
}
