use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fibre_fan::fan::Fan;
use std::sync::Arc;
use tokio::runtime::Runtime;

const ITEM_VALUE: u64 = 42;
const TOTAL_ITEMS: usize = 10_000;

fn bench_fan_async_broadcast(c: &mut Criterion) {
  let rt = Runtime::new().expect("Failed to build Tokio runtime");
  let mut group = c.benchmark_group("fan_async_broadcast");
  group.throughput(Throughput::Elements(TOTAL_ITEMS as u64));

  for num_receivers in [1usize, 4, 16] {
    group.bench_with_input(
      BenchmarkId::from_parameter(num_receivers),
      &num_receivers,
      |b, &num_receivers| {
        b.to_async(&rt).iter(|| async move {
          let fan = Arc::new(Fan::new());
          let handles: Vec<_> = (0..num_receivers)
            .map(|_| {
              let mut rx = fan.receiver();
              tokio::spawn(async move {
                let mut sum = 0u64;
                for _ in 0..TOTAL_ITEMS {
                  sum += rx.get_async().await;
                }
                sum
              })
            })
            .collect();

          for _ in 0..TOTAL_ITEMS {
            fan.send(ITEM_VALUE);
          }
          for h in handles {
            assert_eq!(h.await.unwrap(), ITEM_VALUE * TOTAL_ITEMS as u64);
          }
        })
      },
    );
  }
  group.finish();
}

criterion_group!(benches, bench_fan_async_broadcast);
criterion_main!(benches);
