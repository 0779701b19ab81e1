use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ringq::{AsyncMessageQueue, BackpressureStrategy, CompletePolicy, QueueConfig, RingBuffer};
use tokio::runtime::Runtime;

const MESSAGES: u64 = 100_000;
const BUFFER_SIZE: usize = 1024;

fn draining_config() -> QueueConfig {
    QueueConfig::lossless(BUFFER_SIZE).with_completion(CompletePolicy::Drain)
}

fn bench_ring(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring");
    group.throughput(Throughput::Elements(MESSAGES));

    group.bench_function("push_pop", |b| {
        let mut ring = RingBuffer::new(BUFFER_SIZE).unwrap();
        b.iter(|| {
            for i in 0..MESSAGES {
                if !ring.push(i) {
                    black_box(ring.pop());
                    ring.push(i);
                }
            }
            ring.clear();
        });
    });

    group.finish();
}

fn bench_enqueue(c: &mut Criterion) {
    let mut group = c.benchmark_group("enqueue");
    group.throughput(Throughput::Elements(MESSAGES));

    let strategies = [
        ("drop_oldest", BackpressureStrategy::DropOldest),
        ("drop_newest", BackpressureStrategy::DropNewest),
        ("block", BackpressureStrategy::Block),
    ];

    for (name, strategy) in strategies {
        for metrics in [false, true] {
            let id = format!("{name}{}", if metrics { "_metrics" } else { "" });
            group.bench_with_input(BenchmarkId::from_parameter(id), &strategy, |b, &strategy| {
                b.iter(|| {
                    let config = QueueConfig::new(BUFFER_SIZE)
                        .with_backpressure(strategy)
                        .with_metrics(metrics);
                    let queue = AsyncMessageQueue::<u64>::new(config).unwrap();
                    for i in 0..MESSAGES {
                        black_box(queue.enqueue(i));
                    }
                    black_box(queue.size())
                });
            });
        }
    }

    group.finish();
}

fn bench_spsc(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("spsc");
    group.throughput(Throughput::Elements(MESSAGES));

    group.bench_function("producer_consumer", |b| {
        b.to_async(&rt).iter(|| async {
            let queue = AsyncMessageQueue::<u64>::new(draining_config()).unwrap();

            let producer = {
                let queue = queue.clone();
                tokio::spawn(async move {
                    for i in 0..MESSAGES {
                        queue.enqueue(i);
                        if i % 256 == 0 {
                            tokio::task::yield_now().await;
                        }
                    }
                    queue.complete();
                })
            };

            let mut count = 0u64;
            while let Ok(Some(item)) = queue.recv().await {
                black_box(item);
                count += 1;
            }
            producer.await.unwrap();
            black_box(count)
        });
    });

    group.finish();
}

fn bench_mpsc(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("mpsc");

    for num_producers in [2u64, 4, 8] {
        let per_producer = MESSAGES / num_producers;
        group.throughput(Throughput::Elements(per_producer * num_producers));

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{num_producers}P_1C")),
            &num_producers,
            |b, &n| {
                b.to_async(&rt).iter(|| async move {
                    let queue = AsyncMessageQueue::<u64>::new(draining_config()).unwrap();

                    let producers: Vec<_> = (0..n)
                        .map(|_| {
                            let queue = queue.clone();
                            tokio::spawn(async move {
                                for i in 0..per_producer {
                                    queue.enqueue(i);
                                    if i % 256 == 0 {
                                        tokio::task::yield_now().await;
                                    }
                                }
                            })
                        })
                        .collect();

                    let closer = {
                        let queue = queue.clone();
                        tokio::spawn(async move {
                            for producer in producers {
                                producer.await.unwrap();
                            }
                            queue.complete();
                        })
                    };

                    let mut count = 0u64;
                    while let Ok(Some(item)) = queue.recv().await {
                        black_box(item);
                        count += 1;
                    }
                    closer.await.unwrap();
                    black_box(count)
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_ring, bench_enqueue, bench_spsc, bench_mpsc);
criterion_main!(benches);
