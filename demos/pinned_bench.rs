//! Throughput and round-trip latency with pinned threads.
//!
//! Usage:
//!     cargo run --release --example pinned_bench
//!
//! Environment variables:
//!     PRODUCER_CPU=0      Pin the producer (main) thread to CPU 0 (default: unpinned)
//!     CONSUMER_CPU=2      Pin the consumer thread to CPU 2 (default: unpinned)
//!     QUEUE_SIZE=1048576  Queue capacity (default: 1 << 20)
//!     ITERATIONS=10000000 Elements per run (default: 10_000_000)

use std::env;
use std::hint;
use std::thread;
use std::time::Instant;

use turbo_spsc::SpscQueue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Payload(i32);

struct Settings {
    producer_cpu: Option<usize>,
    consumer_cpu: Option<usize>,
    queue_size: usize,
    iterations: usize,
}

fn env_usize(name: &str) -> Option<usize> {
    env::var(name).ok().and_then(|s| s.parse().ok())
}

fn settings() -> Settings {
    Settings {
        producer_cpu: env_usize("PRODUCER_CPU"),
        consumer_cpu: env_usize("CONSUMER_CPU"),
        queue_size: env_usize("QUEUE_SIZE").unwrap_or(1 << 20),
        iterations: env_usize("ITERATIONS").unwrap_or(10_000_000),
    }
}

fn pin_to_cpu(cpu: Option<usize>) {
    if let Some(id) = cpu {
        if !core_affinity::set_for_current(core_affinity::CoreId { id }) {
            eprintln!("warning: could not pin thread to CPU {}", id);
        }
    }
}

fn bench_throughput(settings: &Settings) {
    let mut queue = SpscQueue::<Payload>::new(settings.queue_size).expect("valid queue size");
    let (mut tx, mut rx) = queue.split();
    let iterations = settings.iterations;
    let consumer_cpu = settings.consumer_cpu;

    pin_to_cpu(settings.producer_cpu);

    let start = thread::scope(|s| {
        s.spawn(move || {
            pin_to_cpu(consumer_cpu);
            for expected in 0..iterations as i32 {
                loop {
                    if let Some(value) = rx.peek() {
                        if value.0 != expected {
                            panic!("Data corruption: expected {}, got {}", expected, value.0);
                        }
                        break;
                    }
                    hint::spin_loop();
                }
                rx.try_pop();
            }
        });

        let start = Instant::now();
        for i in 0..iterations as i32 {
            tx.push(Payload(i));
        }
        start
    });
    // includes the consumer draining the tail
    let elapsed = start.elapsed();

    println!(
        "{:>12.0} ops/ms",
        iterations as f64 / (elapsed.as_nanos() as f64 / 1_000_000.0)
    );
}

fn bench_round_trip(settings: &Settings) {
    let mut q1 = SpscQueue::<Payload>::new(settings.queue_size).expect("valid queue size");
    let mut q2 = SpscQueue::<Payload>::new(settings.queue_size).expect("valid queue size");
    let (mut q1_tx, mut q1_rx) = q1.split();
    let (mut q2_tx, mut q2_rx) = q2.split();
    let iterations = settings.iterations;
    let consumer_cpu = settings.consumer_cpu;

    pin_to_cpu(settings.producer_cpu);

    let elapsed = thread::scope(|s| {
        s.spawn(move || {
            pin_to_cpu(consumer_cpu);
            for _ in 0..iterations {
                let value = loop {
                    if let Some(&value) = q1_rx.peek() {
                        break value;
                    }
                    hint::spin_loop();
                };
                q2_tx.push(value);
                q1_rx.try_pop();
            }
        });

        let start = Instant::now();
        for i in 0..iterations as i32 {
            q1_tx.push(Payload(i));
            q2_rx.pop();
        }
        start.elapsed()
    });

    println!(
        "{:>12} ns RTT",
        elapsed.as_nanos() / iterations.max(1) as u128
    );
}

fn main() {
    turbo_spsc::init_tracing();
    let settings = settings();

    println!("Turbo SPSC pinned benchmark");
    println!("===========================");
    println!(
        "producer cpu: {:?}, consumer cpu: {:?}, queue size: {}, iterations: {}\n",
        settings.producer_cpu, settings.consumer_cpu, settings.queue_size, settings.iterations
    );

    bench_throughput(&settings);
    bench_round_trip(&settings);
}
