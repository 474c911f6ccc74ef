use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use turbo_spsc::{ConfigurationError, InlineQueue, PushError, SpscQueue};

#[test]
fn test_basic_push_pop() {
    let mut queue = SpscQueue::<i32>::new(8).unwrap();
    let (mut tx, mut rx) = queue.split();

    tx.push(42);
    assert_eq!(rx.pop(), 42);
}

#[test]
fn test_fifo_order() {
    let mut queue = SpscQueue::<i32>::new(16).unwrap();
    let (mut tx, mut rx) = queue.split();

    for i in 0..16 {
        tx.push(i);
    }

    for i in 0..16 {
        assert_eq!(rx.try_pop(), Some(i));
    }
}

#[test]
fn test_full_queue() {
    let mut queue = SpscQueue::<i32>::new(4).unwrap();
    let (mut tx, _rx) = queue.split();

    for i in 0..4 {
        assert!(tx.try_push(i).is_ok());
    }

    assert_eq!(tx.try_push(99), Err(PushError(99)));
    assert_eq!(tx.len(), 4);
}

#[test]
fn test_empty_queue() {
    let mut queue = SpscQueue::<i32>::new(4).unwrap();
    assert!(queue.is_empty());
    assert_eq!(queue.len(), 0);

    let (_tx, mut rx) = queue.split();
    assert!(rx.peek().is_none());
    assert_eq!(rx.try_pop(), None);
}

#[test]
fn test_capacity() {
    let queue = SpscQueue::<i32>::new(1000).unwrap();
    assert_eq!(queue.capacity(), 1000);

    let inline = InlineQueue::<i32, 7>::new_inline().unwrap();
    assert_eq!(inline.capacity(), 7);
}

#[test]
fn test_len_and_empty() {
    let mut queue = SpscQueue::<i32>::new(8).unwrap();
    let (mut tx, mut rx) = queue.split();

    tx.push(1);
    tx.push(2);

    assert!(!rx.is_empty());
    assert_eq!(rx.len(), 2);
    rx.try_pop();
    assert_eq!(tx.len(), 1);
}

#[test]
fn test_zero_capacity_rejected() {
    assert_eq!(
        SpscQueue::<i32>::new(0).err(),
        Some(ConfigurationError::ZeroCapacity)
    );
    assert_eq!(
        InlineQueue::<i32, 0>::new_inline().err(),
        Some(ConfigurationError::ZeroCapacity)
    );
    assert_eq!(
        InlineQueue::<i32, 4>::with_capacity(0).err(),
        Some(ConfigurationError::ZeroCapacity)
    );
}

#[test]
fn test_capacity_mismatch_rejected() {
    let err = InlineQueue::<i32, 8>::with_capacity(4).unwrap_err();
    assert_eq!(
        err,
        ConfigurationError::CapacityMismatch {
            compile_time: 8,
            runtime: 4,
        }
    );
    assert!(err.to_string().contains("capacity mismatch"));

    let queue = InlineQueue::<i32, 8>::with_capacity(8).unwrap();
    assert_eq!(queue.capacity(), 8);
}

#[test]
fn test_oversized_capacity_reports_allocation_failure() {
    let err = SpscQueue::<()>::new(usize::MAX).unwrap_err();
    assert!(matches!(err, ConfigurationError::Allocation { .. }));
}

#[test]
fn test_capacity_ten_scenario() {
    let mut queue = SpscQueue::<i32>::new(10).unwrap();
    let (mut tx, mut rx) = queue.split();

    for i in 0..10 {
        tx.push(i);
    }
    assert!(tx.try_push(1).is_err());
    assert_eq!(rx.try_pop(), Some(0));
    assert!(tx.try_push(1).is_ok());
    assert_eq!(rx.len(), 10);
}

#[test]
fn test_capacity_one_scenario() {
    let mut queue = SpscQueue::<i32>::new(1).unwrap();
    let (mut tx, mut rx) = queue.split();

    tx.push(42);
    assert_eq!(tx.try_push(99), Err(PushError(99)));
    assert_eq!(rx.try_pop(), Some(42));
    assert!(rx.is_empty());
}

#[test]
fn test_wrap_around() {
    let mut queue = SpscQueue::<usize>::new(5).unwrap();
    let (mut tx, mut rx) = queue.split();

    for cycle in 0..3 {
        for i in 0..5 {
            tx.push(cycle * 100 + i);
        }
        assert_eq!(rx.len(), 5);
        for i in 0..5 {
            assert_eq!(rx.try_pop(), Some(cycle * 100 + i));
        }
        assert!(rx.is_empty());
    }
}

#[test]
fn test_alternating_push_pop() {
    let mut queue = InlineQueue::<i32, 4>::new_inline().unwrap();
    let (mut tx, mut rx) = queue.split();

    for i in 0..100 {
        tx.push(i);
        tx.push(i + 1000);
        assert_eq!(rx.len(), 2);
        assert_eq!(rx.try_pop(), Some(i));
        assert_eq!(rx.try_pop(), Some(i + 1000));
        assert_eq!(rx.len(), 0);
    }
}

#[test]
fn test_overwrite_always_succeeds() {
    let mut queue = SpscQueue::<i32>::new(10).unwrap();
    let (mut tx, mut rx) = queue.split();

    for i in 0..10 {
        tx.push(i);
    }
    assert!(tx.try_push(10).is_err());

    // SAFETY: single thread, the consumer is not reading.
    unsafe {
        tx.force_push(10);
        tx.force_push(10);
    }
    assert_eq!(rx.try_pop(), Some(10));
}

#[test]
fn test_push_error_returns_value() {
    let mut queue = SpscQueue::<String>::new(2).unwrap();
    let (mut tx, _rx) = queue.split();

    tx.try_push("first".to_string()).unwrap();
    tx.try_push("second".to_string()).unwrap();

    match tx.try_push("third".to_string()) {
        Err(PushError(value)) => assert_eq!(value, "third"),
        _ => panic!("Expected PushError"),
    }
}

#[test]
fn test_move_only_round_trip() {
    let mut queue = SpscQueue::<Box<i32>>::new(10).unwrap();
    let (mut tx, mut rx) = queue.split();

    tx.push(Box::new(1));
    tx.emplace_with(|| Box::new(2));
    assert!(tx.try_push(Box::new(3)).is_ok());
    assert!(tx.try_emplace_with(|| Box::new(4)));
    assert_eq!(rx.len(), 4);

    assert_eq!(rx.try_pop().as_deref(), Some(&1));
    assert_eq!(rx.len(), 3);
    assert_eq!(*rx.pop(), 2);
}

#[test]
fn test_copy_only_elements() {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Tick {
        seq: u32,
        price: u64,
    }

    let mut queue = SpscQueue::<Tick>::new(10).unwrap();
    let (mut tx, mut rx) = queue.split();
    let tick = Tick { seq: 1, price: 100 };

    tx.push(tick);
    assert!(tx.try_push(tick).is_ok());
    tx.push_cloned(&tick);
    assert!(tx.try_push_cloned(&tick));
    // SAFETY: single thread, the consumer is not reading.
    unsafe { tx.force_push(tick) };
    assert_eq!(rx.len(), 5);
    assert_eq!(rx.try_pop(), Some(tick));
    assert_eq!(rx.len(), 4);
}

#[test]
fn test_zero_sized_elements() {
    let mut queue = SpscQueue::<()>::new(3).unwrap();
    let (mut tx, mut rx) = queue.split();

    for _ in 0..3 {
        assert!(tx.try_push(()).is_ok());
    }
    assert!(tx.try_push(()).is_err());
    assert_eq!(rx.drain().count(), 3);
}

#[test]
fn test_drop_elements() {
    static DROP_COUNT: AtomicUsize = AtomicUsize::new(0);

    #[derive(Debug)]
    struct DropCounter;

    impl Drop for DropCounter {
        fn drop(&mut self) {
            DROP_COUNT.fetch_add(1, Ordering::Relaxed);
        }
    }

    {
        let mut queue = SpscQueue::<DropCounter>::new(8).unwrap();
        let (mut tx, mut rx) = queue.split();
        for _ in 0..5 {
            tx.push(DropCounter);
        }
        let popped = rx.try_pop();
        assert!(popped.is_some());
        drop(popped);
        assert_eq!(DROP_COUNT.load(Ordering::Relaxed), 1);
    }

    assert_eq!(DROP_COUNT.load(Ordering::Relaxed), 5);
}

#[test]
fn test_exactly_one_drop_across_wraparound() {
    static DROP_COUNT: AtomicUsize = AtomicUsize::new(0);

    struct Tracked(#[allow(dead_code)] Box<usize>);

    impl Drop for Tracked {
        fn drop(&mut self) {
            DROP_COUNT.fetch_add(1, Ordering::Relaxed);
        }
    }

    {
        let mut queue = SpscQueue::<Tracked>::new(3).unwrap();
        let (mut tx, mut rx) = queue.split();
        for i in 0..20 {
            tx.push(Tracked(Box::new(i)));
            if i % 2 == 1 {
                rx.try_pop();
                rx.try_pop();
            }
        }
    }

    assert_eq!(DROP_COUNT.load(Ordering::Relaxed), 20);
}

#[test]
fn test_overwrite_drops_replaced_elements() {
    static DROP_COUNT: AtomicUsize = AtomicUsize::new(0);

    struct Sample(#[allow(dead_code)] Box<u32>);

    impl Drop for Sample {
        fn drop(&mut self) {
            DROP_COUNT.fetch_add(1, Ordering::Relaxed);
        }
    }

    {
        let mut queue = SpscQueue::<Sample>::new(4).unwrap();
        let (mut tx, _rx) = queue.split();
        for i in 0..100 {
            // SAFETY: single thread, the consumer is not reading.
            unsafe { tx.force_push(Sample(Box::new(i))) };
        }
        // every slot of the ring (capacity + 1) still holds a sample
        assert_eq!(DROP_COUNT.load(Ordering::Relaxed), 100 - 5);
    }

    assert_eq!(DROP_COUNT.load(Ordering::Relaxed), 100);
}

#[test]
fn test_overwrite_laps_with_consumer_in_between() {
    static DROP_COUNT: AtomicUsize = AtomicUsize::new(0);

    struct Sample(u32);

    impl Drop for Sample {
        fn drop(&mut self) {
            DROP_COUNT.fetch_add(1, Ordering::Relaxed);
        }
    }

    let mut inserted = 0;
    {
        let mut queue = SpscQueue::<Sample>::new(3).unwrap();
        let (mut tx, mut rx) = queue.split();
        for lap in 0..10u32 {
            for i in 0..7 {
                // SAFETY: single thread, the consumer is not reading.
                unsafe { tx.force_push(Sample(lap * 10 + i)) };
                inserted += 1;
            }
            if let Some(sample) = rx.try_pop() {
                assert!(sample.0 < (lap + 1) * 10);
            }
        }
        assert!(rx.len() <= rx.capacity());
    }

    assert_eq!(DROP_COUNT.load(Ordering::Relaxed), inserted);
}

#[test]
fn test_spsc_scoped_threads() {
    let mut queue = SpscQueue::<usize>::new(128).unwrap();
    let (mut tx, mut rx) = queue.split();

    thread::scope(|s| {
        s.spawn(move || {
            for i in 0..100_000 {
                tx.push(i);
            }
        });

        s.spawn(move || {
            for i in 0..100_000 {
                assert_eq!(rx.pop(), i);
            }
        });
    });

    assert!(queue.is_empty());
}

#[test]
fn test_spsc_owned_handles() {
    let (mut tx, mut rx) = SpscQueue::<usize>::new(64).unwrap().into_split();

    let producer = thread::spawn(move || {
        for i in 0..10_000 {
            while tx.try_push(i).is_err() {
                std::hint::spin_loop();
            }
        }
    });

    let consumer = thread::spawn(move || {
        for i in 0..10_000 {
            loop {
                if let Some(val) = rx.try_pop() {
                    assert_eq!(val, i);
                    break;
                }
                std::hint::spin_loop();
            }
        }
    });

    producer.join().unwrap();
    consumer.join().unwrap();
}

#[test]
fn test_peek_then_pop_threaded() {
    let mut queue = InlineQueue::<u64, 32>::new_inline().unwrap();
    let (mut tx, mut rx) = queue.split();

    thread::scope(|s| {
        s.spawn(move || {
            for i in 0..50_000u64 {
                tx.push(i);
            }
        });

        for i in 0..50_000u64 {
            loop {
                if let Some(&val) = rx.peek() {
                    assert_eq!(val, i);
                    break;
                }
                std::hint::spin_loop();
            }
            assert_eq!(rx.try_pop(), Some(i));
        }
    });
}

#[test]
fn test_round_trip_two_queues() {
    let mut requests = SpscQueue::<u32>::new(16).unwrap();
    let mut replies = SpscQueue::<u32>::new(16).unwrap();
    let (mut req_tx, mut req_rx) = requests.split();
    let (mut rep_tx, mut rep_rx) = replies.split();

    thread::scope(|s| {
        s.spawn(move || {
            for _ in 0..10_000 {
                let value = req_rx.pop();
                rep_tx.push(value + 1);
            }
        });

        for i in 0..10_000 {
            req_tx.push(i);
            assert_eq!(rep_rx.pop(), i + 1);
        }
    });
}

// Long spin-heavy run; `cargo test --release -- --ignored --test-threads=1`.
#[test]
#[ignore]
fn test_ordered_ten_million() {
    const COUNT: u64 = 10_000_000;
    let mut queue = SpscQueue::<u64>::new(1024).unwrap();
    let (mut tx, mut rx) = queue.split();

    thread::scope(|s| {
        s.spawn(move || {
            for i in 0..COUNT {
                tx.push(i);
            }
        });

        s.spawn(move || {
            let mut expected = 0;
            while expected < COUNT {
                let value = rx.pop();
                assert_eq!(value, expected, "lost or duplicated element");
                expected += 1;
            }
            assert!(rx.try_pop().is_none());
        });
    });
}
