//! Bounded-latency producer with `force_push`.
//!
//! The sensor thread never waits: it keeps writing no matter how far behind
//! the reader is. Once the write cursor laps the reader the backlog is
//! abandoned, so each burst the reader only sees the samples written since the
//! last lap. The reader only looks at the ring after the sensor has finished
//! a burst, which is what makes `force_push` sound here.

use std::sync::Barrier;
use std::thread;

use turbo_spsc::InlineQueue;

const WINDOW: usize = 8;
const BURSTS: u32 = 4;
const SAMPLES_PER_BURST: u32 = 12;

fn main() {
    println!("Latest-samples example (window of {})\n", WINDOW);

    let mut queue = InlineQueue::<u32, WINDOW>::new_inline().expect("non-zero window");
    let (mut sensor, mut reader) = queue.split();
    let burst_done = Barrier::new(2);
    let read_done = Barrier::new(2);

    thread::scope(|s| {
        s.spawn(|| {
            let mut sample = 0;
            for _ in 0..BURSTS {
                for _ in 0..SAMPLES_PER_BURST {
                    // SAFETY: the reader is parked on `burst_done` until this
                    // burst is over, so no slot is read while being written.
                    unsafe { sensor.force_push(sample) };
                    sample += 1;
                }
                burst_done.wait();
                read_done.wait();
            }
        });

        for burst in 0..BURSTS {
            burst_done.wait();
            let window: Vec<u32> = reader.drain().collect();
            println!("burst {}: {:?}", burst, window);
            read_done.wait();
        }
    });
}
