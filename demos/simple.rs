//! Simple usage example

use std::thread;
use std::time::Duration;

use turbo_spsc::SpscQueue;

fn main() {
    turbo_spsc::init_tracing();
    println!("Turbo SPSC - Simple Example\n");

    // Create a queue with 16 slots
    let mut queue = SpscQueue::<String>::new(16).expect("valid capacity");
    let (mut producer, mut consumer) = queue.split();

    thread::scope(|s| {
        s.spawn(move || {
            for i in 0..10 {
                let message = format!("Message {}", i);
                println!("Sending: {}", message);
                producer.push(message);

                // Small delay to make output readable
                thread::sleep(Duration::from_millis(100));
            }
            println!("Producer finished!");
        });

        s.spawn(move || {
            for _ in 0..10 {
                // Read-then-advance: look at the message before taking it
                loop {
                    if let Some(message) = consumer.peek() {
                        println!("Next up: {} ({} bytes)", message, message.len());
                        break;
                    }
                    std::hint::spin_loop();
                }
                let message = consumer.pop();
                println!("Received: {}", message);
            }
            println!("Consumer finished!");
        });
    });

    println!("\nExample completed successfully!");
}
