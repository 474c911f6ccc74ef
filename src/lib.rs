//! turbo_spsc - bounded lock-free single-producer/single-consumer ring buffer
//!
//! A fixed-capacity queue for handing values from exactly one thread to
//! exactly one other with no locks and no syscalls:
//!
//! - one hidden spare slot tells full from empty, so the two cursors are the
//!   whole synchronization surface (release store, acquire load)
//! - each side caches the other side's cursor and only reloads it when the
//!   cache says full (producer) or empty (consumer)
//! - cursors sit on their own cache lines and the slot array is padded on
//!   both ends against false sharing
//! - slots live on the heap ([`HeapStorage`]) or inline with a compile-time
//!   capacity ([`InlineStorage`])
//!
//! Blocking `push`/`pop` busy-wait; `try_push`/`try_pop`/`peek` never wait.
//! `force_push` skips the fullness check and is `unsafe`.
//!
//! ```
//! use turbo_spsc::SpscQueue;
//!
//! let mut queue = SpscQueue::<u64>::new(1024).unwrap();
//! let (mut tx, mut rx) = queue.split();
//!
//! std::thread::scope(|s| {
//!     s.spawn(move || {
//!         for i in 0..10_000 {
//!             tx.push(i);
//!         }
//!     });
//!     for i in 0..10_000 {
//!         assert_eq!(rx.pop(), i);
//!     }
//! });
//! ```
#![warn(missing_docs)]

mod consumer;
mod error;
pub mod layout;
mod producer;
mod queue;
mod storage;
mod sync;
mod trace;

pub use consumer::{Consumer, Drain};
pub use error::{ConfigurationError, PushError};
pub use producer::Producer;
pub use queue::{HeapQueue, InlineQueue, SpscQueue};
pub use storage::{HeapStorage, InlineStorage, Slot, Storage};
pub use trace::init_tracing;
