// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! In-process task queue for listener deliveries.
//!
//! Deliveries are kept in a min-heap keyed by the instant they become
//! runnable, so a delivery scheduled ten minutes out never blocks one that
//! is due now. Deliveries with the same ready instant come out in
//! submission order.
//!
//! Workers block in [`InMemoryTaskQueue::next`] until the earliest delivery
//! is due, a new delivery is submitted, or the queue is closed.
//!
//! ```rust
//! use std::time::Duration;
//! use the_flotilla::engine::InMemoryTaskQueue;
//! use the_flotilla::events::Event;
//! use the_flotilla::traits::{Delivery, TaskQueue};
//!
//! # let rt = tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap();
//! # rt.block_on(async {
//! let queue = InMemoryTaskQueue::new();
//! let event = Event::custom("FleetResized", serde_json::Value::Null);
//!
//! queue.submit(Delivery::new("later", event.clone(), Duration::from_millis(50))).await.unwrap();
//! queue.submit(Delivery::new("now", event, Duration::ZERO)).await.unwrap();
//!
//! assert_eq!(queue.next().await.unwrap().listener, "now");
//! assert_eq!(queue.next().await.unwrap().listener, "later");
//! # });
//! ```

use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use tokio::sync::{Mutex, Notify};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::errors::QueueError;
use crate::traits::{Delivery, TaskQueue};

struct ScheduledDelivery {
    ready_at: Instant,
    sequence: u64,
    delivery: Delivery,
}

impl PartialEq for ScheduledDelivery {
    fn eq(&self, other: &Self) -> bool {
        self.sequence == other.sequence
    }
}

impl Eq for ScheduledDelivery {}

impl PartialOrd for ScheduledDelivery {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledDelivery {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap: reverse so the earliest ready_at pops first
        other
            .ready_at
            .cmp(&self.ready_at)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

#[derive(Default)]
pub struct InMemoryTaskQueue {
    heap: Mutex<BinaryHeap<ScheduledDelivery>>,
    submitted: Notify,
    sequence: AtomicU64,
    closed: CancellationToken,
}

impl InMemoryTaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }
}

#[async_trait]
impl TaskQueue for InMemoryTaskQueue {
    async fn submit(&self, delivery: Delivery) -> Result<(), QueueError> {
        if self.is_closed() {
            return Err(QueueError::Closed);
        }

        let scheduled = ScheduledDelivery {
            ready_at: delivery.ready_at(),
            sequence: self.sequence.fetch_add(1, AtomicOrdering::SeqCst),
            delivery,
        };
        self.heap.lock().await.push(scheduled);
        self.submitted.notify_waiters();
        Ok(())
    }

    async fn next(&self) -> Option<Delivery> {
        loop {
            // Register interest before inspecting the heap so a submit that
            // lands in between still wakes us.
            let submitted = self.submitted.notified();
            tokio::pin!(submitted);
            submitted.as_mut().enable();

            if self.is_closed() {
                return None;
            }

            let wait_until = {
                let mut heap = self.heap.lock().await;
                match heap.peek() {
                    Some(top) if top.ready_at <= Instant::now() => {
                        return heap.pop().map(|scheduled| scheduled.delivery);
                    }
                    Some(top) => Some(top.ready_at),
                    None => None,
                }
            };

            match wait_until {
                Some(deadline) => {
                    tokio::select! {
                        _ = tokio::time::sleep_until(deadline) => {}
                        _ = &mut submitted => {}
                        _ = self.closed.cancelled() => return None,
                    }
                }
                None => {
                    tokio::select! {
                        _ = &mut submitted => {}
                        _ = self.closed.cancelled() => return None,
                    }
                }
            }
        }
    }

    async fn ready_len(&self) -> usize {
        let now = Instant::now();
        self.heap
            .lock()
            .await
            .iter()
            .filter(|scheduled| scheduled.ready_at <= now)
            .count()
    }

    async fn len(&self) -> usize {
        self.heap.lock().await.len()
    }

    fn close(&self) {
        self.closed.cancel();
    }
}
