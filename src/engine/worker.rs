// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Worker pool draining the task queue.
//!
//! Each worker pulls the next runnable [`Delivery`], resolves its listener
//! by name and runs it inside the delivery's causal scope. A listener that
//! returns an error or panics never takes the worker down with it: the
//! failure is logged and, if attempts remain, the delivery is resubmitted
//! after the configured backoff.

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::config::{ListenerRegistry, WorkerConfig};
use crate::errors::{describe_failure, panic_message};
use crate::events::within_delivery;
use crate::observability::messages::worker::{
    DeliveryAbandoned, DeliveryCompleted, DeliveryFailed, DeliveryRetryScheduled,
    DeliveryStarted, UnknownListener, WorkerPoolStarted, WorkerStopped,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{Delivery, TaskQueue};

#[derive(Debug, Clone, PartialEq)]
pub struct WorkerOptions {
    pub count: usize,
    /// Total attempts per delivery, the first one included.
    pub max_delivery_attempts: u32,
    pub retry_backoff: Duration,
}

impl WorkerOptions {
    pub fn from_config(cfg: &WorkerConfig) -> Self {
        Self {
            count: cfg.count,
            max_delivery_attempts: cfg.max_delivery_attempts,
            retry_backoff: cfg.retry_backoff(),
        }
    }
}

/// How a single delivery ended.
#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryOutcome {
    Completed,
    /// Failed and resubmitted as `next_attempt`.
    Retried { next_attempt: u32 },
    /// Failed on its last allowed attempt.
    Abandoned { reason: String },
    /// No listener is registered under the delivery's name.
    UnknownListener,
}

/// Runs individual deliveries. Shared by every worker of a pool.
pub struct DeliveryRunner {
    queue: Arc<dyn TaskQueue>,
    registry: Arc<ListenerRegistry>,
    options: WorkerOptions,
}

impl DeliveryRunner {
    pub fn new(queue: Arc<dyn TaskQueue>, registry: Arc<ListenerRegistry>, options: WorkerOptions) -> Self {
        Self {
            queue,
            registry,
            options,
        }
    }

    pub async fn run_delivery(&self, worker_id: usize, delivery: Delivery) -> DeliveryOutcome {
        let Some(listener) = self.registry.get(&delivery.listener) else {
            tracing::warn!("{}", UnknownListener { listener: &delivery.listener });
            return DeliveryOutcome::UnknownListener;
        };

        let started = DeliveryStarted {
            worker_id,
            delivery_id: delivery.id,
            event_id: delivery.event.id(),
            listener: &delivery.listener,
            attempt: delivery.attempt,
        };
        let span = started.span("delivery");
        started.log();

        let clock = Instant::now();
        let result = AssertUnwindSafe(within_delivery(&delivery.event, listener.run(&delivery.event)))
            .catch_unwind()
            .instrument(span)
            .await;

        let reason = match result {
            Ok(Ok(())) => {
                tracing::debug!(
                    "{}",
                    DeliveryCompleted {
                        listener: &delivery.listener,
                        duration: clock.elapsed(),
                    }
                );
                return DeliveryOutcome::Completed;
            }
            Ok(Err(err)) => describe_failure(&err),
            Err(panic) => format!("listener panicked: {}", panic_message(panic.as_ref())),
        };

        DeliveryFailed {
            listener: &delivery.listener,
            attempt: delivery.attempt,
            reason: &reason,
        }
        .log();

        self.retry_or_abandon(delivery, reason).await
    }

    async fn retry_or_abandon(&self, delivery: Delivery, reason: String) -> DeliveryOutcome {
        if delivery.attempt < self.options.max_delivery_attempts {
            let retry = delivery.redelivery(self.options.retry_backoff);
            let next_attempt = retry.attempt;
            match self.queue.submit(retry).await {
                Ok(()) => {
                    tracing::info!(
                        "{}",
                        DeliveryRetryScheduled {
                            listener: &delivery.listener,
                            next_attempt,
                            backoff: self.options.retry_backoff,
                        }
                    );
                    return DeliveryOutcome::Retried { next_attempt };
                }
                Err(err) => {
                    tracing::warn!("Could not resubmit delivery {}: {}", delivery.id, err);
                }
            }
        }

        DeliveryAbandoned {
            listener: &delivery.listener,
            event_id: delivery.event.id(),
            attempts: delivery.attempt,
            reason: &reason,
        }
        .log();
        DeliveryOutcome::Abandoned { reason }
    }
}

/// Fixed-size pool of workers over one task queue.
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
    active: Arc<AtomicUsize>,
    queue: Arc<dyn TaskQueue>,
}

impl WorkerPool {
    pub fn spawn(options: WorkerOptions, queue: Arc<dyn TaskQueue>, registry: Arc<ListenerRegistry>) -> Self {
        let count = options.count.max(1);
        WorkerPoolStarted {
            worker_count: count,
            max_delivery_attempts: options.max_delivery_attempts,
        }
        .log();

        let runner = Arc::new(DeliveryRunner::new(Arc::clone(&queue), registry, options));
        let active = Arc::new(AtomicUsize::new(0));

        let handles = (0..count)
            .map(|worker_id| {
                let runner = Arc::clone(&runner);
                let queue = Arc::clone(&queue);
                let active = Arc::clone(&active);
                tokio::spawn(async move {
                    let mut processed = 0usize;
                    while let Some(delivery) = queue.next().await {
                        active.fetch_add(1, Ordering::SeqCst);
                        runner.run_delivery(worker_id, delivery).await;
                        active.fetch_sub(1, Ordering::SeqCst);
                        processed += 1;
                    }
                    tracing::debug!("{}", WorkerStopped { worker_id, processed });
                })
            })
            .collect();

        Self {
            handles,
            active,
            queue,
        }
    }

    /// Deliveries currently being run.
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    pub fn worker_count(&self) -> usize {
        self.handles.len()
    }

    /// Close the queue and wait for in-flight deliveries to finish.
    ///
    /// Deliveries still waiting in the queue are dropped.
    pub async fn shutdown(self) {
        self.queue.close();
        for handle in self.handles {
            if let Err(err) = handle.await {
                tracing::error!("Worker task ended abnormally: {}", err);
            }
        }
    }
}
