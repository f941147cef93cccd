// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Event dispatcher.
//!
//! Dispatch is a pure fan-out: for every listener subscribed to the event's
//! type whose `should_run` accepts it, one [`Delivery`] is submitted to the
//! task queue with that listener's delay. No listener code other than
//! `should_run` runs on the dispatching task.
//!
//! Events carry their causal depth. An event deeper than the configured
//! limit is logged and dropped instead of fanned out, which bounds chains
//! of listeners that keep re-triggering one another.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::ListenerRegistry;
use crate::errors::EngineResult;
use crate::events::{Event, EventInbox};
use crate::observability::messages::dispatch::{
    DeliveryScheduled, DispatchFailed, DispatcherStopped, EventChainTooDeep, EventDispatched,
    ListenerDeclined,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{Delivery, TaskQueue};

/// What one call to [`Dispatcher::dispatch`] did.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchReport {
    pub event_id: Uuid,
    /// Listener name and delay of every delivery submitted, in registration order.
    pub scheduled: Vec<(String, Duration)>,
    /// True when the event was dropped for exceeding the causal depth limit.
    pub suppressed: bool,
}

pub struct Dispatcher {
    registry: Arc<ListenerRegistry>,
    queue: Arc<dyn TaskQueue>,
    max_event_depth: u32,
}

impl Dispatcher {
    pub fn new(registry: Arc<ListenerRegistry>, queue: Arc<dyn TaskQueue>, max_event_depth: u32) -> Self {
        Self {
            registry,
            queue,
            max_event_depth,
        }
    }

    /// Fan `event` out to its subscribed listeners.
    ///
    /// An event type nobody subscribes to is not an error; the report just
    /// comes back empty.
    pub async fn dispatch(&self, event: &Event) -> EngineResult<DispatchReport> {
        let event_type = event.event_type();
        let mut report = DispatchReport {
            event_id: event.id(),
            scheduled: Vec::new(),
            suppressed: false,
        };

        if event.depth() > self.max_event_depth {
            EventChainTooDeep {
                event_id: event.id(),
                event_type: event_type.as_str(),
                depth: event.depth(),
                max_depth: self.max_event_depth,
            }
            .log();
            report.suppressed = true;
            return Ok(report);
        }

        let mut subscribed = 0;
        for listener in self.registry.listeners_for(&event_type) {
            subscribed += 1;

            if !listener.should_run(event) {
                tracing::debug!(
                    "{}",
                    ListenerDeclined {
                        event_id: event.id(),
                        listener: listener.name(),
                    }
                );
                continue;
            }

            let delay = listener.delay();
            self.queue
                .submit(Delivery::new(listener.name(), event.clone(), delay))
                .await?;
            tracing::debug!(
                "{}",
                DeliveryScheduled {
                    event_id: event.id(),
                    listener: listener.name(),
                    delay,
                }
            );
            report.scheduled.push((listener.name().to_string(), delay));
        }

        EventDispatched {
            event_id: event.id(),
            event_type: event_type.as_str(),
            depth: event.depth(),
            subscribed,
            scheduled: report.scheduled.len(),
        }
        .log();

        Ok(report)
    }

    /// Drain the event outbox on a background task until `shutdown` fires
    /// or every emitter is gone.
    pub fn spawn(self: Arc<Self>, mut inbox: EventInbox, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut drained = 0usize;
            loop {
                let event = tokio::select! {
                    _ = shutdown.cancelled() => break,
                    event = inbox.recv() => match event {
                        Some(event) => event,
                        None => break,
                    },
                };

                if let Err(err) = self.dispatch(&event).await {
                    tracing::error!(
                        "{}",
                        DispatchFailed {
                            event_id: event.id(),
                            error: &err,
                        }
                    );
                }
                inbox.ack();
                drained += 1;
            }
            tracing::info!("{}", DispatcherStopped { drained });
        })
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registry", &self.registry)
            .field("max_event_depth", &self.max_event_depth)
            .finish()
    }
}
