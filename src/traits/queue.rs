// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;
use uuid::Uuid;

use crate::errors::QueueError;
use crate::events::Event;

/// One scheduled invocation of one listener for one event.
///
/// This is the unit a queue substrate stores and hands to workers. Only the
/// listener's definition id travels with it; the worker resolves the
/// listener from its own registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Delivery {
    pub id: Uuid,
    pub listener: String,
    pub event: Event,
    pub not_before: DateTime<Utc>,
    /// 1 for the first attempt, incremented on each redelivery.
    pub attempt: u32,
    #[serde(skip)]
    ready_at: Option<Instant>,
}

impl Delivery {
    pub fn new(listener: impl Into<String>, event: Event, delay: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            listener: listener.into(),
            event,
            not_before: Utc::now() + chrono::Duration::from_std(delay).unwrap_or(chrono::Duration::zero()),
            attempt: 1,
            ready_at: Some(Instant::now() + delay),
        }
    }

    /// The same delivery scheduled again after `backoff`.
    pub fn redelivery(&self, backoff: Duration) -> Self {
        let mut next = Self::new(self.listener.clone(), self.event.clone(), backoff);
        next.id = self.id;
        next.attempt = self.attempt + 1;
        next
    }

    /// Monotonic instant at which the delivery becomes runnable.
    ///
    /// Deliveries deserialized from elsewhere carry only `not_before`; the
    /// instant is derived from the remaining wall-clock wait.
    pub fn ready_at(&self) -> Instant {
        self.ready_at.unwrap_or_else(|| {
            let remaining = (self.not_before - Utc::now())
                .to_std()
                .unwrap_or(Duration::ZERO);
            Instant::now() + remaining
        })
    }
}

/// Durable queue of pending deliveries.
///
/// `next` yields deliveries whose `not_before` has passed and returns
/// `None` once the queue is closed.
#[async_trait]
pub trait TaskQueue: Send + Sync {
    async fn submit(&self, delivery: Delivery) -> Result<(), QueueError>;

    async fn next(&self) -> Option<Delivery>;

    /// Deliveries that are runnable right now.
    async fn ready_len(&self) -> usize;

    async fn len(&self) -> usize;

    fn close(&self);
}
