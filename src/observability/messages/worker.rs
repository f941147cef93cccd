// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the worker pool.
//!
//! This module contains message types for logging events related to:
//! * Worker pool startup and shutdown
//! * Individual delivery execution
//! * Listener failures, panics and redelivery

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;
use uuid::Uuid;

/// Worker pool started.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_flotilla::observability::messages::worker::WorkerPoolStarted;
///
/// let msg = WorkerPoolStarted {
///     worker_count: 4,
///     max_delivery_attempts: 1,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct WorkerPoolStarted {
    pub worker_count: usize,
    pub max_delivery_attempts: u32,
}

impl Display for WorkerPoolStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Started {} workers (max {} attempts per delivery)",
            self.worker_count, self.max_delivery_attempts
        )
    }
}

impl StructuredLog for WorkerPoolStarted {
    fn log(&self) {
        tracing::info!(
            worker_count = self.worker_count,
            max_delivery_attempts = self.max_delivery_attempts,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "worker_pool",
            span_name = name,
            worker_count = self.worker_count,
        )
    }
}

/// A worker began running a delivery.
///
/// # Log Level
/// `debug!`
pub struct DeliveryStarted<'a> {
    pub worker_id: usize,
    pub delivery_id: Uuid,
    pub event_id: Uuid,
    pub listener: &'a str,
    pub attempt: u32,
}

impl Display for DeliveryStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker {} running listener '{}' for event {} (attempt {})",
            self.worker_id, self.listener, self.event_id, self.attempt
        )
    }
}

impl StructuredLog for DeliveryStarted<'_> {
    fn log(&self) {
        tracing::debug!(
            worker_id = self.worker_id,
            delivery_id = %self.delivery_id,
            event_id = %self.event_id,
            listener = self.listener,
            attempt = self.attempt,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "delivery",
            span_name = name,
            delivery_id = %self.delivery_id,
            event_id = %self.event_id,
            listener = self.listener,
            attempt = self.attempt,
        )
    }
}

pub struct DeliveryCompleted<'a> {
    pub listener: &'a str,
    pub duration: Duration,
}

impl Display for DeliveryCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Listener '{}' completed in {:?}",
            self.listener, self.duration
        )
    }
}

/// Listener returned an error or panicked.
///
/// # Log Level
/// `warn!` - The substrate may still retry
pub struct DeliveryFailed<'a> {
    pub listener: &'a str,
    pub attempt: u32,
    pub reason: &'a str,
}

impl Display for DeliveryFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Listener '{}' failed on attempt {}: {}",
            self.listener, self.attempt, self.reason
        )
    }
}

impl StructuredLog for DeliveryFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            listener = self.listener,
            attempt = self.attempt,
            reason = self.reason,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "delivery_failed",
            span_name = name,
            listener = self.listener,
            attempt = self.attempt,
        )
    }
}

pub struct DeliveryRetryScheduled<'a> {
    pub listener: &'a str,
    pub next_attempt: u32,
    pub backoff: Duration,
}

impl Display for DeliveryRetryScheduled<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Redelivering to listener '{}' in {:?} (attempt {})",
            self.listener, self.backoff, self.next_attempt
        )
    }
}

/// Delivery given up after its final attempt.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct DeliveryAbandoned<'a> {
    pub listener: &'a str,
    pub event_id: Uuid,
    pub attempts: u32,
    pub reason: &'a str,
}

impl Display for DeliveryAbandoned<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Giving up on listener '{}' for event {} after {} attempts: {}",
            self.listener, self.event_id, self.attempts, self.reason
        )
    }
}

impl StructuredLog for DeliveryAbandoned<'_> {
    fn log(&self) {
        tracing::error!(
            listener = self.listener,
            event_id = %self.event_id,
            attempts = self.attempts,
            reason = self.reason,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "delivery_abandoned",
            span_name = name,
            listener = self.listener,
            event_id = %self.event_id,
        )
    }
}

pub struct UnknownListener<'a> {
    pub listener: &'a str,
}

impl Display for UnknownListener<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Dropping delivery for unregistered listener '{}'",
            self.listener
        )
    }
}

pub struct WorkerStopped {
    pub worker_id: usize,
    pub processed: usize,
}

impl Display for WorkerStopped {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker {} stopped after {} deliveries",
            self.worker_id, self.processed
        )
    }
}
