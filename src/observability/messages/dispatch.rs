// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for event dispatch.
//!
//! This module contains message types for logging events related to:
//! * Fan-out of an event to its subscribed listeners
//! * Per-listener delivery scheduling
//! * Runaway event chains

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;
use uuid::Uuid;

/// Event fanned out to its listeners.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_flotilla::observability::messages::dispatch::EventDispatched;
///
/// let msg = EventDispatched {
///     event_id: uuid::Uuid::nil(),
///     event_type: "NodeStateChanged",
///     depth: 0,
///     subscribed: 2,
///     scheduled: 1,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct EventDispatched<'a> {
    pub event_id: Uuid,
    pub event_type: &'a str,
    pub depth: u32,
    pub subscribed: usize,
    pub scheduled: usize,
}

impl Display for EventDispatched<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Dispatched {} event {}: {} of {} subscribed listeners scheduled",
            self.event_type, self.event_id, self.scheduled, self.subscribed
        )
    }
}

impl StructuredLog for EventDispatched<'_> {
    fn log(&self) {
        tracing::info!(
            event_id = %self.event_id,
            event_type = self.event_type,
            depth = self.depth,
            subscribed = self.subscribed,
            scheduled = self.scheduled,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "dispatch",
            span_name = name,
            event_id = %self.event_id,
            event_type = self.event_type,
            depth = self.depth,
        )
    }
}

/// A listener accepted an event and a delivery was queued.
///
/// # Log Level
/// `debug!`
pub struct DeliveryScheduled<'a> {
    pub event_id: Uuid,
    pub listener: &'a str,
    pub delay: Duration,
}

impl Display for DeliveryScheduled<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        if self.delay.is_zero() {
            write!(
                f,
                "Scheduled listener '{}' for event {}",
                self.listener, self.event_id
            )
        } else {
            write!(
                f,
                "Scheduled listener '{}' for event {} in {:?}",
                self.listener, self.event_id, self.delay
            )
        }
    }
}

/// Listener declined an event at dispatch time.
pub struct ListenerDeclined<'a> {
    pub event_id: Uuid,
    pub listener: &'a str,
}

impl Display for ListenerDeclined<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Listener '{}' declined event {}",
            self.listener, self.event_id
        )
    }
}

/// Event dropped because its causal chain is too long.
///
/// # Log Level
/// `error!` - Usually a pair of listeners that keep re-triggering each other
pub struct EventChainTooDeep<'a> {
    pub event_id: Uuid,
    pub event_type: &'a str,
    pub depth: u32,
    pub max_depth: u32,
}

impl Display for EventChainTooDeep<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Refusing to dispatch {} event {}: causal depth {} exceeds limit {}",
            self.event_type, self.event_id, self.depth, self.max_depth
        )
    }
}

impl StructuredLog for EventChainTooDeep<'_> {
    fn log(&self) {
        tracing::error!(
            event_id = %self.event_id,
            event_type = self.event_type,
            depth = self.depth,
            max_depth = self.max_depth,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "event_chain_too_deep",
            span_name = name,
            event_id = %self.event_id,
            depth = self.depth,
        )
    }
}

/// Dispatch of an event from the outbox failed.
pub struct DispatchFailed<'a> {
    pub event_id: Uuid,
    pub error: &'a dyn std::error::Error,
}

impl Display for DispatchFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Failed to dispatch event {}: {}", self.event_id, self.error)
    }
}

pub struct DispatcherStopped {
    pub drained: usize,
}

impl Display for DispatcherStopped {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Dispatcher stopped after {} events", self.drained)
    }
}
