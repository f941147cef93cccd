// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::time::Duration;

use crate::errors::EngineResult;
use crate::events::{Event, EventType};

/// A reaction to events.
///
/// `should_run` is evaluated by the dispatcher at dispatch time and must not
/// touch storage. `run` happens later, on a worker, after `delay()` has
/// elapsed; it must re-read any durable state it depends on because the
/// world may have moved on in between.
#[async_trait]
pub trait Listener: Send + Sync {
    /// Unique definition id. Queued deliveries refer to the listener by it.
    fn name(&self) -> &'static str;

    fn event_types(&self) -> Vec<EventType>;

    fn should_run(&self, _event: &Event) -> bool {
        true
    }

    fn delay(&self) -> Duration {
        Duration::ZERO
    }

    async fn run(&self, event: &Event) -> EngineResult<()>;
}
