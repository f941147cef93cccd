// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::future::Future;
use uuid::Uuid;

use super::event::Event;

/// Link from an event back to the event whose delivery produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCause {
    pub event_id: Uuid,
    pub depth: u32,
}

tokio::task_local! {
    static CURRENT_CAUSE: EventCause;
}

/// Cause to stamp on an event built right now, if a delivery is running.
pub fn current_cause() -> Option<EventCause> {
    CURRENT_CAUSE.try_with(|cause| *cause).ok()
}

/// Run `fut` as the delivery of `event`; events built inside it are caused by `event`.
pub async fn within_delivery<F: Future>(event: &Event, fut: F) -> F::Output {
    let cause = EventCause {
        event_id: event.id(),
        depth: event.depth() + 1,
    };
    CURRENT_CAUSE.scope(cause, fut).await
}
