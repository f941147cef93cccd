// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Events: immutable facts about state changes, and the channel that
//! carries them from the code that mutates state to the dispatcher.

mod cause;
mod emitter;
mod event;

pub use cause::{current_cause, within_delivery, EventCause};
pub use emitter::{event_channel, EventEmitter, EventInbox};
pub use event::{Event, EventPayload, EventType};
