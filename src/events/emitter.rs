// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Outbox between state-mutating code and the dispatcher.
//!
//! Managers never call listeners or the dispatcher directly. They push the
//! event into this channel and return; the dispatcher pump drains it. An
//! event that a listener emits therefore becomes another pending delivery
//! instead of a nested call.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

use super::event::Event;
use crate::errors::QueueError;

#[derive(Clone, Debug)]
pub struct EventEmitter {
    tx: mpsc::UnboundedSender<Event>,
    pending: Arc<AtomicUsize>,
}

#[derive(Debug)]
pub struct EventInbox {
    rx: mpsc::UnboundedReceiver<Event>,
    pending: Arc<AtomicUsize>,
}

pub fn event_channel() -> (EventEmitter, EventInbox) {
    let (tx, rx) = mpsc::unbounded_channel();
    let pending = Arc::new(AtomicUsize::new(0));
    (
        EventEmitter {
            tx,
            pending: Arc::clone(&pending),
        },
        EventInbox { rx, pending },
    )
}

impl EventEmitter {
    /// Hand an event to the dispatcher. Never waits.
    pub fn emit(&self, event: Event) -> Result<(), QueueError> {
        self.pending.fetch_add(1, Ordering::SeqCst);
        self.tx.send(event).map_err(|_| {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            QueueError::Closed
        })
    }

    /// Events emitted but not yet dispatched.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }
}

impl EventInbox {
    pub async fn recv(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    /// Mark one received event as fully dispatched.
    pub fn ack(&self) {
        self.pending.fetch_sub(1, Ordering::SeqCst);
    }
}
