// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::dispatcher::Dispatcher;
use super::worker::WorkerPool;
use crate::actions::ActionManager;
use crate::config::{ListenerRegistry, ResourceAdapterRegistry};
use crate::errors::EngineResult;
use crate::events::{Event, EventEmitter};
use crate::nodes::NodeManager;
use crate::traits::TaskQueue;

const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// A running engine: managers for callers, plus the background dispatcher
/// pump and worker pool that carry their events to listeners.
///
/// Built by [`crate::config::RuntimeBuilder`].
pub struct Runtime {
    pub(crate) actions: ActionManager,
    pub(crate) nodes: NodeManager,
    pub(crate) adapters: Arc<ResourceAdapterRegistry>,
    pub(crate) listeners: Arc<ListenerRegistry>,
    pub(crate) dispatcher: Arc<Dispatcher>,
    pub(crate) queue: Arc<dyn TaskQueue>,
    pub(crate) emitter: EventEmitter,
    pub(crate) workers: WorkerPool,
    pub(crate) pump: JoinHandle<()>,
    pub(crate) shutdown: CancellationToken,
}

impl Runtime {
    pub fn actions(&self) -> &ActionManager {
        &self.actions
    }

    pub fn nodes(&self) -> &NodeManager {
        &self.nodes
    }

    pub fn adapters(&self) -> &Arc<ResourceAdapterRegistry> {
        &self.adapters
    }

    pub fn listeners(&self) -> &Arc<ListenerRegistry> {
        &self.listeners
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub fn queue(&self) -> &Arc<dyn TaskQueue> {
        &self.queue
    }

    /// Publish an event of any type to the dispatcher.
    pub fn emit(&self, event: Event) -> EngineResult<()> {
        Ok(self.emitter.emit(event)?)
    }

    /// True when no event awaits dispatch, no delivery is due and no
    /// worker is busy. Deliveries scheduled for later do not count.
    pub async fn is_idle(&self) -> bool {
        self.emitter.pending() == 0 && self.workers.active() == 0 && self.queue.ready_len().await == 0
    }

    /// Wait until the engine has run out of immediate work.
    pub async fn wait_idle(&self) {
        let mut quiet = 0;
        while quiet < 2 {
            tokio::time::sleep(IDLE_POLL_INTERVAL).await;
            if self.is_idle().await {
                quiet += 1;
            } else {
                quiet = 0;
            }
        }
    }

    /// Stop dispatching, close the queue and wait for running deliveries.
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        if let Err(err) = self.pump.await {
            tracing::error!("Dispatcher task ended abnormally: {}", err);
        }
        self.workers.shutdown().await;
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("adapters", &self.adapters)
            .field("listeners", &self.listeners)
            .field("workers", &self.workers.worker_count())
            .finish()
    }
}
