// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::actions::{ActionManager, TableActionStore};
use crate::config::consts::{ACTIONS_FILE_NAME, NODES_FILE_NAME};
use crate::config::{Config, ListenerRegistry, ResourceAdapterRegistry, StoreKind};
use crate::engine::{Dispatcher, InMemoryTaskQueue, Runtime, WorkerOptions, WorkerPool};
use crate::errors::{ConfigError, ValidationError};
use crate::events::{event_channel, EventEmitter};
use crate::listeners::{CloudServerActionListener, NodeProvisioningListener};
use crate::nodes::{NodeManager, TableNodeStore};
use crate::traits::{ActionStore, Listener, NodeStore, ResourceAdapter, TaskQueue};

/// Handles a listener factory can capture when the runtime is assembled.
#[derive(Clone)]
pub struct ListenerContext {
    pub emitter: EventEmitter,
    pub actions: ActionManager,
    pub nodes: NodeManager,
    pub adapters: Arc<ResourceAdapterRegistry>,
}

type ListenerFactory = Box<dyn FnOnce(&ListenerContext) -> Arc<dyn Listener> + Send>;

/// Runtime builder - assembles stores, registries, dispatcher and workers from configuration.
///
/// The built-in listeners (action executor and provisioning watchdog) are
/// always registered first. Extra adapters and listeners can be added
/// before [`build`](Self::build); listeners are created through a factory
/// so they can hold the runtime's emitter and managers.
///
/// # Examples
///
/// ```
/// use the_flotilla::config::{Config, RuntimeBuilder};
///
/// # let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
/// # rt.block_on(async {
/// let runtime = RuntimeBuilder::from_config(&Config::default()).await.unwrap();
///
/// assert_eq!(
///     runtime.listeners().names(),
///     vec!["cloud_server_action", "node_provisioning"]
/// );
///
/// runtime.shutdown().await;
/// # });
/// ```
pub struct RuntimeBuilder {
    config: Config,
    adapters: Vec<Arc<dyn ResourceAdapter>>,
    listeners: Vec<ListenerFactory>,
}

impl RuntimeBuilder {
    /// Build and start a runtime exactly as the configuration describes.
    pub async fn from_config(cfg: &Config) -> Result<Runtime, ConfigError> {
        Self::new(cfg.clone()).build().await
    }

    pub fn new(config: Config) -> Self {
        Self {
            config,
            adapters: Vec::new(),
            listeners: Vec::new(),
        }
    }

    /// Register an adapter in addition to the configured ones.
    pub fn with_adapter(mut self, adapter: Arc<dyn ResourceAdapter>) -> Self {
        self.adapters.push(adapter);
        self
    }

    pub fn with_listener<F>(mut self, factory: F) -> Self
    where
        F: FnOnce(&ListenerContext) -> Arc<dyn Listener> + Send + 'static,
    {
        self.listeners.push(Box::new(factory));
        self
    }

    /// Open the stores and start the dispatcher pump and worker pool.
    pub async fn build(self) -> Result<Runtime, ConfigError> {
        let cfg = self.config;
        let (action_store, node_store) = open_stores(&cfg).await?;

        let mut adapters = ResourceAdapterRegistry::from_config(&cfg)?;
        for adapter in self.adapters {
            adapters.register(adapter)?;
        }
        let adapters = Arc::new(adapters);

        let (emitter, inbox) = event_channel();
        let context = ListenerContext {
            emitter: emitter.clone(),
            actions: ActionManager::new(Arc::clone(&action_store), emitter.clone()),
            nodes: NodeManager::new(node_store, emitter.clone()),
            adapters: Arc::clone(&adapters),
        };

        let mut builder = ListenerRegistry::builder()
            .register(Arc::new(CloudServerActionListener::new(
                action_store,
                Arc::clone(&adapters),
                cfg.actions.default_profile.clone(),
            )))?
            .register(Arc::new(NodeProvisioningListener::new(
                context.nodes.clone(),
                cfg.watchdog.provisioning_timeout(),
            )))?;
        for factory in self.listeners {
            builder = builder.register(factory(&context))?;
        }
        let listeners = Arc::new(builder.build());

        let queue: Arc<dyn TaskQueue> = Arc::new(InMemoryTaskQueue::new());
        let dispatcher = Arc::new(Dispatcher::new(
            Arc::clone(&listeners),
            Arc::clone(&queue),
            cfg.dispatcher.max_event_depth,
        ));
        let shutdown = CancellationToken::new();
        let pump = Arc::clone(&dispatcher).spawn(inbox, shutdown.clone());
        let workers = WorkerPool::spawn(
            WorkerOptions::from_config(&cfg.workers),
            Arc::clone(&queue),
            Arc::clone(&listeners),
        );

        Ok(Runtime {
            actions: context.actions,
            nodes: context.nodes,
            adapters,
            listeners,
            dispatcher,
            queue,
            emitter,
            workers,
            pump,
            shutdown,
        })
    }
}

async fn open_stores(
    cfg: &Config,
) -> Result<(Arc<dyn ActionStore>, Arc<dyn NodeStore>), ConfigError> {
    let stores: (Arc<dyn ActionStore>, Arc<dyn NodeStore>) = match cfg.store.kind {
        StoreKind::Memory => (
            Arc::new(TableActionStore::in_memory()),
            Arc::new(TableNodeStore::in_memory()),
        ),
        StoreKind::JsonFile => {
            let directory = cfg.store.directory.as_ref().ok_or_else(|| {
                ConfigError::Validation(vec![ValidationError::MissingStoreDirectory])
            })?;
            let actions = TableActionStore::open(directory.join(ACTIONS_FILE_NAME)).await?;
            let nodes = TableNodeStore::open(directory.join(NODES_FILE_NAME)).await?;
            (Arc::new(actions), Arc::new(nodes))
        }
    };
    Ok(stores)
}
