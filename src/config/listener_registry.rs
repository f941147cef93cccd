// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::ConfigError;
use crate::events::EventType;
use crate::observability::messages::config::ListenerRegistered;
use crate::traits::Listener;

/// Immutable table of listeners and the event types they subscribe to.
///
/// Built once at startup through [`ListenerRegistryBuilder`]. Lookup by
/// event type returns listeners in registration order.
#[derive(Clone, Default)]
pub struct ListenerRegistry {
    listeners: Vec<Arc<dyn Listener>>,
    by_name: HashMap<&'static str, usize>,
    by_type: HashMap<EventType, Vec<usize>>,
}

impl ListenerRegistry {
    pub fn builder() -> ListenerRegistryBuilder {
        ListenerRegistryBuilder::default()
    }

    /// Resolve a listener by its definition id
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Listener>> {
        self.by_name.get(name).map(|&index| &self.listeners[index])
    }

    /// Listeners subscribed to `event_type`
    pub fn listeners_for<'a>(
        &'a self,
        event_type: &EventType,
    ) -> impl Iterator<Item = &'a Arc<dyn Listener>> + 'a {
        self.by_type
            .get(event_type)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(move |&index| &self.listeners[index])
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.listeners.iter().map(|listener| listener.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listener_count", &self.listeners.len())
            .field("listeners", &self.names())
            .finish()
    }
}

#[derive(Default)]
pub struct ListenerRegistryBuilder {
    registry: ListenerRegistry,
}

impl ListenerRegistryBuilder {
    pub fn register(mut self, listener: Arc<dyn Listener>) -> Result<Self, ConfigError> {
        let name = listener.name();
        if self.registry.by_name.contains_key(name) {
            return Err(ConfigError::DuplicateListener(name.to_string()));
        }

        let index = self.registry.listeners.len();
        let event_types = listener.event_types();

        tracing::debug!(
            "{}",
            ListenerRegistered {
                name,
                event_types: &event_types
                    .iter()
                    .map(EventType::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
            }
        );

        for event_type in event_types {
            let subscribers = self.registry.by_type.entry(event_type).or_default();
            if !subscribers.contains(&index) {
                subscribers.push(index);
            }
        }
        self.registry.by_name.insert(name, index);
        self.registry.listeners.push(listener);
        Ok(self)
    }

    pub fn build(self) -> ListenerRegistry {
        self.registry
    }
}
