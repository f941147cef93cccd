// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use futures::future::{BoxFuture, FutureExt};
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use crate::config::consts::CAPABILITY_PREFIX;
use crate::errors::EngineResult;
use crate::nodes::Node;

/// Arguments handed to a capability handler.
#[derive(Debug, Clone, PartialEq)]
pub struct CapabilityRequest {
    pub profile_id: String,
    /// Full `<adapter>:<instance>` id, prefix included.
    pub cloudserver_id: String,
    pub params: serde_json::Map<String, serde_json::Value>,
}

impl CapabilityRequest {
    /// The adapter-specific part of the cloud server id.
    pub fn instance_id(&self) -> &str {
        self.cloudserver_id
            .split_once(':')
            .map_or(self.cloudserver_id.as_str(), |(_, instance)| instance)
    }

    pub fn param<T: DeserializeOwned>(&self, name: &str) -> anyhow::Result<Option<T>> {
        match self.params.get(name) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| anyhow::anyhow!("Invalid value for parameter '{}': {}", name, e)),
        }
    }
}

pub type CapabilityFuture = BoxFuture<'static, anyhow::Result<Option<String>>>;

/// A single remote operation. Resolves to an optional human-readable status message.
pub type CapabilityHandler = Arc<dyn Fn(CapabilityRequest) -> CapabilityFuture + Send + Sync>;

/// Capabilities an adapter exposes, keyed by `cloudserveraction_<action>`.
#[derive(Clone, Default)]
pub struct CapabilityMap(HashMap<String, CapabilityHandler>);

impl CapabilityMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn capability_name(action: &str) -> String {
        format!("{}{}", CAPABILITY_PREFIX, action)
    }

    pub fn register<F, Fut>(&mut self, action: &str, handler: F) -> &mut Self
    where
        F: Fn(CapabilityRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Option<String>>> + Send + 'static,
    {
        self.0.insert(
            Self::capability_name(action),
            Arc::new(move |request| handler(request).boxed()),
        );
        self
    }

    pub fn resolve(&self, action: &str) -> Option<CapabilityHandler> {
        self.0.get(&Self::capability_name(action)).cloned()
    }

    /// Action names (without the capability prefix), sorted.
    pub fn actions(&self) -> Vec<String> {
        let mut actions: Vec<String> = self
            .0
            .keys()
            .filter_map(|name| name.strip_prefix(CAPABILITY_PREFIX))
            .map(str::to_string)
            .collect();
        actions.sort();
        actions
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for CapabilityMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityMap")
            .field("actions", &self.actions())
            .finish()
    }
}

/// A plugin that performs remote operations for one provider.
pub trait ResourceAdapter: Send + Sync + 'static {
    /// Registry name; the prefix of every `cloudserver_id` this adapter owns.
    fn adapter_name(&self) -> &str;

    fn capabilities(self: Arc<Self>) -> CapabilityMap;

    fn startup_script(&self) -> Option<&dyn GeneratesStartupScript> {
        None
    }
}

/// Adapters that bootstrap new instances with a generated script.
pub trait GeneratesStartupScript: Send + Sync {
    fn generate_startup_script(
        &self,
        profile_id: &str,
        node: Option<&Node>,
        insertnode_request: Option<&[u8]>,
    ) -> EngineResult<String>;
}

pub trait TemplateRenderer: Send + Sync {
    fn render(&self, template: &Path, vars: &BTreeMap<String, String>) -> anyhow::Result<String>;
}
