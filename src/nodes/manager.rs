// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use super::model::{Node, NodeId, NodeState, Tag};
use super::query::{self, TagQuery};
use crate::errors::{EngineError, EngineResult, ResourceKind};
use crate::events::{Event, EventEmitter};
use crate::observability::messages::node::{NodeAdded, NodeDeleted, NodeStateUpdated, NodeTagsUpdated};
use crate::observability::messages::StructuredLog;
use crate::traits::NodeStore;

/// A node about to be added to the fleet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNode {
    pub name: String,
    pub state: NodeState,
    pub tags: Vec<Tag>,
    pub hardware_profile: Option<String>,
    pub software_profile: Option<String>,
}

impl NewNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: NodeState::Discovered,
            tags: Vec::new(),
            hardware_profile: None,
            software_profile: None,
        }
    }

    pub fn with_state(mut self, state: NodeState) -> Self {
        self.state = state;
        self
    }

    pub fn with_tags(mut self, tags: Vec<Tag>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_hardware_profile(mut self, profile: impl Into<String>) -> Self {
        self.hardware_profile = Some(profile.into());
        self
    }

    pub fn with_software_profile(mut self, profile: impl Into<String>) -> Self {
        self.software_profile = Some(profile.into());
        self
    }
}

/// Reads and mutates fleet nodes.
///
/// Every state or tag change is persisted first and then announced through
/// the event outbox; listeners reacting to it run later, on a worker.
#[derive(Clone)]
pub struct NodeManager {
    store: Arc<dyn NodeStore>,
    events: EventEmitter,
}

impl NodeManager {
    pub fn new(store: Arc<dyn NodeStore>, events: EventEmitter) -> Self {
        Self { store, events }
    }

    pub async fn get_node(&self, name: &str) -> EngineResult<Node> {
        let nodes = self.store.list().await?;
        query::resolve_name(&nodes, name).cloned()
    }

    pub async fn get_node_by_id(&self, id: NodeId) -> EngineResult<Node> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| EngineError::not_found(ResourceKind::Node, id.to_string()))
    }

    /// All nodes matching any of `tags` (all nodes when empty), sorted by name.
    pub async fn get_node_list(&self, tags: &[TagQuery]) -> EngineResult<Vec<Node>> {
        let nodes = self.store.list().await?;
        let mut matched: Vec<Node> = query::filter_by_tags(&nodes, tags)
            .into_iter()
            .cloned()
            .collect();
        matched.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(matched)
    }

    pub async fn get_nodes_by_state(&self, state: NodeState) -> EngineResult<Vec<Node>> {
        Ok(self
            .store
            .list()
            .await?
            .into_iter()
            .filter(|node| node.state == state)
            .collect())
    }

    pub async fn expand_nodespec(&self, nodespec: &str) -> EngineResult<Vec<Node>> {
        let nodes = self.store.list().await?;
        Ok(query::expand_nodespec(&nodes, nodespec)?
            .into_iter()
            .cloned()
            .collect())
    }

    pub async fn add_node(&self, new: NewNode) -> EngineResult<Node> {
        if new.name.trim().is_empty() {
            return Err(EngineError::InvalidRequest(
                "Node name must not be empty".to_string(),
            ));
        }

        let node = Node {
            id: self.store.allocate_id(),
            name: new.name,
            state: new.state,
            tags: new.tags,
            hardware_profile: new.hardware_profile,
            software_profile: new.software_profile,
        };
        if !self.store.insert(&node).await? {
            return Err(EngineError::InvalidRequest(format!(
                "Node [{}] already exists",
                node.name
            )));
        }

        tracing::info!(
            "{}",
            NodeAdded {
                node: &node.name,
                state: node.state.as_str(),
            }
        );

        Ok(node)
    }

    /// Move the named node to `state`. Returns false, and announces
    /// nothing, if the node was already there.
    pub async fn update_node_status(&self, name: &str, state: NodeState) -> EngineResult<bool> {
        let node = self.get_node(name).await?;
        self.apply_state(node, state).await
    }

    pub async fn set_node_state(&self, id: NodeId, state: NodeState) -> EngineResult<bool> {
        let node = self.get_node_by_id(id).await?;
        self.apply_state(node, state).await
    }

    async fn apply_state(&self, mut node: Node, state: NodeState) -> EngineResult<bool> {
        if node.state == state {
            return Ok(false);
        }

        let previous = node.state;
        node.state = state;
        self.store.save(&node).await?;

        NodeStateUpdated {
            node: &node.name,
            previous: previous.as_str(),
            current: state.as_str(),
        }
        .log();

        self.events
            .emit(Event::node_state_changed(&node, Some(previous)))?;
        Ok(true)
    }

    /// Replace the named node's tags. Returns false if they were unchanged.
    pub async fn update_node_tags(&self, name: &str, tags: Vec<Tag>) -> EngineResult<bool> {
        let mut node = self.get_node(name).await?;
        if node.tags == tags {
            return Ok(false);
        }

        let previous_tags = std::mem::replace(&mut node.tags, tags);
        self.store.save(&node).await?;

        tracing::info!(
            "{}",
            NodeTagsUpdated {
                node: &node.name,
                previous_count: previous_tags.len(),
                current_count: node.tags.len(),
            }
        );

        self.events
            .emit(Event::node_tags_changed(&node, previous_tags))?;
        Ok(true)
    }

    /// Delete every node matched by `nodespec`, announcing each as `Deleted`.
    pub async fn delete_node(&self, nodespec: &str) -> EngineResult<Vec<String>> {
        let nodes = self.expand_nodespec(nodespec).await?;
        if nodes.is_empty() {
            return Err(EngineError::not_found(ResourceKind::Node, nodespec));
        }

        let mut deleted = Vec::with_capacity(nodes.len());
        for mut node in nodes {
            let previous = node.state;
            node.state = NodeState::Deleted;
            self.store.save(&node).await?;
            self.events
                .emit(Event::node_state_changed(&node, Some(previous)))?;
            self.store.delete(node.id).await?;

            tracing::info!("{}", NodeDeleted { node: &node.name });
            deleted.push(node.name);
        }

        Ok(deleted)
    }
}
