// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::EngineError;
use crate::storage::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a node.
///
/// `Provisioned` is a transient state: a node that stays there past the
/// provisioning timeout is marked `Unresponsive` by the watchdog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeState {
    Discovered,
    Allocated,
    Provisioning,
    Provisioned,
    Installed,
    Unresponsive,
    Expired,
    Error,
    Deleted,
}

impl NodeState {
    pub const ALL: [NodeState; 9] = [
        NodeState::Discovered,
        NodeState::Allocated,
        NodeState::Provisioning,
        NodeState::Provisioned,
        NodeState::Installed,
        NodeState::Unresponsive,
        NodeState::Expired,
        NodeState::Error,
        NodeState::Deleted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeState::Discovered => "Discovered",
            NodeState::Allocated => "Allocated",
            NodeState::Provisioning => "Provisioning",
            NodeState::Provisioned => "Provisioned",
            NodeState::Installed => "Installed",
            NodeState::Unresponsive => "Unresponsive",
            NodeState::Expired => "Expired",
            NodeState::Error => "Error",
            NodeState::Deleted => "Deleted",
        }
    }
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeState {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeState::ALL
            .iter()
            .copied()
            .find(|state| state.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| EngineError::InvalidRequest(format!("Unknown node state '{}'", s)))
    }
}

/// A node tag. Tags without a value are plain labels.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
        }
    }

    pub fn label(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub state: NodeState,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hardware_profile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub software_profile: Option<String>,
}

impl Node {
    pub fn new(id: NodeId, name: impl Into<String>, state: NodeState) -> Self {
        Self {
            id,
            name: name.into(),
            state,
            tags: Vec::new(),
            hardware_profile: None,
            software_profile: None,
        }
    }

    pub fn snapshot(&self) -> NodeSnapshot {
        NodeSnapshot {
            id: self.id,
            name: self.name.clone(),
            state: self.state,
        }
    }
}

impl Record for Node {
    fn record_key(&self) -> String {
        self.id.to_string()
    }
}

/// The part of a node carried inside events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub name: String,
    pub state: NodeState,
}
