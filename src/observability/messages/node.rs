// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for node lifecycle changes and the provisioning watchdog.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

pub struct NodeAdded<'a> {
    pub node: &'a str,
    pub state: &'a str,
}

impl Display for NodeAdded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Added node [{}] in state {}", self.node, self.state)
    }
}

/// Node moved to a new state.
///
/// # Log Level
/// `info!`
pub struct NodeStateUpdated<'a> {
    pub node: &'a str,
    pub previous: &'a str,
    pub current: &'a str,
}

impl Display for NodeStateUpdated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Node [{}] state changed: {} -> {}",
            self.node, self.previous, self.current
        )
    }
}

impl StructuredLog for NodeStateUpdated<'_> {
    fn log(&self) {
        tracing::info!(
            node = self.node,
            previous_state = self.previous,
            state = self.current,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "node_state",
            span_name = name,
            node = self.node,
            state = self.current,
        )
    }
}

pub struct NodeTagsUpdated<'a> {
    pub node: &'a str,
    pub previous_count: usize,
    pub current_count: usize,
}

impl Display for NodeTagsUpdated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Node [{}] tags changed: {} -> {} tags",
            self.node, self.previous_count, self.current_count
        )
    }
}

pub struct NodeDeleted<'a> {
    pub node: &'a str,
}

impl Display for NodeDeleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Deleted node [{}]", self.node)
    }
}

/// A node did not finish installing within the provisioning window.
///
/// # Log Level
/// `warn!` - The node is being marked unresponsive
///
/// # Example
/// ```
/// use the_flotilla::observability::messages::node::ProvisioningTimedOut;
/// use std::time::Duration;
///
/// let msg = ProvisioningTimedOut {
///     node: "compute-01.cluster.local",
///     state: "Provisioned",
///     timeout: Duration::from_secs(600),
/// };
///
/// tracing::warn!("{}", msg);
/// ```
pub struct ProvisioningTimedOut<'a> {
    pub node: &'a str,
    pub state: &'a str,
    pub timeout: Duration,
}

impl Display for ProvisioningTimedOut<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Node [{}] still {} {:?} after provisioning, marking Unresponsive",
            self.node, self.state, self.timeout
        )
    }
}

impl StructuredLog for ProvisioningTimedOut<'_> {
    fn log(&self) {
        tracing::warn!(
            node = self.node,
            state = self.state,
            timeout_secs = self.timeout.as_secs(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "provisioning_timeout",
            span_name = name,
            node = self.node,
        )
    }
}

pub struct ProvisioningConfirmed<'a> {
    pub node: &'a str,
}

impl Display for ProvisioningConfirmed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Node [{}] installed within provisioning window", self.node)
    }
}

/// The node a watchdog delivery was scheduled for is gone.
pub struct WatchedNodeMissing {
    pub node_id: u64,
}

impl Display for WatchedNodeMissing {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Node id {} no longer exists, skipping provisioning check",
            self.node_id
        )
    }
}
