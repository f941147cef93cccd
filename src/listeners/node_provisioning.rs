// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::time::Duration;

use crate::errors::{EngineError, EngineResult};
use crate::events::{Event, EventPayload, EventType};
use crate::nodes::{NodeManager, NodeState};
use crate::observability::messages::node::{
    ProvisioningConfirmed, ProvisioningTimedOut, WatchedNodeMissing,
};
use crate::observability::messages::StructuredLog;
use crate::traits::Listener;

/// Provisioning watchdog.
///
/// A node that reaches `Provisioned` gets one delayed delivery. When it
/// runs, the node is re-read; anything short of `Installed` by then is
/// moved to `Unresponsive`. The check is a no-op if the node has been
/// deleted in the meantime.
pub struct NodeProvisioningListener {
    nodes: NodeManager,
    timeout: Duration,
}

impl NodeProvisioningListener {
    pub const NAME: &'static str = "node_provisioning";

    pub fn new(nodes: NodeManager, timeout: Duration) -> Self {
        Self { nodes, timeout }
    }
}

#[async_trait]
impl Listener for NodeProvisioningListener {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn event_types(&self) -> Vec<EventType> {
        vec![EventType::NODE_STATE_CHANGED]
    }

    fn should_run(&self, event: &Event) -> bool {
        matches!(
            event.payload(),
            EventPayload::NodeStateChanged { node, .. } if node.state == NodeState::Provisioned
        )
    }

    fn delay(&self) -> Duration {
        self.timeout
    }

    async fn run(&self, event: &Event) -> EngineResult<()> {
        let EventPayload::NodeStateChanged { node: watched, .. } = event.payload() else {
            return Err(EngineError::InvalidRequest(format!(
                "Listener '{}' cannot handle {} events",
                Self::NAME,
                event.event_type()
            )));
        };

        let node = match self.nodes.get_node_by_id(watched.id).await {
            Ok(node) => node,
            Err(err) if err.is_not_found() => {
                tracing::info!("{}", WatchedNodeMissing { node_id: watched.id.0 });
                return Ok(());
            }
            Err(err) => return Err(err),
        };

        if node.state == NodeState::Installed {
            tracing::debug!("{}", ProvisioningConfirmed { node: &node.name });
            return Ok(());
        }

        ProvisioningTimedOut {
            node: &node.name,
            state: node.state.as_str(),
            timeout: self.timeout,
        }
        .log();
        self.nodes
            .set_node_state(node.id, NodeState::Unresponsive)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{event_channel, EventInbox};
    use crate::nodes::{NewNode, Node, NodeId, TableNodeStore};
    use std::sync::Arc;

    async fn watchdog_with(node: NewNode) -> (NodeProvisioningListener, Node, EventInbox) {
        let (events, inbox) = event_channel();
        let manager = NodeManager::new(Arc::new(TableNodeStore::in_memory()), events);
        let node = manager.add_node(node).await.unwrap();
        (
            NodeProvisioningListener::new(manager, Duration::from_secs(600)),
            node,
            inbox,
        )
    }

    #[tokio::test]
    async fn test_should_run_only_for_provisioned() {
        let (watchdog, _, _inbox) = watchdog_with(NewNode::new("n1")).await;

        for state in NodeState::ALL {
            let node = Node::new(NodeId(1), "n1", state);
            let event = Event::node_state_changed(&node, None);
            assert_eq!(
                watchdog.should_run(&event),
                state == NodeState::Provisioned,
                "state: {}",
                state
            );
        }
        assert_eq!(watchdog.delay(), Duration::from_secs(600));
    }

    #[tokio::test]
    async fn test_run_escalates_or_confirms() {
        struct TestCase {
            name: &'static str,
            state_at_deadline: NodeState,
            expected: NodeState,
        }

        let test_cases = vec![
            TestCase {
                name: "still provisioned",
                state_at_deadline: NodeState::Provisioned,
                expected: NodeState::Unresponsive,
            },
            TestCase {
                name: "fell back to provisioning",
                state_at_deadline: NodeState::Provisioning,
                expected: NodeState::Unresponsive,
            },
            TestCase {
                name: "installed in time",
                state_at_deadline: NodeState::Installed,
                expected: NodeState::Installed,
            },
        ];

        for case in test_cases {
            let (watchdog, node, _inbox) =
                watchdog_with(NewNode::new("n1").with_state(NodeState::Provisioned)).await;
            let event = Event::node_state_changed(&node, Some(NodeState::Provisioning));

            watchdog
                .nodes
                .set_node_state(node.id, case.state_at_deadline)
                .await
                .unwrap();
            watchdog.run(&event).await.unwrap();

            let after = watchdog.nodes.get_node_by_id(node.id).await.unwrap();
            assert_eq!(after.state, case.expected, "case: {}", case.name);
        }
    }

    #[tokio::test]
    async fn test_run_for_deleted_node_is_a_no_op() {
        let (watchdog, node, _inbox) =
            watchdog_with(NewNode::new("n1").with_state(NodeState::Provisioned)).await;
        let event = Event::node_state_changed(&node, None);

        watchdog.nodes.delete_node("n1").await.unwrap();
        assert!(watchdog.run(&event).await.is_ok());
    }
}
