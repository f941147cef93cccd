// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use uuid::Uuid;

use super::cause::{current_cause, EventCause};
use crate::actions::ActionId;
use crate::nodes::{Node, NodeSnapshot, NodeState, Tag};

/// Type tag of an event. Listeners subscribe to these.
///
/// The engine defines three tags of its own; any other string is a valid
/// tag too and flows through the dispatcher the same way.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventType(Cow<'static, str>);

impl EventType {
    pub const NODE_STATE_CHANGED: EventType = EventType(Cow::Borrowed("NodeStateChanged"));
    pub const NODE_TAGS_CHANGED: EventType = EventType(Cow::Borrowed("NodeTagsChanged"));
    pub const CLOUD_SERVER_ACTION_CREATED: EventType =
        EventType(Cow::Borrowed("CloudServerActionCreated"));

    pub fn custom(name: impl Into<String>) -> Self {
        EventType(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "PascalCase")]
pub enum EventPayload {
    NodeStateChanged {
        node: NodeSnapshot,
        previous_state: Option<NodeState>,
    },
    NodeTagsChanged {
        node: NodeSnapshot,
        previous_tags: Vec<Tag>,
    },
    CloudServerActionCreated {
        cloudserveraction_id: ActionId,
    },
    /// Producer-defined event the engine has no special knowledge of.
    Custom {
        event_type: String,
        data: serde_json::Value,
    },
}

/// An immutable, typed fact.
///
/// Fields are private: once built, an event is only ever read. Events built
/// while a listener delivery is running record that delivery's event as
/// their cause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    id: Uuid,
    payload: EventPayload,
    occurred_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cause: Option<EventCause>,
}

impl Event {
    pub fn new(payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            payload,
            occurred_at: Utc::now(),
            cause: current_cause(),
        }
    }

    pub fn node_state_changed(node: &Node, previous_state: Option<NodeState>) -> Self {
        Self::new(EventPayload::NodeStateChanged {
            node: node.snapshot(),
            previous_state,
        })
    }

    pub fn node_tags_changed(node: &Node, previous_tags: Vec<Tag>) -> Self {
        Self::new(EventPayload::NodeTagsChanged {
            node: node.snapshot(),
            previous_tags,
        })
    }

    pub fn cloud_server_action_created(cloudserveraction_id: ActionId) -> Self {
        Self::new(EventPayload::CloudServerActionCreated {
            cloudserveraction_id,
        })
    }

    pub fn custom(event_type: impl Into<String>, data: serde_json::Value) -> Self {
        Self::new(EventPayload::Custom {
            event_type: event_type.into(),
            data,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn payload(&self) -> &EventPayload {
        &self.payload
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn cause(&self) -> Option<&EventCause> {
        self.cause.as_ref()
    }

    /// Number of listener hops between this event and the one that started the chain.
    pub fn depth(&self) -> u32 {
        self.cause.as_ref().map_or(0, |c| c.depth)
    }

    pub fn event_type(&self) -> EventType {
        match &self.payload {
            EventPayload::NodeStateChanged { .. } => EventType::NODE_STATE_CHANGED,
            EventPayload::NodeTagsChanged { .. } => EventType::NODE_TAGS_CHANGED,
            EventPayload::CloudServerActionCreated { .. } => {
                EventType::CLOUD_SERVER_ACTION_CREATED
            }
            EventPayload::Custom { event_type, .. } => EventType::custom(event_type.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::NodeId;

    fn node(state: NodeState) -> Node {
        Node::new(NodeId(7), "compute-07.cluster.local", state)
    }

    #[test]
    fn test_event_type_matches_payload() {
        let test_cases = vec![
            (
                Event::node_state_changed(&node(NodeState::Provisioned), None),
                "NodeStateChanged",
            ),
            (
                Event::node_tags_changed(&node(NodeState::Installed), vec![]),
                "NodeTagsChanged",
            ),
            (
                Event::cloud_server_action_created(ActionId::new()),
                "CloudServerActionCreated",
            ),
            (
                Event::custom("KitInstalled", serde_json::json!({"kit": "base"})),
                "KitInstalled",
            ),
        ];

        for (event, expected) in test_cases {
            assert_eq!(event.event_type().as_str(), expected);
        }
    }

    #[test]
    fn test_custom_type_equals_builtin_constant_by_name() {
        assert_eq!(
            EventType::custom("NodeStateChanged"),
            EventType::NODE_STATE_CHANGED
        );
    }

    #[test]
    fn test_event_outside_delivery_has_no_cause() {
        let event = Event::cloud_server_action_created(ActionId::new());
        assert!(event.cause().is_none());
        assert_eq!(event.depth(), 0);
    }

    #[test]
    fn test_node_state_changed_serializes_with_type_tag() {
        let event = Event::node_state_changed(&node(NodeState::Provisioned), Some(NodeState::Provisioning));
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["payload"]["type"], "NodeStateChanged");
        assert_eq!(json["payload"]["node"]["state"], "Provisioned");
        assert_eq!(json["payload"]["node"]["id"], 7);
        assert_eq!(json["payload"]["previous_state"], "Provisioning");

        let back: Event = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
