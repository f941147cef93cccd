// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Fleet nodes: the record, its durable store, name/tag matching and the
//! manager that mutates nodes and announces the changes.

mod manager;
mod model;
pub mod query;
mod store;

pub use manager::{NewNode, NodeManager};
pub use model::{Node, NodeId, NodeSnapshot, NodeState, Tag};
pub use query::TagQuery;
pub use store::TableNodeStore;
