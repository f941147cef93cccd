// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::actions::{ActionId, CloudServerAction};
use crate::errors::StoreError;
use crate::nodes::{Node, NodeId};

/// Durable home of cloud-server action records.
///
/// `save` is an upsert of the whole record; concurrent saves of the same id
/// are last-write-wins.
#[async_trait]
pub trait ActionStore: Send + Sync {
    async fn get(&self, id: &ActionId) -> Result<Option<CloudServerAction>, StoreError>;

    async fn save(&self, action: &CloudServerAction) -> Result<(), StoreError>;

    async fn list(&self) -> Result<Vec<CloudServerAction>, StoreError>;
}

#[async_trait]
pub trait NodeStore: Send + Sync {
    async fn get(&self, id: NodeId) -> Result<Option<Node>, StoreError>;

    async fn list(&self) -> Result<Vec<Node>, StoreError>;

    async fn save(&self, node: &Node) -> Result<(), StoreError>;

    /// Insert a new node unless one with the same name (case-insensitive)
    /// exists. The check and the write are one operation; returns false on
    /// a name clash.
    async fn insert(&self, node: &Node) -> Result<bool, StoreError>;

    async fn delete(&self, id: NodeId) -> Result<bool, StoreError>;

    /// Reserve an id for a node about to be inserted.
    fn allocate_id(&self) -> NodeId;
}
