// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use super::model::{Node, NodeId};
use crate::errors::StoreError;
use crate::storage::RecordTable;
use crate::traits::NodeStore;

/// [`NodeStore`] over a [`RecordTable`]. Ids are handed out sequentially.
#[derive(Debug)]
pub struct TableNodeStore {
    table: RecordTable<Node>,
    next_id: AtomicU64,
}

impl TableNodeStore {
    pub fn in_memory() -> Self {
        Self {
            table: RecordTable::in_memory(),
            next_id: AtomicU64::new(1),
        }
    }

    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let table = RecordTable::open(path).await?;
        let highest = table
            .all()
            .await
            .iter()
            .map(|node: &Node| node.id.0)
            .max()
            .unwrap_or(0);

        Ok(Self {
            table,
            next_id: AtomicU64::new(highest + 1),
        })
    }
}

#[async_trait]
impl NodeStore for TableNodeStore {
    async fn get(&self, id: NodeId) -> Result<Option<Node>, StoreError> {
        Ok(self.table.get(&id.to_string()).await)
    }

    async fn list(&self) -> Result<Vec<Node>, StoreError> {
        let mut nodes = self.table.all().await;
        nodes.sort_by_key(|node| node.id);
        Ok(nodes)
    }

    async fn save(&self, node: &Node) -> Result<(), StoreError> {
        self.table.upsert(node.clone()).await
    }

    async fn insert(&self, node: &Node) -> Result<bool, StoreError> {
        let clash = self
            .table
            .insert_unless(node.clone(), |existing| {
                existing.name.eq_ignore_ascii_case(&node.name)
            })
            .await?;
        Ok(clash.is_none())
    }

    async fn delete(&self, id: NodeId) -> Result<bool, StoreError> {
        Ok(self.table.remove(&id.to_string()).await?.is_some())
    }

    fn allocate_id(&self) -> NodeId {
        NodeId(self.next_id.fetch_add(1, Ordering::SeqCst))
    }
}
