// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::path::PathBuf;

use super::model::{ActionId, CloudServerAction};
use crate::errors::StoreError;
use crate::storage::RecordTable;
use crate::traits::ActionStore;

/// [`ActionStore`] over a [`RecordTable`], in memory or mirrored to a JSON file.
#[derive(Debug)]
pub struct TableActionStore {
    table: RecordTable<CloudServerAction>,
}

impl TableActionStore {
    pub fn in_memory() -> Self {
        Self {
            table: RecordTable::in_memory(),
        }
    }

    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Ok(Self {
            table: RecordTable::open(path).await?,
        })
    }
}

#[async_trait]
impl ActionStore for TableActionStore {
    async fn get(&self, id: &ActionId) -> Result<Option<CloudServerAction>, StoreError> {
        Ok(self.table.get(&id.to_string()).await)
    }

    async fn save(&self, action: &CloudServerAction) -> Result<(), StoreError> {
        self.table.upsert(action.clone()).await
    }

    async fn list(&self) -> Result<Vec<CloudServerAction>, StoreError> {
        Ok(self.table.all().await)
    }
}
