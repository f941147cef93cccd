// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

use crate::errors::StoreError;

/// A value that can live in a [`RecordTable`].
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    fn record_key(&self) -> String;
}

/// Records keyed by [`Record::record_key`], optionally mirrored to a JSON file.
///
/// Every write replaces the whole row, so concurrent upserts of the same key
/// resolve as last-write-wins. A file-backed table rewrites its file on
/// each write by writing a sibling temp file and renaming it into place;
/// the write lock is held across the flush so flushes never interleave.
#[derive(Debug)]
pub struct RecordTable<V> {
    rows: RwLock<BTreeMap<String, V>>,
    path: Option<PathBuf>,
}

impl<V: Record> RecordTable<V> {
    pub fn in_memory() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
            path: None,
        }
    }

    /// Open a file-backed table, loading existing rows if the file exists.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let rows = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let records: Vec<V> = serde_json::from_slice(&bytes)?;
                records
                    .into_iter()
                    .map(|record| (record.record_key(), record))
                    .collect()
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        Ok(Self {
            rows: RwLock::new(rows),
            path: Some(path),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub async fn get(&self, key: &str) -> Option<V> {
        self.rows.read().await.get(key).cloned()
    }

    pub async fn all(&self) -> Vec<V> {
        self.rows.read().await.values().cloned().collect()
    }

    pub async fn upsert(&self, record: V) -> Result<(), StoreError> {
        let mut rows = self.rows.write().await;
        let key = record.record_key();
        let previous = rows.insert(key.clone(), record);
        if let Err(e) = self.flush(&rows).await {
            restore(&mut rows, key, previous);
            return Err(e);
        }
        Ok(())
    }

    /// Insert `record` unless a row it `conflicts` with already exists.
    ///
    /// The check and the write happen under one write lock. Returns the
    /// conflicting row without writing anything when there is one.
    pub async fn insert_unless<F>(&self, record: V, conflicts: F) -> Result<Option<V>, StoreError>
    where
        F: Fn(&V) -> bool,
    {
        let mut rows = self.rows.write().await;
        if let Some(existing) = rows.values().find(|row| conflicts(row)) {
            return Ok(Some(existing.clone()));
        }

        let key = record.record_key();
        let previous = rows.insert(key.clone(), record);
        if let Err(e) = self.flush(&rows).await {
            restore(&mut rows, key, previous);
            return Err(e);
        }
        Ok(None)
    }

    pub async fn remove(&self, key: &str) -> Result<Option<V>, StoreError> {
        let mut rows = self.rows.write().await;
        let Some(removed) = rows.remove(key) else {
            return Ok(None);
        };
        if let Err(e) = self.flush(&rows).await {
            rows.insert(key.to_string(), removed);
            return Err(e);
        }
        Ok(Some(removed))
    }

    async fn flush(&self, rows: &BTreeMap<String, V>) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let records: Vec<&V> = rows.values().collect();
        let bytes = serde_json::to_vec_pretty(&records)?;

        let mut tmp = path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| StoreError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|source| StoreError::Io {
                path: tmp.clone(),
                source,
            })?;
        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })
    }
}

/// Undo an in-memory write whose flush failed, so readers never see it.
fn restore<V>(rows: &mut BTreeMap<String, V>, key: String, previous: Option<V>) {
    match previous {
        Some(previous) => {
            rows.insert(key, previous);
        }
        None => {
            rows.remove(&key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Row {
        key: String,
        value: u32,
    }

    impl Record for Row {
        fn record_key(&self) -> String {
            self.key.clone()
        }
    }

    fn row(key: &str, value: u32) -> Row {
        Row {
            key: key.to_string(),
            value,
        }
    }

    #[tokio::test]
    async fn test_upsert_is_last_write_wins() {
        let table = RecordTable::in_memory();
        table.upsert(row("a", 1)).await.unwrap();
        table.upsert(row("a", 2)).await.unwrap();

        assert_eq!(table.get("a").await, Some(row("a", 2)));
        assert_eq!(table.all().await.len(), 1);
    }

    #[tokio::test]
    async fn test_remove_missing_key_returns_none() {
        let table: RecordTable<Row> = RecordTable::in_memory();
        assert_eq!(table.remove("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_backed_table_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("rows.json");

        {
            let table = RecordTable::open(&path).await.unwrap();
            table.upsert(row("a", 1)).await.unwrap();
            table.upsert(row("b", 2)).await.unwrap();
            table.remove("a").await.unwrap();
        }

        let reopened: RecordTable<Row> = RecordTable::open(&path).await.unwrap();
        assert_eq!(reopened.all().await, vec![row("b", 2)]);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_open_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.json");
        std::fs::write(&path, b"{not json").unwrap();

        let result: Result<RecordTable<Row>, _> = RecordTable::open(&path).await;
        assert!(matches!(result, Err(StoreError::Serialization(_))));
    }

    /// A failed flush leaves memory matching what is on disk.
    #[tokio::test]
    async fn test_failed_flush_rolls_back_writes() {
        let dir = tempfile::tempdir().unwrap();
        let parent = dir.path().join("state");
        let path = parent.join("rows.json");

        let table = RecordTable::open(&path).await.unwrap();
        table.upsert(row("a", 1)).await.unwrap();
        table.upsert(row("b", 2)).await.unwrap();

        // the parent directory becomes a plain file, so every flush fails
        std::fs::remove_dir_all(&parent).unwrap();
        std::fs::write(&parent, b"").unwrap();

        assert!(table.upsert(row("a", 10)).await.is_err());
        assert!(table.upsert(row("c", 3)).await.is_err());
        assert!(table.remove("b").await.is_err());
        assert!(table.insert_unless(row("d", 4), |_| false).await.is_err());

        assert_eq!(table.all().await, vec![row("a", 1), row("b", 2)]);
    }

    #[tokio::test]
    async fn test_insert_unless_reports_conflict() {
        let table = RecordTable::in_memory();
        table.upsert(row("a", 1)).await.unwrap();

        let conflict = table
            .insert_unless(row("b", 1), |existing| existing.value == 1)
            .await
            .unwrap();
        assert_eq!(conflict, Some(row("a", 1)));
        assert_eq!(table.get("b").await, None);

        let inserted = table
            .insert_unless(row("b", 2), |existing| existing.value == 2)
            .await
            .unwrap();
        assert_eq!(inserted, None);
        assert_eq!(table.get("b").await, Some(row("b", 2)));
    }
}
