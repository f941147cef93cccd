// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for the durable stores and the task queue substrate.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by action and node stores.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("Store I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing file holds something that is not a valid table.
    #[error("Store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised by the task queue.
#[derive(Error, Debug)]
pub enum QueueError {
    /// The queue was shut down and no longer accepts work.
    #[error("Task queue is closed")]
    Closed,
}
