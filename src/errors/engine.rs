// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised while dispatching events and running listeners.

use std::fmt;
use thiserror::Error;

use super::store::{QueueError, StoreError};

/// The kind of record a `NotFound` error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Action,
    Node,
    ResourceAdapter,
    Listener,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Action => write!(f, "Cloud server action"),
            ResourceKind::Node => write!(f, "Node"),
            ResourceKind::ResourceAdapter => write!(f, "Resource adapter"),
            ResourceKind::Listener => write!(f, "Listener"),
        }
    }
}

/// Error taxonomy of the orchestration engine.
///
/// Only `NotFound` for a stale action id is swallowed by the action
/// executor. Everything else that happens while an action runs ends up in
/// the action's `status_message` and is then returned to the worker pool.
#[derive(Error, Debug)]
pub enum EngineError {
    /// An action, node, adapter or listener does not exist.
    #[error("{kind} [{id}] not found")]
    NotFound { kind: ResourceKind, id: String },

    /// Malformed `action_params`, malformed `cloudserver_id`, ambiguous name lookup.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The adapter exists but has no handler for the requested action.
    #[error("Action not supported: {action} (resource adapter '{adapter}' has no '{capability}' capability)")]
    CapabilityUnsupported {
        adapter: String,
        action: String,
        capability: String,
    },

    /// The capability handler itself failed.
    #[error("Capability '{capability}' failed: {source}")]
    ExecutionFailure {
        capability: String,
        #[source]
        source: anyhow::Error,
    },

    /// Missing or invalid adapter profile settings.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Queue(#[from] QueueError),
}

impl EngineError {
    pub fn not_found(kind: ResourceKind, id: impl Into<String>) -> Self {
        EngineError::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// True for errors that describe a missing record rather than a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, EngineError::NotFound { .. })
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Render an error together with its whole `source()` chain.
///
/// This is the failure description persisted into an action's
/// `status_message`, so it has to stand on its own without a log file.
pub fn describe_failure(error: &(dyn std::error::Error + 'static)) -> String {
    let mut description = error.to_string();
    let mut current = error.source();
    let mut depth = 0;

    while let Some(cause) = current {
        let text = cause.to_string();
        // thiserror/anyhow often embed the cause in the parent's message
        if !description.ends_with(&text) {
            if depth == 0 {
                description.push_str("\n\nCaused by:");
            }
            description.push_str(&format!("\n    {}: {}", depth, text));
            depth += 1;
        }
        current = cause.source();
    }

    description
}

/// Text carried by a caught panic payload.
pub fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
