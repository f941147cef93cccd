// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for cloud-server action execution.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Action record persisted and announced.
///
/// # Log Level
/// `info!`
pub struct ActionCreated<'a> {
    pub action_id: &'a str,
    pub cloudserver_id: &'a str,
    pub action: &'a str,
}

impl Display for ActionCreated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Created cloud server action [{}]: {} on {}",
            self.action_id, self.action, self.cloudserver_id
        )
    }
}

/// Executor picked up an action.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_flotilla::observability::messages::{action::ActionStarted, StructuredLog};
///
/// let msg = ActionStarted {
///     action_id: "3f2c9b7e-1f0d-4c1e-9d7a-6a4c1f0b9e21",
///     cloudserver_id: "local:compute-01",
///     action: "reboot",
/// };
///
/// let span = msg.span("cloud_server_action");
/// let _guard = span.enter();
/// msg.log();
/// ```
pub struct ActionStarted<'a> {
    pub action_id: &'a str,
    pub cloudserver_id: &'a str,
    pub action: &'a str,
}

impl Display for ActionStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Running cloud server action [{}]: {} on {}",
            self.action_id, self.action, self.cloudserver_id
        )
    }
}

impl StructuredLog for ActionStarted<'_> {
    fn log(&self) {
        tracing::info!(
            action_id = self.action_id,
            cloudserver_id = self.cloudserver_id,
            action = self.action,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "cloud_server_action",
            span_name = name,
            action_id = self.action_id,
            cloudserver_id = self.cloudserver_id,
            action = self.action,
        )
    }
}

/// The action record behind an event no longer exists.
///
/// # Log Level
/// `warn!` - Stale event, nothing to do
pub struct ActionNotFound<'a> {
    pub action_id: &'a str,
}

impl Display for ActionNotFound<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Cloud server action [{}] not found", self.action_id)
    }
}

/// Redelivery of an action that already reached a terminal status.
pub struct ActionAlreadyFinished<'a> {
    pub action_id: &'a str,
    pub status: &'a str,
}

impl Display for ActionAlreadyFinished<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Cloud server action [{}] is already {}, nothing to do",
            self.action_id, self.status
        )
    }
}

pub struct ActionSkipped<'a> {
    pub action_id: &'a str,
    pub reason: &'a str,
}

impl Display for ActionSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Cloud server action [{}]: {}", self.action_id, self.reason)
    }
}

pub struct AdapterResolved<'a> {
    pub action_id: &'a str,
    pub adapter: &'a str,
    pub profile_id: &'a str,
}

impl Display for AdapterResolved<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Cloud server action [{}] using resource adapter '{}' with profile '{}'",
            self.action_id, self.adapter, self.profile_id
        )
    }
}

pub struct ActionCompleted<'a> {
    pub action_id: &'a str,
    pub message: Option<&'a str>,
}

impl Display for ActionCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.message {
            Some(message) => write!(
                f,
                "Cloud server action [{}] complete: {}",
                self.action_id, message
            ),
            None => write!(f, "Cloud server action [{}] complete", self.action_id),
        }
    }
}

/// Action ended in `Error`.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct ActionFailed<'a> {
    pub action_id: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for ActionFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Cloud server action [{}] failed: {}",
            self.action_id, self.error
        )
    }
}

impl StructuredLog for ActionFailed<'_> {
    fn log(&self) {
        tracing::error!(
            action_id = self.action_id,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "cloud_server_action_failed",
            span_name = name,
            action_id = self.action_id,
        )
    }
}
