// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::EngineError;
use crate::storage::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(pub Uuid);

impl ActionId {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        ActionId(Uuid::new_v4())
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ActionId {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(ActionId)
            .map_err(|e| EngineError::InvalidRequest(format!("Invalid action id '{}': {}", s, e)))
    }
}

/// `Created -> Processing -> Complete | Error`. Never moves backward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionStatus {
    Created,
    Processing,
    Complete,
    Error,
}

impl ActionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ActionStatus::Complete | ActionStatus::Error)
    }

    fn rank(&self) -> u8 {
        match self {
            ActionStatus::Created => 0,
            ActionStatus::Processing => 1,
            ActionStatus::Complete | ActionStatus::Error => 2,
        }
    }

    /// Staying in `Processing` is allowed: a redelivered action re-enters it.
    pub fn can_transition_to(&self, next: ActionStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        next.rank() > self.rank() || (*self == ActionStatus::Processing && next == *self)
    }
}

impl fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionStatus::Created => "Created",
            ActionStatus::Processing => "Processing",
            ActionStatus::Complete => "Complete",
            ActionStatus::Error => "Error",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudServerAction {
    pub id: ActionId,
    /// `<adapter>:<adapter-specific id>`
    pub cloudserver_id: String,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_params: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloudconnectorprofile_id: Option<String>,
    pub status: ActionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CloudServerAction {
    pub fn new(cloudserver_id: impl Into<String>, action: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ActionId::new(),
            cloudserver_id: cloudserver_id.into(),
            action: action.into(),
            action_params: None,
            cloudconnectorprofile_id: None,
            status: ActionStatus::Created,
            status_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_params(mut self, params: serde_json::Value) -> Self {
        self.action_params = Some(params);
        self
    }

    pub fn with_profile(mut self, profile_id: impl Into<String>) -> Self {
        self.cloudconnectorprofile_id = Some(profile_id.into());
        self
    }

    /// Split `cloudserver_id` into adapter name and adapter-specific id.
    pub fn target(&self) -> Option<(&str, &str)> {
        self.cloudserver_id.split_once(':')
    }

    pub fn mark_processing(&mut self) -> Result<(), EngineError> {
        self.transition(ActionStatus::Processing, None)
    }

    pub fn mark_complete(&mut self, message: Option<String>) -> Result<(), EngineError> {
        self.transition(ActionStatus::Complete, message)
    }

    pub fn mark_error(&mut self, message: String) -> Result<(), EngineError> {
        self.transition(ActionStatus::Error, Some(message))
    }

    fn transition(
        &mut self,
        next: ActionStatus,
        message: Option<String>,
    ) -> Result<(), EngineError> {
        if !self.status.can_transition_to(next) {
            return Err(EngineError::InvalidRequest(format!(
                "Cloud server action [{}] cannot move from {} to {}",
                self.id, self.status, next
            )));
        }
        self.status = next;
        if message.is_some() {
            self.status_message = message;
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}

impl Record for CloudServerAction {
    fn record_key(&self) -> String {
        self.id.to_string()
    }
}
