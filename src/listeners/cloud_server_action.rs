// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use futures::FutureExt;
use serde_json::{Map, Value};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::Instrument;

use crate::actions::{ActionId, CloudServerAction};
use crate::config::ResourceAdapterRegistry;
use crate::errors::{describe_failure, panic_message, EngineError, EngineResult};
use crate::events::{Event, EventPayload, EventType};
use crate::observability::messages::action::{
    ActionAlreadyFinished, ActionCompleted, ActionFailed, ActionNotFound, ActionSkipped,
    ActionStarted, AdapterResolved,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{ActionStore, CapabilityMap, CapabilityRequest, Listener};

/// Executes cloud-server actions.
///
/// Subscribed to `CloudServerActionCreated`. Each delivery re-reads the
/// action record, persists `Processing`, invokes the adapter capability and
/// persists the outcome. A panicking capability counts as a failed one.
/// A record that is already `Complete` or `Error` is
/// left alone, so redelivery is harmless.
pub struct CloudServerActionListener {
    store: Arc<dyn ActionStore>,
    adapters: Arc<ResourceAdapterRegistry>,
    default_profile: String,
}

impl CloudServerActionListener {
    pub const NAME: &'static str = "cloud_server_action";

    pub fn new(
        store: Arc<dyn ActionStore>,
        adapters: Arc<ResourceAdapterRegistry>,
        default_profile: impl Into<String>,
    ) -> Self {
        Self {
            store,
            adapters,
            default_profile: default_profile.into(),
        }
    }

    /// Run the action with the given id to completion or failure.
    ///
    /// A missing record is not an error. A failed action is persisted as
    /// `Error` and the failure is returned as well.
    pub async fn execute(&self, id: &ActionId) -> EngineResult<()> {
        let action_id = id.to_string();

        let Some(mut action) = self.store.get(id).await? else {
            tracing::warn!("{}", ActionNotFound { action_id: &action_id });
            return Ok(());
        };

        if action.status.is_terminal() {
            tracing::info!(
                "{}",
                ActionAlreadyFinished {
                    action_id: &action_id,
                    status: &action.status.to_string(),
                }
            );
            return Ok(());
        }

        let started = ActionStarted {
            action_id: &action_id,
            cloudserver_id: &action.cloudserver_id,
            action: &action.action,
        };
        let span = started.span("cloud_server_action");
        started.log();

        match self.run_action(&mut action).instrument(span).await {
            Ok(message) => {
                tracing::info!(
                    "{}",
                    ActionCompleted {
                        action_id: &action_id,
                        message: message.as_deref(),
                    }
                );
                action.mark_complete(message)?;
                self.store.save(&action).await?;
                Ok(())
            }
            Err(err) => {
                ActionFailed {
                    action_id: &action_id,
                    error: &err,
                }
                .log();
                action.mark_error(describe_failure(&err))?;
                self.store.save(&action).await?;
                Err(err)
            }
        }
    }

    async fn run_action(&self, action: &mut CloudServerAction) -> EngineResult<Option<String>> {
        let action_id = action.id.to_string();

        action.mark_processing()?;
        self.store.save(action).await?;

        let Some((adapter_name, _)) = action.target() else {
            let reason = format!(
                "Cloud server ID does not contain resource adapter prefix, skipping: {}",
                action.cloudserver_id
            );
            tracing::warn!(
                "{}",
                ActionSkipped {
                    action_id: &action_id,
                    reason: &reason,
                }
            );
            return Ok(Some(reason));
        };

        self.adapters.get_api(adapter_name)?;

        let profile_id = action
            .cloudconnectorprofile_id
            .as_deref()
            .filter(|profile| !profile.is_empty())
            .unwrap_or(&self.default_profile)
            .to_string();

        tracing::debug!(
            "{}",
            AdapterResolved {
                action_id: &action_id,
                adapter: adapter_name,
                profile_id: &profile_id,
            }
        );

        let handler = self
            .adapters
            .resolve_capability(adapter_name, &action.action)?;
        let params = action_params(action.action_params.as_ref())?;

        let request = CapabilityRequest {
            profile_id,
            cloudserver_id: action.cloudserver_id.clone(),
            params,
        };

        let capability = CapabilityMap::capability_name(&action.action);
        match AssertUnwindSafe(async move { handler(request).await })
            .catch_unwind()
            .await
        {
            Ok(result) => {
                result.map_err(|source| EngineError::ExecutionFailure { capability, source })
            }
            Err(panic) => Err(EngineError::ExecutionFailure {
                source: anyhow::anyhow!("{} panicked: {}", capability, panic_message(panic.as_ref())),
                capability,
            }),
        }
    }
}

/// Keyword arguments for a capability. Empty values mean no arguments.
fn action_params(raw: Option<&Value>) -> EngineResult<Map<String, Value>> {
    match raw {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Ok(Map::new()),
        Some(Value::String(text)) if text.is_empty() => Ok(Map::new()),
        Some(Value::Array(items)) if items.is_empty() => Ok(Map::new()),
        Some(Value::Number(number)) if number.as_f64() == Some(0.0) => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(other) => Err(EngineError::InvalidRequest(format!(
            "Invalid action_params: {}",
            other
        ))),
    }
}

#[async_trait]
impl Listener for CloudServerActionListener {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn event_types(&self) -> Vec<EventType> {
        vec![EventType::CLOUD_SERVER_ACTION_CREATED]
    }

    async fn run(&self, event: &Event) -> EngineResult<()> {
        match event.payload() {
            EventPayload::CloudServerActionCreated {
                cloudserveraction_id,
            } => self.execute(cloudserveraction_id).await,
            _ => Err(EngineError::InvalidRequest(format!(
                "Listener '{}' cannot handle {} events",
                Self::NAME,
                event.event_type()
            ))),
        }
    }
}
