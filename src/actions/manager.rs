// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use chrono::{Duration, Utc};
use std::sync::Arc;

use super::model::{ActionId, ActionStatus, CloudServerAction};
use crate::errors::{EngineError, EngineResult, ResourceKind};
use crate::events::{Event, EventEmitter};
use crate::observability::messages::action::ActionCreated;
use crate::traits::ActionStore;

/// A cloud-server action request as submitted by a caller.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewAction {
    pub cloudserver_id: String,
    pub action: String,
    pub action_params: Option<serde_json::Value>,
    pub cloudconnectorprofile_id: Option<String>,
}

impl NewAction {
    pub fn new(cloudserver_id: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            cloudserver_id: cloudserver_id.into(),
            action: action.into(),
            ..Self::default()
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
}

/// Creates and reads cloud-server action records.
///
/// Creating an action persists it as `Created` and announces it; the
/// executor picks it up asynchronously. The caller gets the id back
/// immediately and polls the record for the outcome.
#[derive(Clone)]
pub struct ActionManager {
    store: Arc<dyn ActionStore>,
    events: EventEmitter,
}

impl ActionManager {
    pub fn new(store: Arc<dyn ActionStore>, events: EventEmitter) -> Self {
        Self { store, events }
    }

    pub async fn create_action(&self, request: NewAction) -> EngineResult<CloudServerAction> {
        if request.action.trim().is_empty() {
            return Err(EngineError::InvalidRequest(
                "Action name must not be empty".to_string(),
            ));
        }
        if request.cloudserver_id.trim().is_empty() {
            return Err(EngineError::InvalidRequest(
                "Cloud server ID must not be empty".to_string(),
            ));
        }

        let mut action = CloudServerAction::new(request.cloudserver_id, request.action);
        action.action_params = request.action_params;
        action.cloudconnectorprofile_id = request.cloudconnectorprofile_id;

        self.store.save(&action).await?;
        tracing::info!(
            "{}",
            ActionCreated {
                action_id: &action.id.to_string(),
                cloudserver_id: &action.cloudserver_id,
                action: &action.action,
            }
        );

        self.events
            .emit(Event::cloud_server_action_created(action.id))?;
        Ok(action)
    }

    pub async fn get_action(&self, id: &ActionId) -> EngineResult<CloudServerAction> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| EngineError::not_found(ResourceKind::Action, id.to_string()))
    }

    /// Actions in creation order, optionally restricted to one status.
    pub async fn list_actions(
        &self,
        status: Option<ActionStatus>,
    ) -> EngineResult<Vec<CloudServerAction>> {
        let mut actions: Vec<CloudServerAction> = self
            .store
            .list()
            .await?
            .into_iter()
            .filter(|action| status.map_or(true, |status| action.status == status))
            .collect();
        actions.sort_by_key(|action| action.created_at);
        Ok(actions)
    }

    /// `Processing` actions not touched for longer than `older_than`.
    ///
    /// These are the candidates left behind by a crashed worker.
    pub async fn stale_actions(&self, older_than: Duration) -> EngineResult<Vec<CloudServerAction>> {
        let cutoff = Utc::now() - older_than;
        Ok(self
            .list_actions(Some(ActionStatus::Processing))
            .await?
            .into_iter()
            .filter(|action| action.updated_at < cutoff)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::TableActionStore;
    use crate::events::{event_channel, EventInbox, EventPayload};
    use serde_json::json;

    fn manager() -> (ActionManager, Arc<TableActionStore>, EventInbox) {
        let (events, inbox) = event_channel();
        let store = Arc::new(TableActionStore::in_memory());
        (ActionManager::new(store.clone(), events), store, inbox)
    }

    #[tokio::test]
    async fn test_create_action_persists_then_announces() {
        let (manager, _store, mut inbox) = manager();

        let action = manager
            .create_action(
                NewAction::new("local:compute-01", "stop")
                    .with_params(json!({"soft": false}))
                    .with_profile("Spot"),
            )
            .await
            .unwrap();

        assert_eq!(action.status, ActionStatus::Created);
        assert_eq!(action.cloudconnectorprofile_id.as_deref(), Some("Spot"));
        assert_eq!(manager.get_action(&action.id).await.unwrap(), action);

        let event = inbox.recv().await.unwrap();
        match event.payload() {
            EventPayload::CloudServerActionCreated {
                cloudserveraction_id,
            } => assert_eq!(*cloudserveraction_id, action.id),
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_action_rejects_blank_fields() {
        let (manager, _store, _inbox) = manager();

        for request in [NewAction::new("local:n1", " "), NewAction::new("", "start")] {
            let err = manager.create_action(request).await.unwrap_err();
            assert!(matches!(err, EngineError::InvalidRequest(_)));
        }
        assert!(manager.list_actions(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_unknown_action_is_not_found() {
        let (manager, _store, _inbox) = manager();
        let err = manager.get_action(&ActionId::new()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_list_and_stale_actions() {
        let (manager, store, _inbox) = manager();

        let first = manager
            .create_action(NewAction::new("local:n1", "start"))
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let mut second = manager
            .create_action(NewAction::new("local:n2", "start"))
            .await
            .unwrap();

        second.mark_processing().unwrap();
        second.updated_at = Utc::now() - Duration::minutes(30);
        store.save(&second).await.unwrap();

        let all: Vec<ActionId> = manager
            .list_actions(None)
            .await
            .unwrap()
            .iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(all, vec![first.id, second.id]);

        let created = manager.list_actions(Some(ActionStatus::Created)).await.unwrap();
        assert_eq!(created.len(), 1);

        let stale = manager.stale_actions(Duration::minutes(10)).await.unwrap();
        assert_eq!(stale.len(), 1);
        assert_eq!(stale[0].id, second.id);
        assert!(manager
            .stale_actions(Duration::hours(1))
            .await
            .unwrap()
            .is_empty());
    }
}
