// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::{anyhow, bail};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::backends::startup_script::cloud_init_template_vars;
use crate::config::{InstallerConfig, ProfileSettings};
use crate::errors::{EngineError, EngineResult};
use crate::nodes::Node;
use crate::traits::{
    CapabilityMap, CapabilityRequest, GeneratesStartupScript, ResourceAdapter, TemplateRenderer,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerState {
    Running,
    Stopped,
}

/// Resource adapter for machines the installer manages directly.
///
/// Keeps an in-memory power-state inventory keyed by the adapter-specific
/// part of the cloud server id. New instances start out `Stopped`.
pub struct LocalAdapter {
    name: String,
    profiles: HashMap<String, ProfileSettings>,
    installer: InstallerConfig,
    inventory: RwLock<HashMap<String, PowerState>>,
    renderer: Option<Arc<dyn TemplateRenderer>>,
}

impl LocalAdapter {
    pub fn new(
        name: impl Into<String>,
        profiles: HashMap<String, ProfileSettings>,
        installer: InstallerConfig,
    ) -> Self {
        Self {
            name: name.into(),
            profiles,
            installer,
            inventory: RwLock::new(HashMap::new()),
            renderer: None,
        }
    }

    pub fn with_instances<I, S>(self, instances: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let inventory = instances
            .into_iter()
            .map(|id| (id.into(), PowerState::Stopped))
            .collect();
        Self {
            inventory: RwLock::new(inventory),
            ..self
        }
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn TemplateRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub async fn power_state(&self, instance: &str) -> Option<PowerState> {
        self.inventory.read().await.get(instance).copied()
    }

    /// An empty profile table accepts any profile name.
    fn check_profile(&self, profile_id: &str) -> anyhow::Result<()> {
        if self.profiles.is_empty() || self.profiles.contains_key(profile_id) {
            Ok(())
        } else {
            Err(anyhow!(
                "Resource adapter '{}' has no profile [{}]",
                self.name,
                profile_id
            ))
        }
    }

    async fn start(&self, request: CapabilityRequest) -> anyhow::Result<Option<String>> {
        self.check_profile(&request.profile_id)?;
        let instance = request.instance_id();

        let mut inventory = self.inventory.write().await;
        let state = inventory
            .get_mut(instance)
            .ok_or_else(|| anyhow!("Unknown instance '{}'", instance))?;

        if *state == PowerState::Running {
            return Ok(Some(format!("Instance {} is already running", instance)));
        }
        *state = PowerState::Running;
        Ok(Some(format!("Started instance {}", instance)))
    }

    async fn stop(&self, request: CapabilityRequest) -> anyhow::Result<Option<String>> {
        self.check_profile(&request.profile_id)?;
        let soft = request.param::<bool>("soft")?.unwrap_or(true);
        let instance = request.instance_id();

        let mut inventory = self.inventory.write().await;
        let state = inventory
            .get_mut(instance)
            .ok_or_else(|| anyhow!("Unknown instance '{}'", instance))?;

        if *state == PowerState::Stopped {
            return Ok(Some(format!("Instance {} is already stopped", instance)));
        }
        *state = PowerState::Stopped;
        Ok(Some(if soft {
            format!("Shut down instance {}", instance)
        } else {
            format!("Powered off instance {}", instance)
        }))
    }

    async fn reboot(&self, request: CapabilityRequest) -> anyhow::Result<Option<String>> {
        self.check_profile(&request.profile_id)?;
        let soft = request.param::<bool>("soft")?.unwrap_or(true);
        let instance = request.instance_id();

        let inventory = self.inventory.read().await;
        match inventory.get(instance) {
            None => bail!("Unknown instance '{}'", instance),
            Some(PowerState::Stopped) => bail!("Instance {} is not running", instance),
            Some(PowerState::Running) if soft => {
                Ok(Some(format!("Rebooted instance {}", instance)))
            }
            Some(PowerState::Running) => Ok(Some(format!("Reset instance {}", instance))),
        }
    }

    async fn delete(&self, request: CapabilityRequest) -> anyhow::Result<Option<String>> {
        self.check_profile(&request.profile_id)?;
        let instance = request.instance_id();

        match self.inventory.write().await.remove(instance) {
            Some(_) => Ok(Some(format!("Deleted instance {}", instance))),
            None => bail!("Unknown instance '{}'", instance),
        }
    }
}

impl ResourceAdapter for LocalAdapter {
    fn adapter_name(&self) -> &str {
        &self.name
    }

    fn capabilities(self: Arc<Self>) -> CapabilityMap {
        let mut capabilities = CapabilityMap::new();

        let adapter = Arc::clone(&self);
        capabilities.register("start", move |request| {
            let adapter = Arc::clone(&adapter);
            async move { adapter.start(request).await }
        });

        let adapter = Arc::clone(&self);
        capabilities.register("stop", move |request| {
            let adapter = Arc::clone(&adapter);
            async move { adapter.stop(request).await }
        });

        let adapter = Arc::clone(&self);
        capabilities.register("reboot", move |request| {
            let adapter = Arc::clone(&adapter);
            async move { adapter.reboot(request).await }
        });

        let adapter = self;
        capabilities.register("delete", move |request| {
            let adapter = Arc::clone(&adapter);
            async move { adapter.delete(request).await }
        });

        capabilities
    }

    fn startup_script(&self) -> Option<&dyn GeneratesStartupScript> {
        Some(self)
    }
}

impl GeneratesStartupScript for LocalAdapter {
    fn generate_startup_script(
        &self,
        profile_id: &str,
        node: Option<&Node>,
        insertnode_request: Option<&[u8]>,
    ) -> EngineResult<String> {
        let settings = self.profiles.get(profile_id).ok_or_else(|| {
            EngineError::Configuration(format!(
                "Resource adapter '{}' has no profile [{}]",
                self.name, profile_id
            ))
        })?;

        let (template, vars) =
            cloud_init_template_vars(settings, &self.installer, node, insertnode_request)?;

        let renderer = self.renderer.as_ref().ok_or_else(|| {
            EngineError::Configuration(format!(
                "Resource adapter '{}' has no template renderer",
                self.name
            ))
        })?;

        renderer
            .render(&template, &vars)
            .map_err(|source| EngineError::ExecutionFailure {
                capability: "generate_startup_script".to_string(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::RecordingRenderer;
    use crate::nodes::{NodeId, NodeState};
    use serde_json::json;

    fn adapter() -> Arc<LocalAdapter> {
        let profiles = HashMap::from([(
            "Default".to_string(),
            serde_json::from_value(json!({
                "cloud_init_script_template": "/etc/flotilla/bootstrap.tmpl",
                "dns_domain": "cluster.local",
            }))
            .unwrap(),
        )]);
        Arc::new(
            LocalAdapter::new("local", profiles, InstallerConfig::default())
                .with_instances(["n1", "n2"])
                .with_renderer(Arc::new(RecordingRenderer::default())),
        )
    }

    fn request(instance: &str, params: serde_json::Value) -> CapabilityRequest {
        CapabilityRequest {
            profile_id: "Default".to_string(),
            cloudserver_id: format!("local:{}", instance),
            params: params.as_object().cloned().unwrap_or_default(),
        }
    }

    #[tokio::test]
    async fn test_power_cycle() {
        let adapter = adapter();
        let capabilities = Arc::clone(&adapter).capabilities();
        assert_eq!(capabilities.actions(), vec!["delete", "reboot", "start", "stop"]);

        let start = capabilities.resolve("start").unwrap();
        let stop = capabilities.resolve("stop").unwrap();
        let reboot = capabilities.resolve("reboot").unwrap();

        let err = reboot(request("n1", json!({}))).await.unwrap_err();
        assert!(err.to_string().contains("not running"));

        assert_eq!(
            start(request("n1", json!({}))).await.unwrap().as_deref(),
            Some("Started instance n1")
        );
        assert_eq!(adapter.power_state("n1").await, Some(PowerState::Running));
        assert_eq!(
            start(request("n1", json!({}))).await.unwrap().as_deref(),
            Some("Instance n1 is already running")
        );
        assert_eq!(
            reboot(request("n1", json!({"soft": false}))).await.unwrap().as_deref(),
            Some("Reset instance n1")
        );
        assert_eq!(
            stop(request("n1", json!({"soft": false}))).await.unwrap().as_deref(),
            Some("Powered off instance n1")
        );
        assert_eq!(adapter.power_state("n1").await, Some(PowerState::Stopped));
    }

    #[tokio::test]
    async fn test_delete_unknown_instance_fails() {
        let capabilities = adapter().capabilities();
        let delete = capabilities.resolve("delete").unwrap();

        assert!(delete(request("n2", json!({}))).await.is_ok());
        let err = delete(request("n2", json!({}))).await.unwrap_err();
        assert_eq!(err.to_string(), "Unknown instance 'n2'");
    }

    #[tokio::test]
    async fn test_unknown_profile_is_rejected() {
        let capabilities = adapter().capabilities();
        let start = capabilities.resolve("start").unwrap();

        let mut req = request("n1", json!({}));
        req.profile_id = "Spot".to_string();
        let err = start(req).await.unwrap_err();
        assert!(err.to_string().contains("no profile [Spot]"));
    }

    #[test]
    fn test_startup_script_renders_template_with_node_fqdn() {
        let adapter = adapter();
        let node = Node::new(NodeId(1), "n1.cluster.local", NodeState::Provisioning);

        let generator = adapter.startup_script().unwrap();
        let script = generator
            .generate_startup_script("Default", Some(&node), None)
            .unwrap();

        assert!(script.starts_with("/etc/flotilla/bootstrap.tmpl"));
        assert!(script.contains("fqdn=n1.cluster.local"));
        assert!(script.contains("dns_domain=cluster.local"));
    }

    #[test]
    fn test_startup_script_without_renderer_is_configuration_error() {
        let adapter = LocalAdapter::new(
            "local",
            HashMap::from([(
                "Default".to_string(),
                serde_json::from_value(json!({"cloud_init_script_template": "t"})).unwrap(),
            )]),
            InstallerConfig::default(),
        );

        let err = adapter
            .generate_startup_script("Default", None, None)
            .unwrap_err();
        assert!(matches!(err, EngineError::Configuration(_)));
    }
}
