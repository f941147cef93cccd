// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Template variables for cloud-init startup scripts.
//!
//! Adapters that implement [`GeneratesStartupScript`] share this helper to
//! turn a profile's settings, the installer endpoint and the node being
//! provisioned into the variable set a [`TemplateRenderer`] fills in.
//!
//! [`GeneratesStartupScript`]: crate::traits::GeneratesStartupScript
//! [`TemplateRenderer`]: crate::traits::TemplateRenderer

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::config::{InstallerConfig, ProfileSettings};
use crate::errors::{EngineError, EngineResult};
use crate::nodes::Node;

pub const CLOUD_INIT_TEMPLATE_KEY: &str = "cloud_init_script_template";

/// Resolve the template path and variables for one startup script.
///
/// Fails with a configuration error when the profile does not name a
/// template.
pub fn cloud_init_template_vars(
    settings: &ProfileSettings,
    installer: &InstallerConfig,
    node: Option<&Node>,
    insertnode_request: Option<&[u8]>,
) -> EngineResult<(PathBuf, BTreeMap<String, String>)> {
    let template = settings
        .get(CLOUD_INIT_TEMPLATE_KEY)
        .and_then(Value::as_str)
        .filter(|path| !path.trim().is_empty())
        .ok_or_else(|| {
            EngineError::Configuration("cloud-init script template not defined".to_string())
        })?;

    let mut vars = BTreeMap::new();
    vars.insert("installer".to_string(), installer.hostname.clone());
    vars.insert(
        "installer_ip_address".to_string(),
        installer.ip_address.clone().unwrap_or_default(),
    );
    vars.insert(
        "override_dns_domain".to_string(),
        settings
            .get("override_dns_domain")
            .map_or_else(|| "false".to_string(), setting_text),
    );
    vars.insert(
        "dns_domain".to_string(),
        settings.get("dns_domain").map(setting_text).unwrap_or_default(),
    );

    if let Some(node) = node {
        vars.insert("fqdn".to_string(), node.name.clone());
    }
    if let Some(request) = insertnode_request {
        vars.insert("insertnode_request".to_string(), STANDARD.encode(request));
    }

    Ok((PathBuf::from(template), vars))
}

fn setting_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{NodeId, NodeState};
    use serde_json::json;

    fn settings(value: serde_json::Value) -> ProfileSettings {
        serde_json::from_value(value).unwrap()
    }

    fn installer() -> InstallerConfig {
        InstallerConfig {
            hostname: "installer.cluster.local".to_string(),
            ip_address: Some("10.0.0.1".to_string()),
        }
    }

    #[test]
    fn test_missing_template_is_configuration_error() {
        let err = cloud_init_template_vars(
            &settings(json!({"dns_domain": "cluster.local"})),
            &installer(),
            None,
            None,
        )
        .unwrap_err();

        assert!(matches!(err, EngineError::Configuration(_)));
        assert!(err.to_string().contains("cloud-init script template not defined"));
    }

    #[test]
    fn test_vars_include_node_and_encoded_request() {
        let node = Node::new(NodeId(3), "compute-03.cluster.local", NodeState::Provisioning);
        let (template, vars) = cloud_init_template_vars(
            &settings(json!({
                "cloud_init_script_template": "/etc/flotilla/bootstrap.tmpl",
                "dns_domain": "cluster.local",
                "override_dns_domain": true,
            })),
            &installer(),
            Some(&node),
            Some(b"{\"node\":\"compute-03\"}"),
        )
        .unwrap();

        assert_eq!(template, PathBuf::from("/etc/flotilla/bootstrap.tmpl"));
        assert_eq!(vars["installer"], "installer.cluster.local");
        assert_eq!(vars["installer_ip_address"], "10.0.0.1");
        assert_eq!(vars["override_dns_domain"], "true");
        assert_eq!(vars["dns_domain"], "cluster.local");
        assert_eq!(vars["fqdn"], "compute-03.cluster.local");
        assert_eq!(
            STANDARD.decode(&vars["insertnode_request"]).unwrap(),
            b"{\"node\":\"compute-03\"}"
        );
    }

    #[test]
    fn test_vars_without_node_omit_fqdn() {
        let (_, vars) = cloud_init_template_vars(
            &settings(json!({"cloud_init_script_template": "bootstrap.tmpl"})),
            &InstallerConfig::default(),
            None,
            None,
        )
        .unwrap();

        assert!(!vars.contains_key("fqdn"));
        assert!(!vars.contains_key("insertnode_request"));
        assert_eq!(vars["override_dns_domain"], "false");
        assert_eq!(vars["dns_domain"], "");
    }
}
