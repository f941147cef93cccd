// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::sync::Arc;

use crate::backends::local::LocalAdapterFactory;
use crate::config::Config;
use crate::errors::{ConfigError, EngineError, EngineResult, ResourceKind};
use crate::observability::messages::config::AdapterRegistered;
use crate::traits::{CapabilityHandler, CapabilityMap, ResourceAdapter};

struct RegisteredAdapter {
    adapter: Arc<dyn ResourceAdapter>,
    capabilities: CapabilityMap,
}

/// Registry mapping resource adapter names to their implementations.
///
/// Populated once at startup; capability maps are captured at registration
/// so a lookup during execution is two hash probes.
///
/// # Examples
///
/// ```rust
/// use std::collections::HashMap;
/// use std::sync::Arc;
/// use the_flotilla::backends::local::LocalAdapter;
/// use the_flotilla::config::{InstallerConfig, ResourceAdapterRegistry};
///
/// let mut registry = ResourceAdapterRegistry::new();
/// registry
///     .register(Arc::new(
///         LocalAdapter::new("local", HashMap::new(), InstallerConfig::default())
///             .with_instances(["compute-01"]),
///     ))
///     .unwrap();
///
/// assert!(registry.get_api("local").is_ok());
/// assert!(registry.resolve_capability("local", "reboot").is_ok());
/// assert!(registry.resolve_capability("local", "hibernate").is_err());
/// ```
#[derive(Default)]
pub struct ResourceAdapterRegistry(HashMap<String, RegisteredAdapter>);

impl ResourceAdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the registry from configuration, building every configured adapter
    pub fn from_config(cfg: &Config) -> Result<Self, ConfigError> {
        let mut registry = Self::new();

        for adapter_config in &cfg.adapters {
            let adapter = LocalAdapterFactory::create_adapter(adapter_config, &cfg.installer)
                .map_err(|reason| ConfigError::AdapterCreation {
                    name: adapter_config.name.clone(),
                    reason,
                })?;
            registry.register(adapter)?;
        }

        Ok(registry)
    }

    pub fn register(&mut self, adapter: Arc<dyn ResourceAdapter>) -> Result<(), ConfigError> {
        let name = adapter.adapter_name().to_string();
        if self.0.contains_key(&name) {
            return Err(ConfigError::DuplicateAdapter(name));
        }

        let capabilities = Arc::clone(&adapter).capabilities();
        tracing::info!(
            "{}",
            AdapterRegistered {
                name: &name,
                actions: &capabilities.actions(),
            }
        );

        self.0.insert(
            name,
            RegisteredAdapter {
                adapter,
                capabilities,
            },
        );
        Ok(())
    }

    /// Look up an adapter by name
    pub fn get_api(&self, name: &str) -> EngineResult<&Arc<dyn ResourceAdapter>> {
        self.0
            .get(name)
            .map(|entry| &entry.adapter)
            .ok_or_else(|| EngineError::not_found(ResourceKind::ResourceAdapter, name))
    }

    /// Find the handler for `action` on the named adapter
    pub fn resolve_capability(&self, adapter: &str, action: &str) -> EngineResult<CapabilityHandler> {
        let entry = self
            .0
            .get(adapter)
            .ok_or_else(|| EngineError::not_found(ResourceKind::ResourceAdapter, adapter))?;

        entry
            .capabilities
            .resolve(action)
            .ok_or_else(|| EngineError::CapabilityUnsupported {
                adapter: adapter.to_string(),
                action: action.to_string(),
                capability: CapabilityMap::capability_name(action),
            })
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.0.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for ResourceAdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceAdapterRegistry")
            .field("adapter_count", &self.0.len())
            .field("adapters", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::RecordingAdapter;
    use crate::config::{AdapterConfig, AdapterType};

    #[test]
    fn test_from_config_table_driven() {
        struct TestCase {
            name: &'static str,
            adapters: Vec<&'static str>,
            expected: Result<Vec<&'static str>, &'static str>,
        }

        let test_cases = vec![
            TestCase {
                name: "no adapters",
                adapters: vec![],
                expected: Ok(vec![]),
            },
            TestCase {
                name: "two local adapters",
                adapters: vec!["rack-b", "rack-a"],
                expected: Ok(vec!["rack-a", "rack-b"]),
            },
            TestCase {
                name: "duplicate name",
                adapters: vec!["rack-a", "rack-a"],
                expected: Err("registered twice"),
            },
        ];

        for case in test_cases {
            let cfg = Config {
                adapters: case
                    .adapters
                    .iter()
                    .map(|name| AdapterConfig {
                        name: name.to_string(),
                        adapter_type: AdapterType::Local,
                        profiles: HashMap::new(),
                        instances: vec![],
                    })
                    .collect(),
                ..Config::default()
            };

            match (ResourceAdapterRegistry::from_config(&cfg), case.expected) {
                (Ok(registry), Ok(expected)) => {
                    assert_eq!(registry.names(), expected, "case: {}", case.name)
                }
                (Err(err), Err(fragment)) => {
                    assert!(err.to_string().contains(fragment), "case: {}", case.name)
                }
                (result, _) => panic!("case {}: unexpected result {:?}", case.name, result.err()),
            }
        }
    }

    #[test]
    fn test_resolution_errors() {
        let mut registry = ResourceAdapterRegistry::new();
        registry
            .register(Arc::new(RecordingAdapter::new("aws")))
            .unwrap();

        let missing_adapter = registry.resolve_capability("gce", "start").err().unwrap();
        assert_eq!(missing_adapter.to_string(), "Resource adapter [gce] not found");

        let missing_capability = registry.resolve_capability("aws", "hibernate").err().unwrap();
        assert!(matches!(
            missing_capability,
            EngineError::CapabilityUnsupported { ref capability, .. }
                if capability == "cloudserveraction_hibernate"
        ));

        assert!(registry.get_api("aws").is_ok());
        assert!(registry.get_api("gce").err().unwrap().is_not_found());
    }
}
