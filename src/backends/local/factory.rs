// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use super::adapter::LocalAdapter;
use crate::config::{AdapterConfig, AdapterType, InstallerConfig};
use crate::traits::ResourceAdapter;

/// Factory for creating built-in (in-process) resource adapters
pub struct LocalAdapterFactory;

impl LocalAdapterFactory {
    /// Create an adapter instance from configuration
    ///
    /// The `type` field selects the implementation:
    /// - "local" -> LocalAdapter seeded with the configured `instances`
    pub fn create_adapter(
        config: &AdapterConfig,
        installer: &InstallerConfig,
    ) -> Result<Arc<dyn ResourceAdapter>, String> {
        match config.adapter_type {
            AdapterType::Local => Ok(Arc::new(
                LocalAdapter::new(&config.name, config.profiles.clone(), installer.clone())
                    .with_instances(config.instances.iter().cloned()),
            )),
        }
    }

    /// Get list of available adapter types
    pub fn available_types() -> Vec<&'static str> {
        vec!["local"]
    }
}
