// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod adapter_registry;
mod listener_registry;
mod loader;
mod runtime;
mod validation;

pub mod consts;

pub use adapter_registry::ResourceAdapterRegistry;
pub use listener_registry::{ListenerRegistry, ListenerRegistryBuilder};
pub use loader::{
    load_and_validate_config, load_config, ActionsConfig, AdapterConfig, AdapterType, Config,
    DispatcherConfig, InstallerConfig, LoggingConfig, ProfileSettings, StoreConfig, StoreKind,
    WatchdogConfig, WorkerConfig,
};
pub use runtime::{ListenerContext, RuntimeBuilder};
pub use validation::validate_config;
