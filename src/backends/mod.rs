// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Resource adapter implementations.
//!
//! # Available Backends
//!
//! ## Local Backend
//! An in-process adapter that keeps a power-state table for a fixed
//! inventory of instances. Useful for labs, demos and tests; it never talks
//! to a real provider.
//!
//! ## Stub Backend (Test-Only)
//! Recording adapters and scripted listeners used by the unit and
//! integration tests. NOT available in production builds.
//!
//! # Architecture
//!
//! ```text
//! Configuration → Factory → ResourceAdapter → ResourceAdapterRegistry
//! ```
//!
//! # Examples
//!
//! ```rust
//! use std::collections::HashMap;
//! use the_flotilla::backends::local::LocalAdapterFactory;
//! use the_flotilla::config::{AdapterConfig, AdapterType, InstallerConfig};
//! use the_flotilla::traits::ResourceAdapter;
//!
//! let config = AdapterConfig {
//!     name: "lab".to_string(),
//!     adapter_type: AdapterType::Local,
//!     profiles: HashMap::new(),
//!     instances: vec!["compute-01".to_string()],
//! };
//!
//! let adapter = LocalAdapterFactory::create_adapter(&config, &InstallerConfig::default())?;
//! assert_eq!(adapter.adapter_name(), "lab");
//! # Ok::<(), String>(())
//! ```

pub mod local;
pub mod startup_script;
#[cfg(test)]
pub mod stub;
