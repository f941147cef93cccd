// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use super::store::StoreError;

/// Problems found while validating a loaded configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A setting that must be at least one is zero
    ZeroValue { setting: &'static str },
    /// Two adapters share a name
    DuplicateAdapterName { name: String },
    /// An adapter name would be ambiguous inside a cloudserver id
    InvalidAdapterName { name: String, reason: &'static str },
    /// The file-backed store was selected without a directory
    MissingStoreDirectory,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::ZeroValue { setting } => {
                write!(f, "Setting '{}' must be greater than zero", setting)
            }
            ValidationError::DuplicateAdapterName { name } => {
                write!(f, "Duplicate resource adapter name: '{}'", name)
            }
            ValidationError::InvalidAdapterName { name, reason } => {
                write!(f, "Invalid resource adapter name '{}': {}", name, reason)
            }
            ValidationError::MissingStoreDirectory => {
                write!(f, "Store kind 'json_file' requires a 'directory'")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Errors raised while loading configuration files.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration validation failed:\n{}", render_validation_errors(.0))]
    Validation(Vec<ValidationError>),

    /// A configured adapter could not be built.
    #[error("Failed to create resource adapter '{name}': {reason}")]
    AdapterCreation { name: String, reason: String },

    #[error("Resource adapter '{0}' is registered twice")]
    DuplicateAdapter(String),

    #[error("Listener '{0}' is registered twice")]
    DuplicateListener(String),

    #[error("Failed to open store: {0}")]
    Store(#[from] StoreError),
}

fn render_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
