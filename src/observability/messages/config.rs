// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for configuration loading and runtime assembly.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Configuration file parsed and validated.
///
/// # Log Level
/// `info!`
pub struct ConfigLoaded<'a> {
    pub path: &'a str,
    pub adapter_count: usize,
    pub worker_count: usize,
}

impl Display for ConfigLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Loaded configuration from {}: {} resource adapters, {} workers",
            self.path, self.adapter_count, self.worker_count
        )
    }
}

impl StructuredLog for ConfigLoaded<'_> {
    fn log(&self) {
        tracing::info!(
            path = self.path,
            adapter_count = self.adapter_count,
            worker_count = self.worker_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("config", span_name = name, path = self.path)
    }
}

pub struct AdapterRegistered<'a> {
    pub name: &'a str,
    pub actions: &'a [String],
}

impl Display for AdapterRegistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Registered resource adapter '{}' with actions [{}]",
            self.name,
            self.actions.join(", ")
        )
    }
}

pub struct ListenerRegistered<'a> {
    pub name: &'a str,
    pub event_types: &'a str,
}

impl Display for ListenerRegistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Registered listener '{}' for [{}]",
            self.name, self.event_types
        )
    }
}

/// Validation rejected the configuration.
///
/// # Log Level
/// `error!`
pub struct ValidationFailed {
    pub error_count: usize,
}

impl Display for ValidationFailed {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Configuration validation failed with {} errors",
            self.error_count
        )
    }
}
