// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Configuration validation.
//!
//! Checks run independently and every problem is collected, so a broken
//! file is reported in one pass:
//!
//! 1. **Sizing**: worker count, delivery attempts and event depth are at least one
//! 2. **Adapter names**: unique, non-empty, and free of `:` (the cloudserver id separator)
//! 3. **Store**: a `json_file` store names a directory
//!
//! # Examples
//!
//! ```rust
//! use the_flotilla::config::{validate_config, Config};
//! use the_flotilla::errors::ValidationError;
//!
//! let mut config = Config::default();
//! config.workers.count = 0;
//!
//! let errors = validate_config(&config).unwrap_err();
//! assert_eq!(errors, vec![ValidationError::ZeroValue { setting: "workers.count" }]);
//! ```

use std::collections::HashSet;

use crate::config::{Config, StoreKind};
use crate::errors::ValidationError;

pub fn validate_config(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    validate_sizing(config, &mut errors);
    validate_adapter_names(config, &mut errors);
    validate_store(config, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_sizing(config: &Config, errors: &mut Vec<ValidationError>) {
    let checks = [
        ("workers.count", config.workers.count as u64),
        (
            "workers.max_delivery_attempts",
            config.workers.max_delivery_attempts as u64,
        ),
        (
            "dispatcher.max_event_depth",
            config.dispatcher.max_event_depth as u64,
        ),
    ];

    for (setting, value) in checks {
        if value == 0 {
            errors.push(ValidationError::ZeroValue { setting });
        }
    }
}

fn validate_adapter_names(config: &Config, errors: &mut Vec<ValidationError>) {
    let mut seen = HashSet::new();

    for adapter in &config.adapters {
        if adapter.name.trim().is_empty() {
            errors.push(ValidationError::InvalidAdapterName {
                name: adapter.name.clone(),
                reason: "name must not be empty",
            });
        } else if adapter.name.contains(':') {
            errors.push(ValidationError::InvalidAdapterName {
                name: adapter.name.clone(),
                reason: "name must not contain ':'",
            });
        }

        if !seen.insert(adapter.name.as_str()) {
            errors.push(ValidationError::DuplicateAdapterName {
                name: adapter.name.clone(),
            });
        }
    }
}

fn validate_store(config: &Config, errors: &mut Vec<ValidationError>) {
    if config.store.kind == StoreKind::JsonFile && config.store.directory.is_none() {
        errors.push(ValidationError::MissingStoreDirectory);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AdapterConfig, AdapterType};
    use std::collections::HashMap;

    fn adapter(name: &str) -> AdapterConfig {
        AdapterConfig {
            name: name.to_string(),
            adapter_type: AdapterType::Local,
            profiles: HashMap::new(),
            instances: vec![],
        }
    }

    #[test]
    fn test_validate_config_table_driven() {
        struct TestCase {
            name: &'static str,
            config: Config,
            expected: Vec<ValidationError>,
        }

        let test_cases = vec![
            TestCase {
                name: "defaults are valid",
                config: Config::default(),
                expected: vec![],
            },
            TestCase {
                name: "zero sizing",
                config: {
                    let mut cfg = Config::default();
                    cfg.workers.count = 0;
                    cfg.workers.max_delivery_attempts = 0;
                    cfg.dispatcher.max_event_depth = 0;
                    cfg
                },
                expected: vec![
                    ValidationError::ZeroValue { setting: "workers.count" },
                    ValidationError::ZeroValue { setting: "workers.max_delivery_attempts" },
                    ValidationError::ZeroValue { setting: "dispatcher.max_event_depth" },
                ],
            },
            TestCase {
                name: "adapter names",
                config: Config {
                    adapters: vec![adapter("aws"), adapter("aws"), adapter("gce:eu"), adapter(" ")],
                    ..Config::default()
                },
                expected: vec![
                    ValidationError::DuplicateAdapterName { name: "aws".to_string() },
                    ValidationError::InvalidAdapterName {
                        name: "gce:eu".to_string(),
                        reason: "name must not contain ':'",
                    },
                    ValidationError::InvalidAdapterName {
                        name: " ".to_string(),
                        reason: "name must not be empty",
                    },
                ],
            },
            TestCase {
                name: "json store without directory",
                config: {
                    let mut cfg = Config::default();
                    cfg.store.kind = StoreKind::JsonFile;
                    cfg
                },
                expected: vec![ValidationError::MissingStoreDirectory],
            },
        ];

        for case in test_cases {
            let actual = validate_config(&case.config).err().unwrap_or_default();
            assert_eq!(actual, case.expected, "case: {}", case.name);
        }
    }
}
