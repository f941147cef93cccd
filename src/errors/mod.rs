// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod engine;
mod store;

pub use config::{ConfigError, ValidationError};
pub use engine::{describe_failure, panic_message, EngineError, EngineResult, ResourceKind};
pub use store::{QueueError, StoreError};
