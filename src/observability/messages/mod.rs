// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! # Organization
//!
//! * `dispatch` - event dispatch and delivery scheduling
//! * `action` - cloud-server action execution
//! * `node` - node state changes and the provisioning watchdog
//! * `worker` - worker pool lifecycle and redelivery
//! * `config` - configuration loading and registry assembly
//!
//! # Usage Pattern
//!
//! ```rust
//! use the_flotilla::observability::messages::{worker::WorkerPoolStarted, StructuredLog};
//!
//! let msg = WorkerPoolStarted {
//!     worker_count: 4,
//!     max_delivery_attempts: 3,
//! };
//!
//! msg.log();
//! ```

use tracing::Span;

pub mod action;
pub mod config;
pub mod dispatch;
pub mod node;
pub mod worker;

/// Messages that know their own log level and structured fields.
pub trait StructuredLog {
    fn log(&self);

    fn span(&self, name: &str) -> Span;
}
