// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! All diagnostic output of The Flotilla goes through `tracing`. Message
//! texts are not scattered through the code as format strings; each
//! loggable occurrence is a small struct implementing `Display`, and the
//! ones worth filtering on also implement
//! [`messages::StructuredLog`] to emit typed fields and open spans.
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::dispatch` - event dispatch and delivery scheduling
//! * `messages::action` - cloud-server action execution
//! * `messages::node` - node state changes and the provisioning watchdog
//! * `messages::worker` - worker pool lifecycle, failures and redelivery
//! * `messages::config` - configuration loading and registry assembly
//!
//! # Usage
//!
//! ```rust
//! use the_flotilla::observability::messages::action::ActionNotFound;
//!
//! let msg = ActionNotFound {
//!     action_id: "3f2c9b7e-1f0d-4c1e-9d7a-6a4c1f0b9e21",
//! };
//!
//! tracing::warn!("{}", msg);
//! ```

use tracing_subscriber::EnvFilter;

pub mod messages;

/// Install the global `fmt` subscriber.
///
/// `RUST_LOG` wins over `default_level` when set. Calling this more than
/// once is harmless; later calls leave the first subscriber in place.
pub fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
