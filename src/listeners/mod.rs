// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Built-in listeners.
//!
//! * [`CloudServerActionListener`] runs a requested cloud-server action
//!   through the owning resource adapter.
//! * [`NodeProvisioningListener`] marks nodes that never finish installing
//!   as unresponsive.

mod cloud_server_action;
mod node_provisioning;

pub use cloud_server_action::CloudServerActionListener;
pub use node_provisioning::NodeProvisioningListener;
