// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Adapter profile used when an action does not name one
pub const DEFAULT_CONFIGURATION_PROFILE_NAME: &str = "Default";
/// How long a node may sit in `Provisioned` before it is marked `Unresponsive`
pub const PROVISIONING_TIMEOUT_SECS: u64 = 600;
/// Longest event -> listener -> event chain the dispatcher will follow
pub const DEFAULT_MAX_EVENT_DEPTH: u32 = 16;
pub const DEFAULT_WORKER_COUNT: usize = 4;
/// Listener failures are not retried unless configured
pub const DEFAULT_MAX_DELIVERY_ATTEMPTS: u32 = 1;
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 1_000;
pub const DEFAULT_LOG_LEVEL: &str = "info";
/// Adapter capabilities are named `<prefix><action>`
pub const CAPABILITY_PREFIX: &str = "cloudserveraction_";
pub const ACTIONS_FILE_NAME: &str = "actions.json";
pub const NODES_FILE_NAME: &str = "nodes.json";
pub const DEFAULT_INSTALLER_HOSTNAME: &str = "localhost";
