// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod actions;        // cloud-server action records + requester
pub mod backends;       // resource adapter implementations
pub mod config;         // config + registries + runtime builder
pub mod engine;         // dispatcher, task queue, workers
pub mod errors;         // error handling
pub mod events;         // events and the dispatch outbox
pub mod listeners;      // built-in listeners
pub mod nodes;          // fleet nodes and nodespec matching
pub mod observability;
pub mod storage;        // record tables behind the stores
pub mod traits;         // unified abstractions
