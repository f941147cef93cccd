// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod adapter;
pub mod listener;
pub mod queue;
pub mod store;

pub use adapter::{
    CapabilityHandler, CapabilityMap, CapabilityRequest, GeneratesStartupScript, ResourceAdapter,
    TemplateRenderer,
};
pub use listener::Listener;
pub use queue::{Delivery, TaskQueue};
pub use store::{ActionStore, NodeStore};
