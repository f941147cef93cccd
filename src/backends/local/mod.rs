// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod adapter;
pub mod factory;

pub use adapter::{LocalAdapter, PowerState};
pub use factory::LocalAdapterFactory;
