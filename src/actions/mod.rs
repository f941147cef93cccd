// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Cloud-server actions: requests to run one adapter capability against
//! one remote resource, tracked through a four-state status machine.

mod manager;
mod model;
mod store;

pub use manager::{ActionManager, NewAction};
pub use model::{ActionId, ActionStatus, CloudServerAction};
pub use store::TableActionStore;
