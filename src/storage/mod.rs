// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Keyed record tables backing the action and node stores.

mod table;

pub use table::{Record, RecordTable};
