// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Execution substrate: dispatcher, task queue and worker pool.
//!
//! ```text
//! manager ──emit──▶ outbox ──▶ Dispatcher ──submit──▶ TaskQueue ──next──▶ WorkerPool ──run──▶ Listener
//!    ▲                                                                                        │
//!    └──────────────────────────────── state change ─────────────────────────────────────────┘
//! ```

pub mod dispatcher;
pub mod runtime;
pub mod task_queue;
pub mod worker;


pub use dispatcher::{DispatchReport, Dispatcher};
pub use runtime::Runtime;
pub use task_queue::InMemoryTaskQueue;
pub use worker::{DeliveryOutcome, DeliveryRunner, WorkerOptions, WorkerPool};
