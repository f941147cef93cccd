// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::errors::{EngineError, EngineResult};
use crate::events::{Event, EventType};
use crate::traits::{
    CapabilityMap, CapabilityRequest, Listener, ResourceAdapter, TemplateRenderer,
};

/// Adapter that records every capability call.
///
/// `start`, `stop` and `reboot` succeed with `"<action> ok: <cloudserver_id>"`,
/// `fail` returns an error and `panic` panics.
pub struct RecordingAdapter {
    name: String,
    calls: Mutex<Vec<CapabilityRequest>>,
}

impl RecordingAdapter {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<CapabilityRequest> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, request: &CapabilityRequest) {
        self.calls.lock().unwrap().push(request.clone());
    }
}

impl ResourceAdapter for RecordingAdapter {
    fn adapter_name(&self) -> &str {
        &self.name
    }

    fn capabilities(self: Arc<Self>) -> CapabilityMap {
        let mut capabilities = CapabilityMap::new();

        for action in ["start", "stop", "reboot"] {
            let adapter = Arc::clone(&self);
            capabilities.register(action, move |request: CapabilityRequest| {
                adapter.record(&request);
                let message = format!("{} ok: {}", action, request.cloudserver_id);
                async move { Ok(Some(message)) }
            });
        }

        let adapter = Arc::clone(&self);
        capabilities.register("fail", move |request: CapabilityRequest| {
            adapter.record(&request);
            async move { anyhow::bail!("instance {} refused", request.instance_id()) }
        });

        let adapter = Arc::clone(&self);
        capabilities.register("panic", move |request: CapabilityRequest| {
            adapter.record(&request);
            async move { panic!("adapter blew up on {}", request.cloudserver_id) }
        });

        capabilities
    }
}

/// Listener that counts its runs.
pub struct CountingListener {
    name: &'static str,
    event_types: Vec<EventType>,
    runs: AtomicUsize,
}

impl CountingListener {
    pub fn new(name: &'static str, event_types: &[&str]) -> Self {
        Self {
            name,
            event_types: event_types.iter().map(|t| EventType::custom(*t)).collect(),
            runs: AtomicUsize::new(0),
        }
    }

    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Listener for CountingListener {
    fn name(&self) -> &'static str {
        self.name
    }

    fn event_types(&self) -> Vec<EventType> {
        self.event_types.clone()
    }

    async fn run(&self, _event: &Event) -> EngineResult<()> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Listener that fails its first `failures` runs, then succeeds.
pub struct FlakyListener {
    name: &'static str,
    event_type: EventType,
    failures: usize,
    runs: AtomicUsize,
}

impl FlakyListener {
    pub fn new(name: &'static str, event_type: &str, failures: usize) -> Self {
        Self {
            name,
            event_type: EventType::custom(event_type),
            failures,
            runs: AtomicUsize::new(0),
        }
    }

    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Listener for FlakyListener {
    fn name(&self) -> &'static str {
        self.name
    }

    fn event_types(&self) -> Vec<EventType> {
        vec![self.event_type.clone()]
    }

    async fn run(&self, _event: &Event) -> EngineResult<()> {
        let run = self.runs.fetch_add(1, Ordering::SeqCst) + 1;
        if run <= self.failures {
            return Err(EngineError::InvalidRequest(format!(
                "{} failed on run {}",
                self.name, run
            )));
        }
        Ok(())
    }
}

/// Listener that panics every time it runs.
pub struct PanickingListener {
    name: &'static str,
    event_type: EventType,
}

impl PanickingListener {
    pub fn new(name: &'static str, event_type: &str) -> Self {
        Self {
            name,
            event_type: EventType::custom(event_type),
        }
    }
}

#[async_trait]
impl Listener for PanickingListener {
    fn name(&self) -> &'static str {
        self.name
    }

    fn event_types(&self) -> Vec<EventType> {
        vec![self.event_type.clone()]
    }

    async fn run(&self, event: &Event) -> EngineResult<()> {
        panic!("{} panicked on {}", self.name, event.id())
    }
}

/// Listener that re-emits a custom event of its own type each run,
/// producing an unbounded chain.
pub struct EchoListener {
    event_type: &'static str,
    emitter: crate::events::EventEmitter,
    runs: AtomicUsize,
}

impl EchoListener {
    pub fn new(event_type: &'static str, emitter: crate::events::EventEmitter) -> Self {
        Self {
            event_type,
            emitter,
            runs: AtomicUsize::new(0),
        }
    }

    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Listener for EchoListener {
    fn name(&self) -> &'static str {
        "echo"
    }

    fn event_types(&self) -> Vec<EventType> {
        vec![EventType::custom(self.event_type)]
    }

    async fn run(&self, event: &Event) -> EngineResult<()> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        self.emitter.emit(Event::custom(
            self.event_type,
            serde_json::json!({ "depth": event.depth() }),
        ))?;
        Ok(())
    }
}

/// Renderer that echoes the template path followed by one `key=value` line per variable.
#[derive(Default)]
pub struct RecordingRenderer;

impl TemplateRenderer for RecordingRenderer {
    fn render(&self, template: &Path, vars: &BTreeMap<String, String>) -> anyhow::Result<String> {
        let mut rendered = template.display().to_string();
        for (key, value) in vars {
            rendered.push('\n');
            rendered.push_str(&format!("{}={}", key, value));
        }
        Ok(rendered)
    }
}
