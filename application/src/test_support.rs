//! Shared test doubles for the application layer.

use crate::config::RunParams;
use crate::gateway::ToolGateway;
use crate::ports::tool_adapter::ToolAdapter;
use async_trait::async_trait;
use crew_domain::{ToolError, ToolErrorKind, ToolPolicy};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Responder = Box<dyn Fn(&Value) -> Result<Value, ToolError> + Send + Sync>;

/// Tool adapter answering from a closure, counting calls.
pub struct StubTool {
    name: &'static str,
    respond: Responder,
    delay: Duration,
    calls: AtomicUsize,
    arguments: Mutex<Vec<Value>>,
}

impl StubTool {
    pub fn new(
        name: &'static str,
        respond: impl Fn(&Value) -> Result<Value, ToolError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            respond: Box::new(respond),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            arguments: Mutex::new(Vec::new()),
        }
    }

    /// Always returns `output`.
    pub fn returning(name: &'static str, output: Value) -> Self {
        Self::new(name, move |_| Ok(output.clone()))
    }

    /// Always fails with `kind`.
    pub fn failing(name: &'static str, kind: ToolErrorKind) -> Self {
        Self::new(name, move |_| Err(ToolError::new(name, kind, "stub failure")))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_arguments(&self) -> Option<Value> {
        self.arguments.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ToolAdapter for StubTool {
    fn name(&self) -> &str {
        self.name
    }

    async fn invoke(&self, arguments: &Value) -> Result<Value, ToolError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.arguments.lock().unwrap().push(arguments.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        (self.respond)(arguments)
    }
}

/// Short timeouts and near-zero backoff so retry paths stay fast.
pub fn fast_params() -> RunParams {
    RunParams::default()
        .with_deadline(Duration::from_secs(5))
        .with_default_policy(
            ToolPolicy::default()
                .with_timeout(Duration::from_millis(500))
                .with_max_retries(2)
                .with_base_delay(Duration::from_millis(1))
                .with_max_delay(Duration::from_millis(4)),
        )
}

pub fn gateway(params: RunParams, tools: &[Arc<StubTool>]) -> Arc<ToolGateway> {
    let mut gateway = ToolGateway::new(params);
    for tool in tools {
        gateway.register(tool.clone());
    }
    Arc::new(gateway)
}
