//! Tool Invocation Gateway
//!
//! The single path through which workers and the submission driver reach
//! external tools. Resolves the adapter by name, bounds every attempt with
//! the policy's timeout, retries transient failures with exponential
//! backoff and records one [`ToolInvocation`] per call.

use crate::config::RunParams;
use crate::ports::run_logger::{NoRunEventLogger, RunEvent, RunEventLogger};
use crate::ports::tool_adapter::ToolAdapter;
use crew_domain::tool::payloads::parse_json_text;
use crew_domain::{ToolCall, ToolError, ToolInvocation, ToolPolicy};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Invocation records kept for [`ToolGateway::invocations`]; older ones
/// are dropped first.
pub const INVOCATION_HISTORY_LIMIT: usize = 256;

/// Registry of tool adapters plus the policy table.
///
/// Meant to serve one run. A gateway shared across runs keeps only the
/// most recent [`INVOCATION_HISTORY_LIMIT`] invocation records; callers that
/// want per-run telemetry drain it with [`ToolGateway::take_invocations`].
pub struct ToolGateway {
    adapters: HashMap<String, Arc<dyn ToolAdapter>>,
    params: RunParams,
    logger: Arc<dyn RunEventLogger>,
    invocations: Mutex<VecDeque<ToolInvocation>>,
}

impl ToolGateway {
    pub fn new(params: RunParams) -> Self {
        Self {
            adapters: HashMap::new(),
            params,
            logger: Arc::new(NoRunEventLogger),
            invocations: Mutex::new(VecDeque::new()),
        }
    }

    /// Register an adapter under its own name, replacing any previous one.
    pub fn with_adapter(mut self, adapter: Arc<dyn ToolAdapter>) -> Self {
        self.register(adapter);
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn RunEventLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn register(&mut self, adapter: Arc<dyn ToolAdapter>) {
        self.adapters.insert(adapter.name().to_string(), adapter);
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.adapters.contains_key(name)
    }

    /// Names of all registered tools, sorted.
    pub fn tool_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.adapters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn params(&self) -> &RunParams {
        &self.params
    }

    /// Policy applied by [`call`](Self::call) for `tool`.
    pub fn policy_for(&self, tool: &str) -> ToolPolicy {
        self.params.policy_for(tool)
    }

    /// Telemetry for the retained invocations, oldest first.
    pub fn invocations(&self) -> Vec<ToolInvocation> {
        self.invocations
            .lock()
            .map(|list| list.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Retained invocation telemetry, leaving the history empty.
    pub fn take_invocations(&self) -> Vec<ToolInvocation> {
        self.invocations
            .lock()
            .map(|mut list| list.drain(..).collect())
            .unwrap_or_default()
    }

    /// Invoke with the configured policy for the tool.
    pub async fn call(&self, call: &ToolCall) -> Result<Value, ToolError> {
        let policy = self.policy_for(&call.tool_name);
        self.invoke(call, &policy).await
    }

    /// Invoke `call` under `policy`.
    ///
    /// Transient failures (network, timeout, unavailable) are retried up to
    /// `policy.max_retries` times; anything else is returned on the spot.
    pub async fn invoke(&self, call: &ToolCall, policy: &ToolPolicy) -> Result<Value, ToolError> {
        let started = Instant::now();

        let Some(adapter) = self.adapters.get(&call.tool_name).cloned() else {
            let error = ToolError::unknown_tool(&call.tool_name);
            self.record(call, 0, started, Some(&error));
            return Err(error);
        };

        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let outcome =
                match tokio::time::timeout(policy.timeout, adapter.invoke(&call.arguments)).await {
                    Ok(result) => {
                        result.and_then(|output| normalize_output(&call.tool_name, output))
                    }
                    Err(_) => Err(ToolError::timeout(&call.tool_name, policy.timeout)),
                };

            match outcome {
                Ok(output) => {
                    self.record(call, attempt, started, None);
                    return Ok(output);
                }
                Err(error) if error.is_transient() && attempt < policy.max_attempts() => {
                    let delay = policy.backoff_delay(attempt - 1);
                    debug!(
                        tool = %call.tool_name,
                        attempt,
                        max_attempts = policy.max_attempts(),
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "Transient tool failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(error) => {
                    warn!(
                        tool = %call.tool_name,
                        attempts = attempt,
                        error = %error,
                        "Tool invocation failed"
                    );
                    self.record(call, attempt, started, Some(&error));
                    return Err(error);
                }
            }
        }
    }

    /// Serialize `args`, invoke with the configured policy and decode the
    /// output into `R`. An output that does not decode is a permanent
    /// `MalformedOutput` failure.
    pub async fn invoke_typed<A, R>(&self, tool: &str, args: &A) -> Result<R, ToolError>
    where
        A: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let arguments =
            serde_json::to_value(args).map_err(|e| ToolError::invalid_input(tool, e.to_string()))?;
        let output = self.call(&ToolCall::new(tool, arguments)).await?;
        serde_json::from_value(output).map_err(|e| ToolError::malformed_output(tool, e.to_string()))
    }

    fn record(&self, call: &ToolCall, attempts: u32, started: Instant, error: Option<&ToolError>) {
        let invocation = ToolInvocation {
            tool_name: call.tool_name.clone(),
            attempts,
            duration_ms: started.elapsed().as_millis() as u64,
            error: error.cloned(),
        };

        if invocation.is_success() {
            info!(
                tool = %invocation.tool_name,
                attempts = invocation.attempts,
                duration_ms = invocation.duration_ms,
                "Tool call succeeded"
            );
        }

        self.logger.log(RunEvent::new(
            "tool_call",
            json!({
                "tool": invocation.tool_name,
                "attempts": invocation.attempts,
                "duration_ms": invocation.duration_ms,
                "success": invocation.is_success(),
                "error": error.map(|e| e.to_string()),
                "error_kind": error.map(|e| e.kind.as_str()),
            }),
        ));

        if let Ok(mut list) = self.invocations.lock() {
            if list.len() == INVOCATION_HISTORY_LIMIT {
                list.pop_front();
            }
            list.push_back(invocation);
        }
    }
}

/// Accept a JSON object, or text holding one (optionally fenced).
fn normalize_output(tool: &str, output: Value) -> Result<Value, ToolError> {
    match output {
        Value::Object(_) => Ok(output),
        Value::String(text) => match parse_json_text(&text) {
            Some(parsed @ Value::Object(_)) => Ok(parsed),
            _ => Err(ToolError::malformed_output(
                tool,
                "output text is not a JSON object",
            )),
        },
        other => Err(ToolError::malformed_output(
            tool,
            format!("expected a JSON object, got {}", json_type(&other)),
        )),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
