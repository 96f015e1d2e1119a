//! Run parameters: deadline, per-tool policy, worker instructions.
//!
//! [`RunParams`] groups the static knobs of one intake run. They are
//! application-layer concerns: the domain knows what a [`ToolPolicy`] is,
//! not which one a given tool gets.

use crew_domain::{InstructionSet, ToolPolicy};
use std::collections::HashMap;
use std::time::Duration;

/// Parameters controlling a single run.
#[derive(Debug, Clone)]
pub struct RunParams {
    /// Upper bound on the Collecting phase
    pub deadline: Duration,
    /// Policy for any tool without an override
    pub default_policy: ToolPolicy,
    /// Per-tool overrides, keyed by tool name
    pub tool_policies: HashMap<String, ToolPolicy>,
    /// Instruction templates expanded before dispatch
    pub instructions: InstructionSet,
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            deadline: Duration::from_secs(120),
            default_policy: ToolPolicy::default(),
            tool_policies: HashMap::new(),
            instructions: InstructionSet::default(),
        }
    }
}

impl RunParams {
    /// Policy the gateway applies to `tool`.
    pub fn policy_for(&self, tool: &str) -> ToolPolicy {
        self.tool_policies
            .get(tool)
            .copied()
            .unwrap_or(self.default_policy)
    }

    // ==================== Builder Methods ====================

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_default_policy(mut self, policy: ToolPolicy) -> Self {
        self.default_policy = policy;
        self
    }

    pub fn with_tool_policy(mut self, tool: impl Into<String>, policy: ToolPolicy) -> Self {
        self.tool_policies.insert(tool.into(), policy);
        self
    }

    pub fn with_instructions(mut self, instructions: InstructionSet) -> Self {
        self.instructions = instructions;
        self
    }
}
