use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reserved metadata key carrying the orchestration layer's persisted agent
/// state. The store never interprets the value behind it.
pub const AGENT_STATE_KEY: &str = "agentState";

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Submitted,
    Working,
    Completed,
    Failed,
    Canceled,
}

/// A unit of agent execution: id, lifecycle status, context id, and an
/// opaque metadata mapping. The working directory for a task is not stored
/// here; it is resolved from the id via [`crate::workspace::WorkspaceLayout`].
#[derive(Debug, Clone)]
pub struct Task {
    pub id: String,
    pub context_id: String,
    pub status: TaskStatus,
    pub metadata: BTreeMap<String, Value>,
}

impl Task {
    pub fn new(id: impl Into<String>, context_id: impl Into<String>, status: TaskStatus) -> Self {
        Self {
            id: id.into(),
            context_id: context_id.into(),
            status,
            metadata: BTreeMap::new(),
        }
    }

    /// The persisted agent state, if one has been attached.
    pub fn persisted_state(&self) -> Option<&Value> {
        self.metadata.get(AGENT_STATE_KEY)
    }

    /// Attach (or replace) the persisted agent state under the reserved key.
    pub fn with_persisted_state(mut self, state: Value) -> Self {
        self.metadata.insert(AGENT_STATE_KEY.to_string(), state);
        self
    }
}
