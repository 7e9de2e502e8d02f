use super::ExecutionContext;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::fmt;
use uuid::Uuid;

/// Lifecycle state of a process instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessStatus {
    Running,
    Suspended,
    Completed,
    Terminated,
}

impl ProcessStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProcessStatus::Completed | ProcessStatus::Terminated)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessStatus::Running => "RUNNING",
            ProcessStatus::Suspended => "SUSPENDED",
            ProcessStatus::Completed => "COMPLETED",
            ProcessStatus::Terminated => "TERMINATED",
        }
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A condition that could not be evaluated while routing out of a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionFailure {
    pub from: String,
    pub to: String,
    pub condition: String,
    pub error: String,
}

/// One live execution of a flowchart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessInstance {
    pub id: String,
    pub definition_id: String,
    pub business_key: Option<String>,
    pub status: ProcessStatus,
    pub current_node_id: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub start_user_id: Option<String>,
    pub context: ExecutionContext,

    // Audit
    pub failure_reason: Option<String>,
    pub condition_errors: Vec<ConditionFailure>,
}

impl ProcessInstance {
    /// Creates a RUNNING instance with a fresh id and an empty context.
    pub fn new(definition_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            definition_id: definition_id.into(),
            business_key: None,
            status: ProcessStatus::Running,
            current_node_id: None,
            start_time: Utc::now(),
            end_time: None,
            start_user_id: None,
            context: ExecutionContext::new(),
            failure_reason: None,
            condition_errors: Vec::new(),
        }
    }

    pub fn with_business_key(mut self, business_key: impl Into<String>) -> Self {
        self.business_key = Some(business_key.into());
        self
    }

    pub fn with_start_user(mut self, user_id: impl Into<String>) -> Self {
        self.start_user_id = Some(user_id.into());
        self
    }

    pub fn with_variables(mut self, variables: Map<String, JsonValue>) -> Self {
        self.context.extend(variables);
        self
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }

    pub(crate) fn mark_running(&mut self) {
        self.status = ProcessStatus::Running;
        self.failure_reason = None;
    }

    pub(crate) fn mark_suspended(&mut self, reason: Option<String>) {
        self.status = ProcessStatus::Suspended;
        self.failure_reason = reason;
    }

    pub(crate) fn mark_completed(&mut self) {
        self.status = ProcessStatus::Completed;
        self.end_time = Some(Utc::now());
    }

    pub(crate) fn mark_terminated(&mut self, reason: Option<String>) {
        self.status = ProcessStatus::Terminated;
        self.end_time = Some(Utc::now());
        if reason.is_some() {
            self.failure_reason = reason;
        }
    }
}
