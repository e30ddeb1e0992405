//! Action types for resource lifecycle operations

use serde::{Deserialize, Serialize};

/// Lifecycle action performed on a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Create a new resource
    Create,
    /// Refresh declared state from the remote
    Read,
    /// Update an existing resource in place
    Update,
    /// Delete and recreate because an immutable attribute changed
    Replace,
    /// Delete a resource
    Delete,
    /// Adopt an existing remote resource
    Import,
    /// No changes needed
    NoOp,
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionType::Create => write!(f, "create"),
            ActionType::Read => write!(f, "read"),
            ActionType::Update => write!(f, "update"),
            ActionType::Replace => write!(f, "replace"),
            ActionType::Delete => write!(f, "delete"),
            ActionType::Import => write!(f, "import"),
            ActionType::NoOp => write!(f, "no-op"),
        }
    }
}

/// Result of a single action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResult {
    /// Action that ran
    pub action_type: ActionType,

    /// Resource address in the state document
    pub address: String,

    /// Remote identifier after the action, if the resource exists
    pub resource_id: Option<String>,

    /// Total execution time in milliseconds
    pub duration_ms: u64,
}

impl ActionResult {
    pub fn new(action_type: ActionType, address: impl Into<String>) -> Self {
        Self {
            action_type,
            address: address.into(),
            resource_id: None,
            duration_ms: 0,
        }
    }

    pub fn with_resource_id(mut self, id: Option<&str>) -> Self {
        self.resource_id = id.map(str::to_string);
        self
    }

    pub fn with_duration(mut self, started: std::time::Instant) -> Self {
        self.duration_ms = started.elapsed().as_millis() as u64;
        self
    }
}

impl std::fmt::Display for ActionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.address, self.action_type)?;
        if let Some(id) = &self.resource_id {
            write!(f, " (id: {})", id)?;
        }
        write!(f, " [{}ms]", self.duration_ms)
    }
}
