use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An assistant agent shown in the platform's agent console.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Agent {
    pub id: Uuid,
    pub name: String,
    /// What the agent is responsible for, e.g. "franchise onboarding".
    pub role: String,
    pub status: AgentStatus,
    pub created_at: DateTime<Utc>,
}

/// Availability of an agent.
///
/// - `Idle`: Available for the next task
/// - `Busy`: Running a task
/// - `Offline`: Not accepting work
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Idle,
    Busy,
    Offline,
}

impl AgentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Busy => "busy",
            Self::Offline => "offline",
        }
    }
}

/// A chat message in an agent conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: Uuid,
    pub agent_id: Uuid,
    pub author: MessageAuthor,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageAuthor {
    User,
    Agent,
    System,
}

/// A unit of work queued for an agent.
///
/// Tasks for one agent run one at a time, oldest first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentTask {
    pub id: Uuid,
    pub agent_id: Uuid,
    pub title: String,
    pub status: AgentTaskStatus,
    pub created_at: DateTime<Utc>,
}

/// The execution status of an agent task.
///
/// - `Pending`: Queued, not yet started
/// - `Running`: The agent is working on it
/// - `Completed`: Finished successfully
/// - `Failed`: Could not be completed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AgentTaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl AgentTaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Whether the task has stopped occupying its agent.
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}
