use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::*;

/// Everything the agent console renders.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AgentState {
    pub agents: Vec<Agent>,
    pub messages: Vec<Message>,
    /// Insertion order is queue order.
    pub tasks: Vec<AgentTask>,
    pub selected_agent: Option<Uuid>,
}

impl AgentState {
    pub fn agent(&self, id: Uuid) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }

    pub fn messages_for(&self, agent_id: Uuid) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(move |m| m.agent_id == agent_id)
    }

    pub fn tasks_for(&self, agent_id: Uuid) -> impl Iterator<Item = &AgentTask> {
        self.tasks.iter().filter(move |t| t.agent_id == agent_id)
    }

    /// The task currently occupying the agent, if any.
    pub fn running_task(&self, agent_id: Uuid) -> Option<&AgentTask> {
        self.tasks_for(agent_id)
            .find(|t| t.status == AgentTaskStatus::Running)
    }

    fn agent_mut(&mut self, id: Uuid) -> Option<&mut Agent> {
        self.agents.iter_mut().find(|a| a.id == id)
    }
}

/// A state transition request.
///
/// Ids and timestamps travel inside the action so that [`reduce`] stays pure;
/// when an action is deserialized without them, fresh values are filled in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    AddAgent {
        #[serde(default = "Uuid::new_v4")]
        id: Uuid,
        name: String,
        role: String,
        #[serde(default = "Utc::now")]
        created_at: DateTime<Utc>,
    },
    RemoveAgent {
        agent_id: Uuid,
    },
    SetAgentStatus {
        agent_id: Uuid,
        status: AgentStatus,
    },
    /// `None` clears the selection.
    SelectAgent {
        agent_id: Option<Uuid>,
    },
    SendMessage {
        #[serde(default = "Uuid::new_v4")]
        id: Uuid,
        agent_id: Uuid,
        author: MessageAuthor,
        content: String,
        #[serde(default = "Utc::now")]
        created_at: DateTime<Utc>,
    },
    /// `None` clears every conversation.
    ClearMessages {
        #[serde(default)]
        agent_id: Option<Uuid>,
    },
    AddTask {
        #[serde(default = "Uuid::new_v4")]
        id: Uuid,
        agent_id: Uuid,
        title: String,
        #[serde(default = "Utc::now")]
        created_at: DateTime<Utc>,
    },
    /// Start the agent's oldest pending task, unless one is already running.
    StartNextTask {
        agent_id: Uuid,
    },
    UpdateTaskStatus {
        task_id: Uuid,
        status: AgentTaskStatus,
    },
    Reset,
}

impl Action {
    pub fn add_agent(name: impl Into<String>, role: impl Into<String>) -> Self {
        Self::AddAgent {
            id: Uuid::new_v4(),
            name: name.into(),
            role: role.into(),
            created_at: Utc::now(),
        }
    }

    pub fn send_message(agent_id: Uuid, author: MessageAuthor, content: impl Into<String>) -> Self {
        Self::SendMessage {
            id: Uuid::new_v4(),
            agent_id,
            author,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn add_task(agent_id: Uuid, title: impl Into<String>) -> Self {
        Self::AddTask {
            id: Uuid::new_v4(),
            agent_id,
            title: title.into(),
            created_at: Utc::now(),
        }
    }
}

/// Pure transition function: the next state for `action` applied to `state`.
///
/// Actions that reference unknown agents or tasks, or that would break the
/// one-running-task-per-agent rule, return the state unchanged.
pub fn reduce(state: &AgentState, action: Action) -> AgentState {
    let mut next = state.clone();
    apply(&mut next, action);
    next
}

fn apply(state: &mut AgentState, action: Action) {
    match action {
        Action::AddAgent {
            id,
            name,
            role,
            created_at,
        } => {
            if state.agent(id).is_none() {
                state.agents.push(Agent {
                    id,
                    name,
                    role,
                    status: AgentStatus::Idle,
                    created_at,
                });
            }
        }
        Action::RemoveAgent { agent_id } => {
            state.agents.retain(|a| a.id != agent_id);
            state.messages.retain(|m| m.agent_id != agent_id);
            state.tasks.retain(|t| t.agent_id != agent_id);
            if state.selected_agent == Some(agent_id) {
                state.selected_agent = None;
            }
        }
        Action::SetAgentStatus { agent_id, status } => {
            if let Some(agent) = state.agent_mut(agent_id) {
                agent.status = status;
            }
        }
        Action::SelectAgent { agent_id } => match agent_id {
            Some(id) if state.agent(id).is_none() => {}
            _ => state.selected_agent = agent_id,
        },
        Action::SendMessage {
            id,
            agent_id,
            author,
            content,
            created_at,
        } => {
            if state.agent(agent_id).is_some() {
                state.messages.push(Message {
                    id,
                    agent_id,
                    author,
                    content,
                    created_at,
                });
            }
        }
        Action::ClearMessages { agent_id } => match agent_id {
            Some(id) => state.messages.retain(|m| m.agent_id != id),
            None => state.messages.clear(),
        },
        Action::AddTask {
            id,
            agent_id,
            title,
            created_at,
        } => {
            if state.agent(agent_id).is_some() && !state.tasks.iter().any(|t| t.id == id) {
                state.tasks.push(AgentTask {
                    id,
                    agent_id,
                    title,
                    status: AgentTaskStatus::Pending,
                    created_at,
                });
            }
        }
        Action::StartNextTask { agent_id } => start_next_task(state, agent_id),
        Action::UpdateTaskStatus { task_id, status } => update_task_status(state, task_id, status),
        Action::Reset => *state = AgentState::default(),
    }
}

fn start_next_task(state: &mut AgentState, agent_id: Uuid) {
    let available = state
        .agent(agent_id)
        .is_some_and(|a| a.status != AgentStatus::Offline);
    if !available || state.running_task(agent_id).is_some() {
        return;
    }

    let Some(task) = state
        .tasks
        .iter_mut()
        .find(|t| t.agent_id == agent_id && t.status == AgentTaskStatus::Pending)
    else {
        return;
    };
    task.status = AgentTaskStatus::Running;

    if let Some(agent) = state.agent_mut(agent_id) {
        agent.status = AgentStatus::Busy;
    }
}

fn update_task_status(state: &mut AgentState, task_id: Uuid, status: AgentTaskStatus) {
    let Some(task) = state.tasks.iter().find(|t| t.id == task_id) else {
        return;
    };
    let agent_id = task.agent_id;

    if status == AgentTaskStatus::Running {
        let other_running = state
            .running_task(agent_id)
            .is_some_and(|running| running.id != task_id);
        if other_running {
            return;
        }
    }

    if let Some(task) = state.tasks.iter_mut().find(|t| t.id == task_id) {
        task.status = status;
    }

    let busy = state.running_task(agent_id).is_some();
    if let Some(agent) = state.agent_mut(agent_id) {
        if agent.status != AgentStatus::Offline {
            agent.status = if busy {
                AgentStatus::Busy
            } else {
                AgentStatus::Idle
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_agent() -> (AgentState, Uuid) {
        let action = Action::add_agent("Franchise Bot", "franchise onboarding");
        let id = match &action {
            Action::AddAgent { id, .. } => *id,
            _ => unreachable!(),
        };
        (reduce(&AgentState::default(), action), id)
    }

    fn task_ids(state: &AgentState) -> Vec<Uuid> {
        state.tasks.iter().map(|t| t.id).collect()
    }

    #[test]
    fn add_agent_starts_idle() {
        let (state, id) = with_agent();
        let agent = state.agent(id).unwrap();
        assert_eq!(agent.status, AgentStatus::Idle);
        assert_eq!(agent.name, "Franchise Bot");
    }

    #[test]
    fn reduce_does_not_touch_the_input_state() {
        let (state, id) = with_agent();
        let before = state.clone();
        let _ = reduce(&state, Action::RemoveAgent { agent_id: id });
        assert_eq!(state, before);
    }

    #[test]
    fn messages_for_unknown_agents_are_dropped() {
        let (state, _) = with_agent();
        let next = reduce(
            &state,
            Action::send_message(Uuid::new_v4(), MessageAuthor::User, "hello"),
        );
        assert_eq!(next, state);
    }

    #[test]
    fn removing_an_agent_removes_its_conversation_and_selection() {
        let (state, id) = with_agent();
        let state = reduce(&state, Action::send_message(id, MessageAuthor::User, "hi"));
        let state = reduce(&state, Action::add_task(id, "Verify documents"));
        let state = reduce(&state, Action::SelectAgent { agent_id: Some(id) });

        let state = reduce(&state, Action::RemoveAgent { agent_id: id });

        assert!(state.agents.is_empty());
        assert!(state.messages.is_empty());
        assert!(state.tasks.is_empty());
        assert!(state.selected_agent.is_none());
    }

    #[test]
    fn selecting_an_unknown_agent_is_ignored() {
        let (state, _) = with_agent();
        let next = reduce(
            &state,
            Action::SelectAgent {
                agent_id: Some(Uuid::new_v4()),
            },
        );
        assert!(next.selected_agent.is_none());
    }

    #[test]
    fn tasks_start_one_at_a_time_in_fifo_order() {
        let (mut state, id) = with_agent();
        for title in ["first", "second", "third"] {
            state = reduce(&state, Action::add_task(id, title));
        }
        let ids = task_ids(&state);

        state = reduce(&state, Action::StartNextTask { agent_id: id });
        assert_eq!(state.running_task(id).unwrap().id, ids[0]);
        assert_eq!(state.agent(id).unwrap().status, AgentStatus::Busy);

        // Already running: no second task starts.
        let unchanged = reduce(&state, Action::StartNextTask { agent_id: id });
        assert_eq!(unchanged, state);

        state = reduce(
            &state,
            Action::UpdateTaskStatus {
                task_id: ids[0],
                status: AgentTaskStatus::Completed,
            },
        );
        assert_eq!(state.agent(id).unwrap().status, AgentStatus::Idle);

        state = reduce(&state, Action::StartNextTask { agent_id: id });
        assert_eq!(state.running_task(id).unwrap().id, ids[1]);
    }

    #[test]
    fn cannot_mark_a_second_task_running() {
        let (mut state, id) = with_agent();
        state = reduce(&state, Action::add_task(id, "first"));
        state = reduce(&state, Action::add_task(id, "second"));
        let ids = task_ids(&state);
        state = reduce(&state, Action::StartNextTask { agent_id: id });

        let next = reduce(
            &state,
            Action::UpdateTaskStatus {
                task_id: ids[1],
                status: AgentTaskStatus::Running,
            },
        );
        assert_eq!(next, state);
    }

    #[test]
    fn offline_agents_do_not_start_tasks() {
        let (mut state, id) = with_agent();
        state = reduce(&state, Action::add_task(id, "first"));
        state = reduce(
            &state,
            Action::SetAgentStatus {
                agent_id: id,
                status: AgentStatus::Offline,
            },
        );
        let next = reduce(&state, Action::StartNextTask { agent_id: id });
        assert_eq!(next.tasks[0].status, AgentTaskStatus::Pending);
    }

    #[test]
    fn actions_deserialize_with_generated_ids() {
        let action: Action =
            serde_json::from_str(r#"{"type":"add_agent","name":"Tutor","role":"e-learning"}"#)
                .unwrap();
        let state = reduce(&AgentState::default(), action);
        assert_eq!(state.agents.len(), 1);
        assert_eq!(state.agents[0].role, "e-learning");
    }

    #[test]
    fn reset_clears_everything() {
        let (state, _) = with_agent();
        assert_eq!(reduce(&state, Action::Reset), AgentState::default());
    }
}
