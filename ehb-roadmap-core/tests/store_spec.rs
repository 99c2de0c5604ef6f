use std::sync::{Arc, Mutex};

use ehb_roadmap_core::models::*;
use ehb_roadmap_core::store::{Action, Store};
use speculate2::speculate;
use uuid::Uuid;

/// Dispatch an `add_agent` and return the new agent's id.
fn add_agent(store: &Store, name: &str) -> Uuid {
    let action = Action::add_agent(name, "support");
    let Action::AddAgent { id, .. } = &action else {
        unreachable!()
    };
    let id = *id;
    store.dispatch(action);
    id
}

/// Dispatch an `add_task` and return the new task's id.
fn add_task(store: &Store, agent_id: Uuid, title: &str) -> Uuid {
    let action = Action::add_task(agent_id, title);
    let Action::AddTask { id, .. } = &action else {
        unreachable!()
    };
    let id = *id;
    store.dispatch(action);
    id
}

fn task_status(store: &Store, task_id: Uuid) -> AgentTaskStatus {
    store
        .state()
        .tasks
        .iter()
        .find(|t| t.id == task_id)
        .map(|t| t.status)
        .expect("task exists")
}

speculate! {
    before {
        let store = Store::new();
        let ava = add_agent(&store, "Ava");
    }

    describe "task queue" {
        it "runs tasks one at a time in the order they were queued" {
            let first = add_task(&store, ava, "Verify documents");
            let second = add_task(&store, ava, "Approve franchise");

            store.dispatch(Action::StartNextTask { agent_id: ava });
            store.dispatch(Action::StartNextTask { agent_id: ava });

            assert_eq!(task_status(&store, first), AgentTaskStatus::Running);
            assert_eq!(task_status(&store, second), AgentTaskStatus::Pending);
            assert_eq!(store.state().agent(ava).map(|a| a.status), Some(AgentStatus::Busy));

            store.dispatch(Action::UpdateTaskStatus { task_id: first, status: AgentTaskStatus::Completed });
            assert_eq!(store.state().agent(ava).map(|a| a.status), Some(AgentStatus::Idle));

            store.dispatch(Action::StartNextTask { agent_id: ava });
            assert_eq!(task_status(&store, second), AgentTaskStatus::Running);
        }

        it "keeps each agent's queue separate" {
            let bo = add_agent(&store, "Bo");
            let ava_task = add_task(&store, ava, "Review listing");
            let bo_task = add_task(&store, bo, "Answer ticket");

            store.dispatch(Action::StartNextTask { agent_id: ava });
            store.dispatch(Action::StartNextTask { agent_id: bo });

            assert_eq!(task_status(&store, ava_task), AgentTaskStatus::Running);
            assert_eq!(task_status(&store, bo_task), AgentTaskStatus::Running);
        }

        it "does not start work for an offline agent" {
            let task = add_task(&store, ava, "Review listing");
            store.dispatch(Action::SetAgentStatus { agent_id: ava, status: AgentStatus::Offline });

            store.dispatch(Action::StartNextTask { agent_id: ava });

            assert_eq!(task_status(&store, task), AgentTaskStatus::Pending);
        }

        it "returns the agent to idle when its task fails" {
            let task = add_task(&store, ava, "Sync ledger");
            store.dispatch(Action::StartNextTask { agent_id: ava });

            let state = store.dispatch(Action::UpdateTaskStatus { task_id: task, status: AgentTaskStatus::Failed });

            assert_eq!(state.agent(ava).map(|a| a.status), Some(AgentStatus::Idle));
            assert!(state.running_task(ava).is_none());
        }
    }

    describe "conversations" {
        it "records messages per agent" {
            let bo = add_agent(&store, "Bo");
            store.dispatch(Action::send_message(ava, MessageAuthor::User, "Hello Ava"));
            store.dispatch(Action::send_message(bo, MessageAuthor::User, "Hello Bo"));

            let state = store.state();
            let ava_messages: Vec<&str> = state.messages_for(ava).map(|m| m.content.as_str()).collect();
            assert_eq!(ava_messages, vec!["Hello Ava"]);
        }

        it "drops an agent's messages and tasks when it is removed" {
            store.dispatch(Action::SelectAgent { agent_id: Some(ava) });
            store.dispatch(Action::send_message(ava, MessageAuthor::Agent, "On it"));
            add_task(&store, ava, "Review listing");

            let state = store.dispatch(Action::RemoveAgent { agent_id: ava });

            assert!(state.agents.is_empty());
            assert!(state.messages.is_empty());
            assert!(state.tasks.is_empty());
            assert!(state.selected_agent.is_none());
        }
    }

    describe "observers" {
        it "see every dispatch in subscription order" {
            let log = Arc::new(Mutex::new(Vec::new()));

            let first_log = log.clone();
            store.subscribe(move |state| first_log.lock().unwrap().push(("first", state.tasks.len())));
            let second_log = log.clone();
            store.subscribe(move |state| second_log.lock().unwrap().push(("second", state.tasks.len())));

            add_task(&store, ava, "Review listing");

            assert_eq!(*log.lock().unwrap(), vec![("first", 1), ("second", 1)]);
        }

        it "stop after unsubscribing" {
            let calls = Arc::new(Mutex::new(0));
            let counter = calls.clone();
            let id = store.subscribe(move |_| *counter.lock().unwrap() += 1);

            store.dispatch(Action::Reset);
            assert!(store.unsubscribe(id));
            store.dispatch(Action::Reset);

            assert_eq!(*calls.lock().unwrap(), 1);
            assert!(!store.unsubscribe(id));
        }

        it "share state across store clones" {
            let handle = store.clone();

            handle.dispatch(Action::Reset);

            assert!(store.state().agents.is_empty());
        }
    }
}
