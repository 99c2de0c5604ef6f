//! Reducer-driven state store for agents, their messages and task queues.
//!
//! The state is an explicit [`AgentState`] value; every change goes through
//! the pure [`reduce`] function. [`Store`] is the shared handle the server
//! holds: it applies dispatched actions and notifies subscribed observers
//! in subscription order.

mod reducer;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

pub use reducer::*;

/// Callback invoked with the new state after every dispatch.
pub type Observer = Arc<dyn Fn(&AgentState) + Send + Sync>;

/// Handle returned by [`Store::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Shared, cloneable store handle. Clones see the same state.
#[derive(Clone, Default)]
pub struct Store {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    /// Held from reduce through notification so observers see dispatches in commit order.
    dispatch: Mutex<()>,
    state: Mutex<AgentState>,
    observers: Mutex<Vec<(SubscriptionId, Observer)>>,
    next_subscription: AtomicU64,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: AgentState) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(state),
                ..Default::default()
            }),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> AgentState {
        self.inner
            .state
            .lock()
            .expect("store lock poisoned")
            .clone()
    }

    /// Apply `action` and return the resulting state.
    ///
    /// Concurrent dispatches are applied and announced one at a time, so the
    /// last state an observer sees is the store's current state. Observers
    /// run after the state lock is released and may read the store, but must
    /// not dispatch from inside the callback.
    pub fn dispatch(&self, action: Action) -> AgentState {
        let _serial = self.inner.dispatch.lock().expect("store lock poisoned");

        let next = {
            let mut state = self.inner.state.lock().expect("store lock poisoned");
            let next = reduce(&state, action);
            if next == *state {
                tracing::debug!("Store action left state unchanged");
            }
            *state = next.clone();
            next
        };

        let observers: Vec<Observer> = self
            .inner
            .observers
            .lock()
            .expect("store lock poisoned")
            .iter()
            .map(|(_, observer)| observer.clone())
            .collect();

        for observer in observers {
            observer(&next);
        }

        next
    }

    pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&AgentState) + Send + Sync + 'static,
    {
        let id = SubscriptionId(
            self.inner
                .next_subscription
                .fetch_add(1, Ordering::Relaxed),
        );
        self.inner
            .observers
            .lock()
            .expect("store lock poisoned")
            .push((id, Arc::new(observer)));
        id
    }

    /// Returns false if the subscription was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self.inner.observers.lock().expect("store lock poisoned");
        let before = observers.len();
        observers.retain(|(sid, _)| *sid != id);
        observers.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn clones_share_state() {
        let store = Store::new();
        let other = store.clone();
        store.dispatch(Action::add_agent("Tutor", "e-learning"));
        assert_eq!(other.state().agents.len(), 1);
    }

    #[test]
    fn observers_see_every_dispatch_in_subscription_order() {
        let store = Store::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let first = log.clone();
        store.subscribe(move |s| first.lock().unwrap().push(("first", s.agents.len())));
        let second = log.clone();
        store.subscribe(move |s| second.lock().unwrap().push(("second", s.agents.len())));

        store.dispatch(Action::add_agent("Tutor", "e-learning"));

        assert_eq!(
            *log.lock().unwrap(),
            vec![("first", 1), ("second", 1)]
        );
    }

    #[test]
    fn unsubscribed_observers_stop_receiving_updates() {
        let store = Store::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let id = store.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        store.dispatch(Action::Reset);
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.dispatch(Action::Reset);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn concurrent_dispatches_notify_in_commit_order() {
        for _ in 0..20 {
            let store = Store::new();
            let last_seen = Arc::new(AtomicUsize::new(0));
            let seen = last_seen.clone();
            store.subscribe(move |s| seen.store(s.agents.len(), Ordering::SeqCst));

            let workers: Vec<_> = (0..8)
                .map(|_| {
                    let store = store.clone();
                    std::thread::spawn(move || {
                        for _ in 0..50 {
                            store.dispatch(Action::add_agent("Tutor", "e-learning"));
                        }
                    })
                })
                .collect();
            for worker in workers {
                worker.join().unwrap();
            }

            assert_eq!(store.state().agents.len(), 400);
            assert_eq!(last_seen.load(Ordering::SeqCst), 400);
        }
    }

    #[test]
    fn observers_may_read_the_store() {
        let store = Store::new();
        let reader = store.clone();
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_in = seen.clone();
        store.subscribe(move |_| {
            seen_in.store(reader.state().agents.len(), Ordering::SeqCst);
        });

        store.dispatch(Action::add_agent("Tutor", "e-learning"));
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }
}
