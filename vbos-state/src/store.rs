//! Observable state container.
//!
//! A [`Store`] owns one piece of view state and notifies subscribers after
//! every change. Clones share the same state, so a store can be handed to
//! any component that needs it through [`crate::state::AppState`].

use std::cell::RefCell;
use std::rc::Rc;

type Listener<S> = Rc<dyn Fn(&S)>;

/// Handle returned by [`Store::subscribe`].
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct SubscriptionId(u64);

struct Inner<S> {
    state: S,
    listeners: Vec<(SubscriptionId, Listener<S>)>,
    next_id: u64,
}

pub struct Store<S> {
    inner: Rc<RefCell<Inner<S>>>,
}

impl<S> Clone for Store<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S: Default + Clone + PartialEq> Default for Store<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S: Clone + PartialEq> Store<S> {
    pub fn new(state: S) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                state,
                listeners: Vec::new(),
                next_id: 0,
            })),
        }
    }

    /// A copy of the current state.
    pub fn get(&self) -> S {
        self.inner.borrow().state.clone()
    }

    /// Read the current state without copying it.
    pub fn with<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.inner.borrow().state)
    }

    /// Mutate the state and return what `f` returns. Subscribers run only
    /// if the state actually changed.
    pub fn update<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        self.modify(|state| {
            let before = state.clone();
            let result = f(state);
            let changed = *state != before;
            (result, changed)
        })
    }

    /// Like [`Store::update`], but `f` reports whether it changed the state,
    /// so large states are not copied to compare them. The state is only
    /// copied for subscribers, and only when there are any.
    ///
    /// Listeners are called after the borrow is released, so they may read
    /// or update this store themselves.
    pub fn modify<R>(&self, f: impl FnOnce(&mut S) -> (R, bool)) -> R {
        let (result, notify) = {
            let mut inner = self.inner.borrow_mut();
            let (result, changed) = f(&mut inner.state);
            if !changed || inner.listeners.is_empty() {
                (result, None)
            } else {
                let listeners: Vec<Listener<S>> =
                    inner.listeners.iter().map(|(_, l)| Rc::clone(l)).collect();
                (result, Some((inner.state.clone(), listeners)))
            }
        };
        if let Some((snapshot, listeners)) = notify {
            for listener in listeners {
                listener(&snapshot);
            }
        }
        result
    }

    pub fn set(&self, state: S) {
        self.update(|s| *s = state);
    }

    pub fn subscribe(&self, listener: impl Fn(&S) + 'static) -> SubscriptionId {
        let mut inner = self.inner.borrow_mut();
        let id = SubscriptionId(inner.next_id);
        inner.next_id += 1;
        inner.listeners.push((id, Rc::new(listener)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.listeners.len();
        inner.listeners.retain(|(sid, _)| *sid != id);
        inner.listeners.len() != before
    }
}
