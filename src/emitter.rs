//! Scoped event emitter.
//!
//! Listeners subscribe either globally to an event or to an event within a
//! scope (usually an entity id). Emitting with a scope fires the scoped
//! listeners for that scope *and* every global listener; emitting without
//! a scope fires only the global listeners.
//!
//! Listeners may subscribe or unsubscribe while an emit is in flight: the
//! listener list is snapshotted before dispatch.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::hash::Hash;
use std::rc::Rc;

/// Subscription key: an event, optionally narrowed to a scope.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SubscriptionKey<K> {
    Global(K),
    Scoped(K, String),
}

impl<K> SubscriptionKey<K> {
    pub fn new(event: K, scope: Option<&str>) -> Self {
        match scope {
            Some(scope) => Self::Scoped(event, scope.to_string()),
            None => Self::Global(event),
        }
    }
}

/// Handle returned by [`Emitter::on`], used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

type Listener<P> = Rc<dyn Fn(&P)>;

/// Publish/subscribe hub keyed by event and optional scope.
pub struct Emitter<K, P> {
    listeners: RefCell<HashMap<SubscriptionKey<K>, Vec<(ListenerId, Listener<P>)>>>,
    next_id: Cell<u64>,
}

impl<K, P> Default for Emitter<K, P>
where
    K: Clone + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, P> Emitter<K, P>
where
    K: Clone + Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            listeners: RefCell::new(HashMap::new()),
            next_id: Cell::new(0),
        }
    }

    /// Subscribe to `event`, globally or within `scope`.
    pub fn on(&self, event: K, scope: Option<&str>, listener: impl Fn(&P) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);

        self.listeners
            .borrow_mut()
            .entry(SubscriptionKey::new(event, scope))
            .or_default()
            .push((id, Rc::new(listener)));
        id
    }

    /// Remove a listener. Returns false if it was already gone.
    pub fn off(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let mut removed = false;
        listeners.retain(|_, entries| {
            let before = entries.len();
            entries.retain(|(entry_id, _)| *entry_id != id);
            removed |= entries.len() != before;
            !entries.is_empty()
        });
        removed
    }

    /// Fire `event`. Scoped listeners for `scope` run first, then globals.
    pub fn emit(&self, event: K, payload: &P, scope: Option<&str>) {
        let targets: Vec<Listener<P>> = {
            let listeners = self.listeners.borrow();
            let scoped = scope
                .and_then(|scope| listeners.get(&SubscriptionKey::Scoped(event.clone(), scope.to_string())))
                .into_iter()
                .flatten();
            let global = listeners.get(&SubscriptionKey::Global(event)).into_iter().flatten();
            scoped.chain(global).map(|(_, listener)| listener.clone()).collect()
        };

        for listener in targets {
            listener(payload);
        }
    }

    /// Number of live listeners across all keys.
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().values().map(Vec::len).sum()
    }

    pub fn clear(&self) {
        self.listeners.borrow_mut().clear();
    }
}
