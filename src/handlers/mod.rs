//! Observer callbacks
//!
//! Every registered callback carries a filter of node types. It is invoked for
//! an event on a node of type `t` when the filter is empty or contains `t`.
//! Callbacks run in registration order, synchronously, on the thread that
//! triggered the event, with no graph lock held: a callback may create or
//! delete nodes or register further callbacks. Registrations take effect for
//! events dispatched after they return.

use crate::aggregate::NodeRef;
use crate::value_objects::{CallbackId, CallbackKind};
use parking_lot::RwLock;
use std::collections::HashSet;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Called after a node has been created
pub type OnNodeCreateCallback<K, T> = dyn for<'n, 'g> Fn(&'n NodeRef<'g, K, T>) + Send + Sync;

/// Called before a node is destroyed; the node is still readable
pub type OnNodeDeleteCallback<K, T> = dyn for<'n, 'g> Fn(&'n NodeRef<'g, K, T>) + Send + Sync;

/// Called after a parameter of a node has been set or modified
pub type OnNodeParameterChangeCallback<K, T> =
    dyn for<'n, 'g, 'k> Fn(&'n NodeRef<'g, K, T>, &'k K) + Send + Sync;

/// A callback paired with the node types it listens to
pub struct FilteredCallback<T, F: ?Sized> {
    id: CallbackId,
    filter: HashSet<T>,
    func: Box<F>,
}

impl<T, F: ?Sized> FilteredCallback<T, F>
where
    T: Eq + Hash,
{
    pub fn new(id: CallbackId, func: Box<F>, filter: HashSet<T>) -> Self {
        Self { id, filter, func }
    }

    pub fn id(&self) -> CallbackId {
        self.id
    }

    pub fn filter(&self) -> &HashSet<T> {
        &self.filter
    }

    /// Whether an event on a node of `node_type` reaches this callback
    pub fn matches(&self, node_type: &T) -> bool {
        self.filter.is_empty() || self.filter.contains(node_type)
    }

    pub fn callback(&self) -> &F {
        &self.func
    }
}

/// Ordered list of filtered callbacks for one kind of event
pub struct CallbackRegistry<T, F: ?Sized> {
    kind: CallbackKind,
    next_serial: AtomicU64,
    entries: RwLock<Vec<Arc<FilteredCallback<T, F>>>>,
}

impl<T, F: ?Sized> CallbackRegistry<T, F>
where
    T: Eq + Hash,
{
    pub fn new(kind: CallbackKind) -> Self {
        Self {
            kind,
            next_serial: AtomicU64::new(0),
            entries: RwLock::new(Vec::new()),
        }
    }

    pub fn kind(&self) -> CallbackKind {
        self.kind
    }

    /// Append a callback; it is dispatched after all earlier registrations
    pub fn register(&self, func: Box<F>, filter: HashSet<T>) -> CallbackId {
        let serial = self.next_serial.fetch_add(1, Ordering::Relaxed);
        let id = CallbackId::new(self.kind, serial);
        self.entries
            .write()
            .push(Arc::new(FilteredCallback::new(id, func, filter)));
        id
    }

    /// Remove a callback, returning whether it was registered here
    pub fn unregister(&self, id: CallbackId) -> bool {
        if id.kind() != self.kind {
            return false;
        }
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|entry| entry.id() != id);
        entries.len() != before
    }

    /// Snapshot of the callbacks an event on `node_type` reaches, in
    /// registration order. The registry lock is released on return.
    pub fn matching(&self, node_type: &T) -> Vec<Arc<FilteredCallback<T, F>>> {
        self.entries
            .read()
            .iter()
            .filter(|entry| entry.matches(node_type))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
