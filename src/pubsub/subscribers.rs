//! Observer registry keyed by subscription id.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::sim::types::Snapshot;

/// Callback invoked with each published snapshot.
pub type SnapshotCallback = Arc<dyn Fn(Arc<Snapshot>) + Send + Sync>;

/// Identity of one registration. Ids increase monotonically, so id order is
/// registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Ordered set of active subscriber callbacks.
#[derive(Default)]
pub(crate) struct SubscriberRegistry {
    next_id: u64,
    entries: BTreeMap<SubscriptionId, SnapshotCallback>,
}

impl SubscriberRegistry {
    /// Registers a callback and returns its fresh id.
    pub(crate) fn insert(&mut self, callback: SnapshotCallback) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.entries.insert(id, callback);
        id
    }

    /// Removes a registration. Returns `false` if it was already gone.
    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        self.entries.remove(&id).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy of the current registrations in registration order.
    ///
    /// Fan-out iterates this copy so callbacks may subscribe or unsubscribe
    /// while it runs.
    pub(crate) fn to_vec(&self) -> Vec<(SubscriptionId, SnapshotCallback)> {
        self.entries
            .iter()
            .map(|(id, cb)| (*id, Arc::clone(cb)))
            .collect()
    }
}
