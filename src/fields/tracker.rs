use std::collections::HashMap;
use std::fmt;

use crate::dom::{Document, NodeId};
use crate::fields::descriptor::Cleanup;

/// Side table from element identity to the cleanup of its latest mount.
///
/// Keys are plain `NodeId`s, so the table never keeps a node alive. Entries
/// are erased when the watcher reports the element's removal.
#[derive(Default)]
pub struct LifecycleTracker {
    cleanups: HashMap<NodeId, Cleanup>,
}

impl LifecycleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `cleanup` for `element`, replacing any earlier one. The earlier
    /// cleanup is dropped without running.
    pub fn track(&mut self, element: NodeId, cleanup: Cleanup) {
        if self.cleanups.insert(element, cleanup).is_some() {
            tracing::debug!(
                "Replaced cleanup for {} without running the previous one",
                element
            );
        }
    }

    /// Run and forget the cleanup recorded for `element`, if any
    pub fn consume_and_run(&mut self, document: &mut Document, element: NodeId) -> bool {
        match self.cleanups.remove(&element) {
            Some(cleanup) => {
                cleanup(document);
                tracing::trace!("Cleaned up {}", element);
                true
            }
            None => false,
        }
    }

    pub fn is_tracking(&self, element: NodeId) -> bool {
        self.cleanups.contains_key(&element)
    }

    pub fn len(&self) -> usize {
        self.cleanups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cleanups.is_empty()
    }
}

impl fmt::Debug for LifecycleTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleTracker")
            .field("tracked", &self.cleanups.keys().collect::<Vec<_>>())
            .finish()
    }
}
