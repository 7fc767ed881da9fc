use std::collections::HashSet;

use crate::dom::{Document, DomResult, MutationBatch, NodeId, ObserverId};
use crate::fields::registry::{mount_field_on_node, FieldRegistry};
use crate::fields::tracker::LifecycleTracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    Unobserved,
    Observing,
}

/// Counts from processing one or more batches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub batches: usize,
    pub cleaned: usize,
    pub mounted: usize,
}

impl BatchOutcome {
    pub fn merge(&mut self, other: BatchOutcome) {
        self.batches += other.batches;
        self.cleaned += other.cleaned;
        self.mounted += other.mounted;
    }
}

#[derive(Debug, Clone, Copy)]
struct Subscription {
    id: ObserverId,
    root: NodeId,
}

/// Drives mount and cleanup from the structural changes of one subtree
#[derive(Debug)]
pub struct TreeChangeWatcher {
    subscription: Option<Subscription>,
}

impl TreeChangeWatcher {
    pub fn new() -> Self {
        Self { subscription: None }
    }

    pub fn state(&self) -> WatcherState {
        match self.subscription {
            Some(_) => WatcherState::Observing,
            None => WatcherState::Unobserved,
        }
    }

    pub fn root(&self) -> Option<NodeId> {
        self.subscription.map(|subscription| subscription.root)
    }

    /// Subscribe to `root`. Re-observing replaces the previous subscription;
    /// its queued records are dropped.
    pub fn observe(&mut self, document: &mut Document, root: NodeId) -> DomResult<()> {
        if let Some(previous) = self.subscription.take() {
            document.disconnect(previous.id);
        }
        let id = document.observe(root)?;
        self.subscription = Some(Subscription { id, root });
        Ok(())
    }

    /// Drain queued records into one batch, if there are any
    pub fn take_batch(&self, document: &mut Document) -> Option<MutationBatch> {
        let subscription = self.subscription?;
        let batch = MutationBatch::from_records(document.take_records(subscription.id));
        (!batch.is_empty()).then_some(batch)
    }

    /// Whether records are queued that no batch has picked up yet
    pub fn has_pending_records(&self, document: &Document) -> bool {
        self.subscription
            .is_some_and(|subscription| document.has_pending_records(subscription.id))
    }

    /// Unsubscribe. Records queued before the call are still processed.
    pub fn stop(
        &mut self,
        document: &mut Document,
        registry: &FieldRegistry,
        tracker: &mut LifecycleTracker,
    ) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        if let Some(batch) = self.take_batch(document) {
            outcome = self.handle(document, registry, tracker, batch);
        }
        if let Some(subscription) = self.subscription.take() {
            document.disconnect(subscription.id);
            tracing::debug!("Stopped observing {}", subscription.root);
        }
        outcome
    }

    /// Process one batch: every removal first, then every addition.
    ///
    /// Removals are cleaned from the subtrees captured when they were detached,
    /// so nodes moved out of a removed container later in the batch are still
    /// cleaned. Added nodes are expanded to their current subtrees; one that is
    /// no longer under the observed root is not mounted.
    pub fn handle(
        &self,
        document: &mut Document,
        registry: &FieldRegistry,
        tracker: &mut LifecycleTracker,
        batch: MutationBatch,
    ) -> BatchOutcome {
        let root = self.root().unwrap_or_else(|| document.root());
        let mut outcome = BatchOutcome {
            batches: 1,
            ..BatchOutcome::default()
        };

        let removed = unique_elements(document, batch.removed_subtree.iter().copied());
        for element in removed {
            if tracker.consume_and_run(document, element) {
                outcome.cleaned += 1;
            }
        }

        let expanded: Vec<NodeId> = batch
            .added
            .iter()
            .flat_map(|node| document.descendants(*node))
            .collect();
        let added = unique_elements(document, expanded);
        for descriptor in registry.descriptors() {
            let marker = registry.marker_for(descriptor);
            for &node in &added {
                if !document.has_attribute(node, &marker) || !document.contains(root, node) {
                    continue;
                }
                mount_field_on_node(descriptor, document, tracker, node);
                outcome.mounted += 1;
            }
        }

        tracing::debug!(
            "Processed mutation batch: {} removed, {} added, {} cleaned, {} mounted",
            batch.removed.len(),
            batch.added.len(),
            outcome.cleaned,
            outcome.mounted
        );
        outcome
    }
}

impl Default for TreeChangeWatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Live elements among `nodes`, each listed once, first occurrence wins
fn unique_elements(document: &Document, nodes: impl IntoIterator<Item = NodeId>) -> Vec<NodeId> {
    let mut seen = HashSet::new();
    nodes
        .into_iter()
        .filter(|node| document.is_element(*node))
        .filter(|node| seen.insert(*node))
        .collect()
}
