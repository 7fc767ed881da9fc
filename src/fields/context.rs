use crate::config::FieldsConfig;
use crate::dom::{Document, DomResult, NodeId};
use crate::fields::descriptor::FieldDescriptor;
use crate::fields::registry::FieldRegistry;
use crate::fields::tracker::LifecycleTracker;
use crate::fields::watcher::{BatchOutcome, TreeChangeWatcher};

/// Everything the lifecycle manager needs for one page: registered
/// descriptors, mounted cleanups and the subtree subscription.
///
/// Built and owned by whoever composes the page; nothing here is global.
#[derive(Debug)]
pub struct FieldContext {
    registry: FieldRegistry,
    tracker: LifecycleTracker,
    watcher: TreeChangeWatcher,
    max_delivery_rounds: usize,
}

impl FieldContext {
    pub fn new(config: &FieldsConfig) -> Self {
        Self {
            registry: FieldRegistry::new(config.markers.attribute_prefix.clone()),
            tracker: LifecycleTracker::new(),
            watcher: TreeChangeWatcher::new(),
            max_delivery_rounds: config.watcher.max_delivery_rounds.max(1),
        }
    }

    pub fn observe(&mut self, document: &mut Document, root: NodeId) -> DomResult<()> {
        self.watcher.observe(document, root)
    }

    /// Register a field behavior and mount it on matching elements already
    /// in the document.
    ///
    /// Records still queued are delivered first, so an element inserted
    /// before this call is mounted by the scan only and not again by the
    /// watcher.
    pub fn register_field(&mut self, document: &mut Document, descriptor: FieldDescriptor) -> usize {
        self.deliver(document);
        self.registry
            .register(descriptor, document, &mut self.tracker)
    }

    /// Feed queued mutation batches to the watcher until the document is
    /// quiet. Mounts and cleanups that edit the tree produce further
    /// batches; delivery stops after the configured number of rounds and
    /// leaves the rest queued.
    pub fn deliver(&mut self, document: &mut Document) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();

        for _ in 0..self.max_delivery_rounds {
            let Some(batch) = self.watcher.take_batch(document) else {
                return outcome;
            };
            outcome.merge(
                self.watcher
                    .handle(document, &self.registry, &mut self.tracker, batch),
            );
        }

        if self.has_pending_records(document) {
            tracing::warn!(
                "Mutation delivery stopped after {} rounds; remaining records stay queued",
                self.max_delivery_rounds
            );
        }
        outcome
    }

    /// Whether records are queued for a later `deliver`
    pub fn has_pending_records(&self, document: &Document) -> bool {
        self.watcher.has_pending_records(document)
    }

    pub fn stop(&mut self, document: &mut Document) -> BatchOutcome {
        self.watcher
            .stop(document, &self.registry, &mut self.tracker)
    }

    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    pub fn tracker(&self) -> &LifecycleTracker {
        &self.tracker
    }

    pub fn watcher(&self) -> &TreeChangeWatcher {
        &self.watcher
    }
}
