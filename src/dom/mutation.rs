use crate::dom::document::Document;
use crate::dom::error::DomResult;
use crate::dom::node::NodeId;

/// Handle for one subtree subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// One child-list change under `target`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub target: NodeId,
    pub added: Vec<NodeId>,
    pub removed: Vec<NodeId>,
    /// Every node under `removed` at the moment of removal. Later edits
    /// inside the detached subtree are not observed, so this is what
    /// cleanup has to go by.
    pub removed_subtree: Vec<NodeId>,
}

/// Added and removed nodes coalesced from every record queued since the
/// previous delivery, in the order the edits happened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationBatch {
    pub added: Vec<NodeId>,
    pub removed: Vec<NodeId>,
    pub removed_subtree: Vec<NodeId>,
}

impl MutationBatch {
    pub fn from_records(records: Vec<MutationRecord>) -> Self {
        let mut batch = Self::default();
        for record in records {
            batch.added.extend(record.added);
            batch.removed.extend(record.removed);
            batch.removed_subtree.extend(record.removed_subtree);
        }
        batch
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

#[derive(Debug)]
pub(crate) struct Observation {
    id: ObserverId,
    root: NodeId,
    records: Vec<MutationRecord>,
}

impl Document {
    /// Start queueing child-list records for edits anywhere under `root`
    pub fn observe(&mut self, root: NodeId) -> DomResult<ObserverId> {
        self.node(root)?;
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observations.push(Observation {
            id,
            root,
            records: Vec::new(),
        });
        tracing::debug!("Observing subtree {} as {:?}", root, id);
        Ok(id)
    }

    /// Stop the subscription and drop whatever it still had queued
    pub fn disconnect(&mut self, id: ObserverId) -> bool {
        let before = self.observations.len();
        self.observations.retain(|observation| observation.id != id);
        before != self.observations.len()
    }

    /// Drain the records queued for `id`
    pub fn take_records(&mut self, id: ObserverId) -> Vec<MutationRecord> {
        self.observations
            .iter_mut()
            .find(|observation| observation.id == id)
            .map(|observation| std::mem::take(&mut observation.records))
            .unwrap_or_default()
    }

    pub fn has_pending_records(&self, id: ObserverId) -> bool {
        self.observations
            .iter()
            .any(|observation| observation.id == id && !observation.records.is_empty())
    }

    /// Queue a record for every subscription whose subtree holds `target`
    /// at the time of the edit.
    pub(crate) fn record(&mut self, target: NodeId, added: Vec<NodeId>, removed: Vec<NodeId>) {
        let interested: Vec<usize> = self
            .observations
            .iter()
            .enumerate()
            .filter(|(_, observation)| self.contains(observation.root, target))
            .map(|(index, _)| index)
            .collect();

        if interested.is_empty() {
            return;
        }

        let removed_subtree: Vec<NodeId> = removed
            .iter()
            .flat_map(|node| self.descendants(*node))
            .collect();
        for index in interested {
            self.observations[index].records.push(MutationRecord {
                target,
                added: added.clone(),
                removed: removed.clone(),
                removed_subtree: removed_subtree.clone(),
            });
        }
    }
}
