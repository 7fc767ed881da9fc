use crate::dom::{Document, NodeId};
use crate::fields::descriptor::FieldDescriptor;
use crate::fields::tracker::LifecycleTracker;

/// Ordered, append-only set of field descriptors
#[derive(Debug)]
pub struct FieldRegistry {
    descriptors: Vec<FieldDescriptor>,
    marker_prefix: String,
}

impl FieldRegistry {
    pub fn new(marker_prefix: impl Into<String>) -> Self {
        Self {
            descriptors: Vec::new(),
            marker_prefix: marker_prefix.into(),
        }
    }

    /// Append `descriptor`, then mount it on every element of the document
    /// that already carries its marker. Returns the number of mounts.
    ///
    /// Names are not checked for uniqueness: two descriptors with the same
    /// name both mount on the same elements.
    pub fn register(
        &mut self,
        descriptor: FieldDescriptor,
        document: &mut Document,
        tracker: &mut LifecycleTracker,
    ) -> usize {
        if self.descriptors.iter().any(|existing| existing.name() == descriptor.name()) {
            tracing::warn!(
                "Field '{}' registered more than once; both descriptors will mount",
                descriptor.name()
            );
        }

        let marker = self.marker_for(&descriptor);
        self.descriptors.push(descriptor.clone());

        let existing = document.elements_with_attribute(&marker);
        for &element in &existing {
            mount_field_on_node(&descriptor, document, tracker, element);
        }

        tracing::debug!(
            "Registered field '{}' and mounted {} existing elements",
            descriptor.name(),
            existing.len()
        );
        existing.len()
    }

    pub fn descriptors(&self) -> &[FieldDescriptor] {
        &self.descriptors
    }

    pub fn marker_for(&self, descriptor: &FieldDescriptor) -> String {
        descriptor.marker(&self.marker_prefix)
    }

    pub fn marker_prefix(&self) -> &str {
        &self.marker_prefix
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

/// Mount `descriptor` on `element` and keep the cleanup it hands back
pub fn mount_field_on_node(
    descriptor: &FieldDescriptor,
    document: &mut Document,
    tracker: &mut LifecycleTracker,
    element: NodeId,
) {
    tracing::trace!("Mounting field '{}' on {}", descriptor.name(), element);
    if let Some(cleanup) = descriptor.mount(document, element) {
        tracker.track(element, cleanup);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{LifecycleEvent, Recorder};

    #[test]
    fn test_register_mounts_existing_elements() {
        let mut document = Document::new();
        let body = document.body();
        let marked = document.create_element("input");
        document.set_attribute(marked, "data-kcRecord", "x").unwrap();
        let plain = document.create_element("input");
        document.append_child(body, marked).unwrap();
        document.append_child(body, plain).unwrap();

        let recorder = Recorder::new();
        let mut registry = FieldRegistry::new("data-");
        let mut tracker = LifecycleTracker::new();

        let mounted = registry.register(recorder.descriptor("kcRecord"), &mut document, &mut tracker);

        assert_eq!(mounted, 1);
        assert_eq!(registry.len(), 1);
        assert_eq!(recorder.events(), vec![LifecycleEvent::Mounted("kcRecord", marked)]);
        assert!(tracker.is_tracking(marked));
        assert!(!tracker.is_tracking(plain));
    }

    #[test]
    fn test_register_ignores_detached_elements() {
        let mut document = Document::new();
        let detached = document.create_element("input");
        document.set_attribute(detached, "data-kcRecord", "x").unwrap();

        let recorder = Recorder::new();
        let mut registry = FieldRegistry::new("data-");
        let mut tracker = LifecycleTracker::new();

        assert_eq!(registry.register(recorder.descriptor("kcRecord"), &mut document, &mut tracker), 0);
        assert!(recorder.events().is_empty());
    }

    #[test]
    fn test_duplicate_names_both_mount() {
        let mut document = Document::new();
        let body = document.body();
        let marked = document.create_element("input");
        document.set_attribute(marked, "data-kcRecord", "x").unwrap();
        document.append_child(body, marked).unwrap();

        let first = Recorder::new();
        let second = Recorder::new();
        let mut registry = FieldRegistry::new("data-");
        let mut tracker = LifecycleTracker::new();

        registry.register(first.descriptor("kcRecord"), &mut document, &mut tracker);
        registry.register(second.descriptor("kcRecord"), &mut document, &mut tracker);

        assert_eq!(first.mount_count(marked), 1);
        assert_eq!(second.mount_count(marked), 1);
        // Only the latest cleanup is kept
        assert_eq!(tracker.len(), 1);
    }
}
