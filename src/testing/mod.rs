use std::cell::RefCell;
use std::rc::Rc;

use crate::dom::{Document, NodeId};
use crate::fields::FieldDescriptor;

/// Lifecycle calls observed by a [`Recorder`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    Mounted(&'static str, NodeId),
    CleanedUp(&'static str, NodeId),
}

/// Builds descriptors that log every mount and cleanup
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    events: Rc<RefCell<Vec<LifecycleEvent>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn descriptor(&self, name: &'static str) -> FieldDescriptor {
        let events = Rc::clone(&self.events);
        FieldDescriptor::from_fn(name, move |_, element| {
            events.borrow_mut().push(LifecycleEvent::Mounted(name, element));
            let events = Rc::clone(&events);
            Some(Box::new(move |_: &mut Document| {
                events
                    .borrow_mut()
                    .push(LifecycleEvent::CleanedUp(name, element));
            }))
        })
    }

    pub fn events(&self) -> Vec<LifecycleEvent> {
        self.events.borrow().clone()
    }

    pub fn mount_count(&self, element: NodeId) -> usize {
        self.count(|event| matches!(event, LifecycleEvent::Mounted(_, node) if *node == element))
    }

    pub fn cleanup_count(&self, element: NodeId) -> usize {
        self.count(|event| matches!(event, LifecycleEvent::CleanedUp(_, node) if *node == element))
    }

    fn count<F>(&self, predicate: F) -> usize
    where
        F: Fn(&LifecycleEvent) -> bool,
    {
        self.events.borrow().iter().filter(|event| predicate(event)).count()
    }
}

/// Detached `<input>` carrying `data-<marker>`
pub fn marked_input(document: &mut Document, marker: &str) -> NodeId {
    let input = document.create_element("input");
    document
        .set_attribute(input, &format!("data-{marker}"), "")
        .expect("fresh element accepts attributes");
    input
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorder_counts_per_element() {
        let mut document = Document::new();
        let first = marked_input(&mut document, "kcRecord");
        let second = marked_input(&mut document, "kcRecord");
        let recorder = Recorder::new();
        let descriptor = recorder.descriptor("kcRecord");

        let cleanup = descriptor.mount(&mut document, first).expect("cleanup");
        descriptor.mount(&mut document, second);
        cleanup(&mut document);

        assert_eq!(recorder.mount_count(first), 1);
        assert_eq!(recorder.mount_count(second), 1);
        assert_eq!(recorder.cleanup_count(first), 1);
        assert_eq!(recorder.cleanup_count(second), 0);
    }
}
