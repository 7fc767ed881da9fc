use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::dom::document::Document;
use crate::dom::error::DomResult;
use crate::dom::node::NodeId;

/// User interaction kinds the login theme reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Click,
    KeyUp,
    Input,
    Change,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    pub target: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub type ListenerFn = Rc<dyn Fn(&mut Document, &Event)>;

pub(crate) struct Listener {
    pub id: ListenerId,
    pub kind: EventKind,
    pub callback: ListenerFn,
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl Document {
    /// Attach a listener to `target`. Listeners live as long as the node.
    pub fn add_event_listener<F>(
        &mut self,
        target: NodeId,
        kind: EventKind,
        callback: F,
    ) -> DomResult<ListenerId>
    where
        F: Fn(&mut Document, &Event) + 'static,
    {
        let id = ListenerId(self.next_listener);
        let node = self.node_mut(target)?;
        node.listeners.push(Listener {
            id,
            kind,
            callback: Rc::new(callback),
        });
        self.next_listener += 1;
        Ok(id)
    }

    pub fn remove_event_listener(&mut self, target: NodeId, id: ListenerId) -> bool {
        let Ok(node) = self.node_mut(target) else {
            return false;
        };
        let before = node.listeners.len();
        node.listeners.retain(|listener| listener.id != id);
        before != node.listeners.len()
    }

    pub fn listener_count(&self, target: NodeId, kind: EventKind) -> usize {
        self.node(target)
            .map(|node| {
                node.listeners
                    .iter()
                    .filter(|listener| listener.kind == kind)
                    .count()
            })
            .unwrap_or(0)
    }

    /// Run the listeners registered on `target` for `kind`, in registration
    /// order. A listener removed by an earlier one in the same dispatch is
    /// skipped. Returns how many listeners ran.
    pub fn dispatch_event(&mut self, target: NodeId, kind: EventKind) -> DomResult<usize> {
        let snapshot: Vec<(ListenerId, ListenerFn)> = self
            .node(target)?
            .listeners
            .iter()
            .filter(|listener| listener.kind == kind)
            .map(|listener| (listener.id, Rc::clone(&listener.callback)))
            .collect();

        let event = Event { kind, target };
        let mut invoked = 0;
        for (id, callback) in snapshot {
            if !self.has_listener(target, id) {
                continue;
            }
            callback(self, &event);
            invoked += 1;
        }

        tracing::trace!("Dispatched {:?} to {} ({} listeners)", kind, target, invoked);
        Ok(invoked)
    }

    fn has_listener(&self, target: NodeId, id: ListenerId) -> bool {
        self.node(target)
            .map(|node| node.listeners.iter().any(|listener| listener.id == id))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_dispatch_runs_matching_listeners_in_order() {
        let mut document = Document::new();
        let field = document.create_element("input");
        let seen = Rc::new(RefCell::new(Vec::new()));

        for label in ["first", "second"] {
            let seen = Rc::clone(&seen);
            document
                .add_event_listener(field, EventKind::KeyUp, move |_, event| {
                    seen.borrow_mut().push((label, event.kind));
                })
                .unwrap();
        }
        document
            .add_event_listener(field, EventKind::Click, |_, _| panic!("wrong kind"))
            .unwrap();

        assert_eq!(document.dispatch_event(field, EventKind::KeyUp).unwrap(), 2);
        assert_eq!(
            *seen.borrow(),
            vec![("first", EventKind::KeyUp), ("second", EventKind::KeyUp)]
        );
    }

    #[test]
    fn test_listener_can_edit_document_and_remove_later_listener() {
        let mut document = Document::new();
        let body = document.body();
        let button = document.create_element("a");
        document.append_child(body, button).unwrap();

        let later = Rc::new(RefCell::new(None));
        let later_handle = Rc::clone(&later);
        document
            .add_event_listener(button, EventKind::Click, move |document, event| {
                if let Some(id) = *later_handle.borrow() {
                    document.remove_event_listener(event.target, id);
                }
                document.remove(event.target).unwrap();
            })
            .unwrap();
        let id = document
            .add_event_listener(button, EventKind::Click, |_, _| panic!("removed listener ran"))
            .unwrap();
        *later.borrow_mut() = Some(id);

        assert_eq!(document.dispatch_event(button, EventKind::Click).unwrap(), 1);
        assert!(!document.is_connected(button));
    }

    #[test]
    fn test_remove_listener() {
        let mut document = Document::new();
        let field = document.create_element("input");
        let id = document
            .add_event_listener(field, EventKind::KeyUp, |_, _| {})
            .unwrap();

        assert_eq!(document.listener_count(field, EventKind::KeyUp), 1);
        assert!(document.remove_event_listener(field, id));
        assert!(!document.remove_event_listener(field, id));
        assert_eq!(document.listener_count(field, EventKind::KeyUp), 0);
    }
}
