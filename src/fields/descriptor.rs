use std::fmt;
use std::rc::Rc;

use crate::dom::{Document, NodeId};

/// Undo action returned by a mount; runs once when the element leaves the
/// observed tree.
pub type Cleanup = Box<dyn FnOnce(&mut Document)>;

/// A behavior attached to every element carrying its marker attribute
pub trait FieldBehavior {
    /// Marker name; elements opt in through `data-<name>`
    fn name(&self) -> &str;

    /// Attach runtime effects to a newly observed element
    fn on_mount(&self, document: &mut Document, element: NodeId) -> Option<Cleanup>;
}

/// Registered field behavior. Cheap to clone; immutable once built.
#[derive(Clone)]
pub struct FieldDescriptor {
    behavior: Rc<dyn FieldBehavior>,
}

impl FieldDescriptor {
    pub fn new<B>(behavior: B) -> Self
    where
        B: FieldBehavior + 'static,
    {
        Self {
            behavior: Rc::new(behavior),
        }
    }

    /// Build a descriptor from a bare mount closure
    pub fn from_fn<F>(name: impl Into<String>, on_mount: F) -> Self
    where
        F: Fn(&mut Document, NodeId) -> Option<Cleanup> + 'static,
    {
        Self::new(FnBehavior {
            name: name.into(),
            on_mount,
        })
    }

    pub fn name(&self) -> &str {
        self.behavior.name()
    }

    /// Attribute that opts an element into this behavior
    pub fn marker(&self, prefix: &str) -> String {
        format!("{}{}", prefix, self.name())
    }

    pub fn mount(&self, document: &mut Document, element: NodeId) -> Option<Cleanup> {
        self.behavior.on_mount(document, element)
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name())
            .finish()
    }
}

struct FnBehavior<F> {
    name: String,
    on_mount: F,
}

impl<F> FieldBehavior for FnBehavior<F>
where
    F: Fn(&mut Document, NodeId) -> Option<Cleanup>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn on_mount(&self, document: &mut Document, element: NodeId) -> Option<Cleanup> {
        (self.on_mount)(document, element)
    }
}
