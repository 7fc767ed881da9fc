// Multivalued fields: same-named inputs rendered as a growable list with
// "Add value" and "Remove" links kept in step with group membership

pub mod actions;

use std::rc::Rc;

use crate::config::FieldsConfig;
use crate::dom::{Document, DomResult, NodeId};

pub use actions::Affordances;

/// Marker, labels and id prefixes used by the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultivaluedSettings {
    pub marker: String,
    pub add_label: String,
    pub remove_label: String,
    pub remove_separator: String,
    pub add_id_prefix: String,
    pub remove_id_prefix: String,
}

impl From<&FieldsConfig> for MultivaluedSettings {
    fn from(config: &FieldsConfig) -> Self {
        Self {
            marker: config.markers.multivalued.clone(),
            add_label: config.multivalued.add_label.clone(),
            remove_label: config.multivalued.remove_label.clone(),
            remove_separator: config.multivalued.remove_separator.clone(),
            add_id_prefix: config.multivalued.add_id_prefix.clone(),
            remove_id_prefix: config.multivalued.remove_id_prefix.clone(),
        }
    }
}

/// Marker-carrying elements that share a `name`, in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultivaluedGroup {
    pub name: String,
    pub elements: Vec<NodeId>,
}

impl MultivaluedGroup {
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn last(&self) -> Option<NodeId> {
        self.elements.last().copied()
    }

    pub fn element_id(&self, index: usize) -> String {
        format!("{}-{}", self.name, index)
    }
}

/// Works directly on the document: one render pass on install, then the
/// click handlers of the links it creates.
#[derive(Debug, Clone)]
pub struct MultivaluedController {
    settings: Rc<MultivaluedSettings>,
}

impl MultivaluedController {
    pub fn new(settings: MultivaluedSettings) -> Self {
        Self {
            settings: Rc::new(settings),
        }
    }

    pub fn settings(&self) -> &MultivaluedSettings {
        &self.settings
    }

    /// Current groups, ordered by the first appearance of each name.
    /// Marked elements without a `name` are left out.
    pub fn groups(&self, document: &Document) -> Vec<MultivaluedGroup> {
        let mut groups: Vec<MultivaluedGroup> = Vec::new();

        for element in document.elements_with_attribute(&self.settings.marker) {
            let Some(name) = document.attribute(element, "name") else {
                tracing::warn!(
                    "Skipping {} element {} without a name attribute",
                    self.settings.marker,
                    element
                );
                continue;
            };

            match groups.iter_mut().find(|group| group.name == name) {
                Some(group) => group.elements.push(element),
                None => groups.push(MultivaluedGroup {
                    name: name.to_string(),
                    elements: vec![element],
                }),
            }
        }

        groups
    }

    pub fn group(&self, document: &Document, name: &str) -> Option<MultivaluedGroup> {
        self.groups(document)
            .into_iter()
            .find(|group| group.name == name)
    }

    /// Restore the group invariants across the whole document: strip every
    /// member's links, renumber ids `name-0..`, then give each member of a
    /// multi-element group a "Remove" link and the last member an "Add" link.
    ///
    /// Running it again without an edit in between leaves the same markup.
    pub fn render(&self, document: &mut Document) -> DomResult<()> {
        let groups = self.groups(document);

        for group in &groups {
            for (index, &element) in group.elements.iter().enumerate() {
                self.remove_affordances(document, element)?;
                document.set_attribute(element, "id", &group.element_id(index))?;

                let is_last = index + 1 == group.len();
                if is_last {
                    self.attach_add(document, element)?;
                }
                if group.len() > 1 {
                    self.attach_remove(document, element, is_last)?;
                }
            }
        }

        tracing::debug!("Rendered {} multivalued groups", groups.len());
        Ok(())
    }

    /// Clone the last member of `name`'s group right after it, with the
    /// value cleared and the next id, then re-render. Returns the clone, or
    /// `None` when the group has no members.
    pub fn add_value(&self, document: &mut Document, name: &str) -> DomResult<Option<NodeId>> {
        let Some(group) = self.group(document, name) else {
            return Ok(None);
        };
        let Some(last) = group.last() else {
            return Ok(None);
        };

        let clone = document.clone_node(last, true)?;
        document.set_attribute(clone, "id", &group.element_id(group.len()))?;
        document.set_value(clone, "")?;
        document.insert_after(last, clone)?;
        tracing::debug!("Added value {} to group '{}'", clone, name);

        self.render(document)?;
        Ok(Some(clone))
    }

    /// Drop `element` and its links, then re-render
    pub fn remove_value(&self, document: &mut Document, element: NodeId) -> DomResult<()> {
        self.remove_affordances(document, element)?;
        document.remove(element)?;
        tracing::debug!("Removed multivalued element {}", element);

        self.render(document)
    }
}
