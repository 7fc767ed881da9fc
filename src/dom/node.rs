use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dom::events::Listener;

/// Stable identity of a node in a [`Document`](crate::dom::Document).
///
/// Slots are recycled once a detached subtree is reclaimed; the generation
/// makes an id from the previous occupant compare unequal to the new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub(crate) fn index(self) -> usize {
        self.index as usize
    }

    pub(crate) fn slot(self) -> u32 {
        self.index
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}v{}", self.index, self.generation)
    }
}

#[derive(Debug, Clone)]
pub(crate) enum NodeKind {
    Document,
    Element(ElementData),
    Text(String),
}

/// Element payload: tag, attributes in insertion order and the live value
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ElementData {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub value: String,
}

impl ElementData {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
            value: String::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: &str) {
        let lowered = name.to_ascii_lowercase();
        match self.attrs.iter_mut().find(|(key, _)| *key == lowered) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.attrs.push((lowered, value.to_string())),
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let position = self
            .attrs
            .iter()
            .position(|(key, _)| key.eq_ignore_ascii_case(name))?;
        Some(self.attrs.remove(position).1)
    }
}

#[derive(Debug)]
pub(crate) struct NodeData {
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub kind: NodeKind,
    pub listeners: Vec<Listener>,
}

impl NodeData {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            kind,
            listeners: Vec::new(),
        }
    }

    pub fn element(&self) -> Option<&ElementData> {
        match &self.kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn can_have_children(&self) -> bool {
        matches!(self.kind, NodeKind::Document | NodeKind::Element(_))
    }
}

/// Serializable, identity-free view of a subtree.
///
/// Two snapshots compare equal when the trees have the same structure,
/// attributes, values and text, regardless of which node ids back them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeSnapshot {
    Document {
        children: Vec<NodeSnapshot>,
    },
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
        #[serde(default, skip_serializing_if = "String::is_empty")]
        value: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<NodeSnapshot>,
    },
    Text {
        text: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_names_are_case_insensitive() {
        let mut element = ElementData::new("INPUT");
        element.set_attr("data-kcNumberFormat", "#,##0");

        assert_eq!(element.tag, "input");
        assert_eq!(element.attr("data-kcnumberformat"), Some("#,##0"));
        assert_eq!(element.attr("DATA-KCNUMBERFORMAT"), Some("#,##0"));

        element.set_attr("Data-KcNumberFormat", "0.00");
        assert_eq!(element.attrs.len(), 1);
        assert_eq!(element.remove_attr("data-kcNumberFormat").as_deref(), Some("0.00"));
        assert!(element.attrs.is_empty());
    }

    #[test]
    fn test_node_id_display_includes_generation() {
        assert_eq!(NodeId::new(4, 2).to_string(), "node#4v2");
        assert_ne!(NodeId::new(4, 2), NodeId::new(4, 3));
    }
}
