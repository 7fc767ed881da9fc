use crate::dom::error::{DomError, DomResult};
use crate::dom::mutation::Observation;
use crate::dom::node::{ElementData, NodeData, NodeId, NodeKind, NodeSnapshot};

#[derive(Debug)]
struct Slot {
    generation: u32,
    data: Option<NodeData>,
}

/// Arena-backed document tree.
///
/// Every structural edit (insert, move, remove) goes through this type so
/// that observers registered with [`Document::observe`] receive a record of
/// it. Nodes removed from the tree stay addressable until
/// [`Document::reclaim_detached`] runs; after that their ids turn stale.
#[derive(Debug)]
pub struct Document {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: NodeId,
    body: NodeId,
    pub(crate) observations: Vec<Observation>,
    pub(crate) next_observer: u64,
    pub(crate) next_listener: u64,
    removed_roots: Vec<NodeId>,
}

impl Document {
    /// Create an empty document holding a single `<body>` element
    pub fn new() -> Self {
        let mut document = Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: NodeId::new(0, 0),
            body: NodeId::new(0, 0),
            observations: Vec::new(),
            next_observer: 1,
            next_listener: 1,
            removed_roots: Vec::new(),
        };

        let root = document.allocate(NodeKind::Document);
        let body = document.allocate(NodeKind::Element(ElementData::new("body")));
        if let Some(data) = document.slot_mut(root) {
            data.children.push(body);
        }
        if let Some(data) = document.slot_mut(body) {
            data.parent = Some(root);
        }

        document.root = root;
        document.body = body;
        document
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    // ========================================
    // Arena
    // ========================================

    fn allocate(&mut self, kind: NodeKind) -> NodeId {
        let data = NodeData::new(kind);
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.data = Some(data);
                NodeId::new(index, slot.generation)
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    data: Some(data),
                });
                NodeId::new(index, 0)
            }
        }
    }

    fn release(&mut self, id: NodeId) {
        if let Some(slot) = self.slots.get_mut(id.index()) {
            if slot.generation == id.generation() && slot.data.is_some() {
                slot.data = None;
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(id.slot());
            }
        }
    }

    fn slot(&self, id: NodeId) -> Option<&NodeData> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.data.as_ref())
    }

    fn slot_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.data.as_mut())
    }

    pub(crate) fn node(&self, id: NodeId) -> DomResult<&NodeData> {
        self.slot(id).ok_or(DomError::StaleNode(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> DomResult<&mut NodeData> {
        self.slot_mut(id).ok_or(DomError::StaleNode(id))
    }

    fn element(&self, id: NodeId) -> DomResult<&ElementData> {
        self.node(id)?.element().ok_or(DomError::NotAnElement(id))
    }

    fn element_mut(&mut self, id: NodeId) -> DomResult<&mut ElementData> {
        self.node_mut(id)?
            .element_mut()
            .ok_or(DomError::NotAnElement(id))
    }

    /// Whether `id` still refers to a live node
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.slot(id).is_some()
    }

    /// Number of live nodes, attached or not
    pub fn node_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.data.is_some()).count()
    }

    // ========================================
    // Node creation
    // ========================================

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.allocate(NodeKind::Element(ElementData::new(tag)))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.allocate(NodeKind::Text(text.to_string()))
    }

    /// Copy a node (and its subtree when `deep`) into a new detached node.
    /// Event listeners are not copied.
    pub fn clone_node(&mut self, id: NodeId, deep: bool) -> DomResult<NodeId> {
        let (kind, children) = {
            let data = self.node(id)?;
            if matches!(data.kind, NodeKind::Document) {
                return Err(DomError::InvalidHierarchy(format!(
                    "cannot clone document node {id}"
                )));
            }
            let children = if deep { data.children.clone() } else { Vec::new() };
            (data.kind.clone(), children)
        };

        let copy = self.allocate(kind);
        for child in children {
            let child_copy = self.clone_node(child, true)?;
            self.node_mut(child_copy)?.parent = Some(copy);
            self.node_mut(copy)?.children.push(child_copy);
        }
        Ok(copy)
    }

    // ========================================
    // Element state
    // ========================================

    pub fn is_element(&self, id: NodeId) -> bool {
        self.slot(id).and_then(NodeData::element).is_some()
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.slot(id)
            .and_then(NodeData::element)
            .map(|element| element.tag.as_str())
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.slot(id)
            .and_then(NodeData::element)
            .and_then(|element| element.attr(name))
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.attribute(id, name).is_some()
    }

    pub fn attributes(&self, id: NodeId) -> DomResult<&[(String, String)]> {
        Ok(&self.element(id)?.attrs)
    }

    /// Set an attribute. Writing `value` also resets the live value.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> DomResult<()> {
        let element = self.element_mut(id)?;
        element.set_attr(name, value);
        if name.eq_ignore_ascii_case("value") {
            element.value = value.to_string();
        }
        Ok(())
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> DomResult<Option<String>> {
        Ok(self.element_mut(id)?.remove_attr(name))
    }

    /// Live value of a form control
    pub fn value(&self, id: NodeId) -> Option<&str> {
        self.slot(id)
            .and_then(NodeData::element)
            .map(|element| element.value.as_str())
    }

    pub fn set_value(&mut self, id: NodeId, value: &str) -> DomResult<()> {
        self.element_mut(id)?.value = value.to_string();
        Ok(())
    }

    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for node in self.descendants(id) {
            if let Some(NodeKind::Text(text)) = self.slot(node).map(|data| &data.kind) {
                out.push_str(text);
            }
        }
        out
    }

    /// Replace all children of `id` with a single text node
    pub fn set_text_content(&mut self, id: NodeId, text: &str) -> DomResult<()> {
        let children = self.node(id)?.children.clone();
        for child in children {
            self.remove(child)?;
        }
        if !text.is_empty() {
            let text_node = self.create_text(text);
            self.append_child(id, text_node)?;
        }
        Ok(())
    }

    // ========================================
    // Navigation
    // ========================================

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slot(id).and_then(|data| data.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.slot(id)
            .map(|data| data.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let position = siblings.iter().position(|sibling| *sibling == id)?;
        siblings.get(position + 1).copied()
    }

    /// Inclusive ancestry check
    pub fn contains(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == ancestor {
                return self.is_alive(current);
            }
            cursor = self.parent(current);
        }
        false
    }

    pub fn is_connected(&self, id: NodeId) -> bool {
        self.contains(self.root, id)
    }

    /// `id` and every node below it, in document order
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if !self.is_alive(id) {
            return out;
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// Connected elements carrying `name`, in document order
    pub fn elements_with_attribute(&self, name: &str) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|node| self.has_attribute(*node, name))
            .collect()
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.elements_by_id(id).into_iter().next()
    }

    pub fn elements_by_id(&self, id: &str) -> Vec<NodeId> {
        if id.is_empty() {
            return Vec::new();
        }
        self.descendants(self.root)
            .into_iter()
            .filter(|node| self.attribute(*node, "id") == Some(id))
            .collect()
    }

    // ========================================
    // Structural edits
    // ========================================

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` under `parent` before `reference` (or last when `None`).
    /// A child that is already attached is moved.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> DomResult<()> {
        if !self.node(parent)?.can_have_children() {
            return Err(DomError::InvalidHierarchy(format!(
                "{parent} cannot have children"
            )));
        }
        if matches!(self.node(child)?.kind, NodeKind::Document) {
            return Err(DomError::InvalidHierarchy(format!(
                "document node {child} cannot be inserted"
            )));
        }
        if self.contains(child, parent) {
            return Err(DomError::InvalidHierarchy(format!(
                "inserting {child} into {parent} would create a cycle"
            )));
        }

        let mut reference = reference;
        if reference == Some(child) {
            reference = self.next_sibling(child);
        }
        if let Some(reference) = reference {
            if self.parent(reference) != Some(parent) {
                return Err(DomError::InvalidHierarchy(format!(
                    "{reference} is not a child of {parent}"
                )));
            }
        }

        self.detach(child)?;

        let siblings = &mut self.node_mut(parent)?.children;
        let index = reference
            .and_then(|reference| siblings.iter().position(|sibling| *sibling == reference))
            .unwrap_or(siblings.len());
        siblings.insert(index, child);
        self.node_mut(child)?.parent = Some(parent);

        self.record(parent, vec![child], Vec::new());
        Ok(())
    }

    /// Insert `child` right after `target`, like `Element.after`
    pub fn insert_after(&mut self, target: NodeId, child: NodeId) -> DomResult<()> {
        let parent = self
            .node(target)?
            .parent
            .ok_or(DomError::DetachedTarget(target))?;
        let reference = self.next_sibling(target);
        self.insert_before(parent, child, reference)
    }

    /// Detach `id` from its parent. Removing a detached node is a no-op.
    pub fn remove(&mut self, id: NodeId) -> DomResult<()> {
        if id == self.root {
            return Err(DomError::InvalidHierarchy(
                "cannot remove the document root".into(),
            ));
        }
        self.detach(id)
    }

    fn detach(&mut self, id: NodeId) -> DomResult<()> {
        let Some(parent) = self.node(id)?.parent else {
            return Ok(());
        };
        self.node_mut(parent)?.children.retain(|sibling| *sibling != id);
        self.node_mut(id)?.parent = None;
        self.removed_roots.push(id);

        self.record(parent, Vec::new(), vec![id]);
        Ok(())
    }

    /// Free every subtree removed since the last call that has not been
    /// re-inserted. Returns the number of nodes released.
    pub fn reclaim_detached(&mut self) -> usize {
        let roots = std::mem::take(&mut self.removed_roots);
        let mut reclaimed = 0;

        for root in roots {
            match self.slot(root) {
                Some(data) if data.parent.is_none() => {}
                _ => continue,
            }
            for node in self.descendants(root) {
                self.release(node);
                reclaimed += 1;
            }
        }

        if reclaimed > 0 {
            tracing::trace!("Reclaimed {} detached nodes", reclaimed);
        }
        reclaimed
    }

    // ========================================
    // Serialization
    // ========================================

    pub fn snapshot(&self, id: NodeId) -> DomResult<NodeSnapshot> {
        let data = self.node(id)?;
        let children = data
            .children
            .iter()
            .map(|child| self.snapshot(*child))
            .collect::<DomResult<Vec<_>>>()?;

        Ok(match &data.kind {
            NodeKind::Document => NodeSnapshot::Document { children },
            NodeKind::Element(element) => NodeSnapshot::Element {
                tag: element.tag.clone(),
                attributes: element.attrs.clone(),
                value: element.value.clone(),
                children,
            },
            NodeKind::Text(text) => NodeSnapshot::Text { text: text.clone() },
        })
    }

    /// Serialize a subtree as markup. Form controls render their live value.
    pub fn outer_html(&self, id: NodeId) -> DomResult<String> {
        let mut out = String::new();
        self.write_html(id, &mut out)?;
        Ok(out)
    }

    fn write_html(&self, id: NodeId, out: &mut String) -> DomResult<()> {
        let data = self.node(id)?;
        match &data.kind {
            NodeKind::Document => {
                for child in &data.children {
                    self.write_html(*child, out)?;
                }
            }
            NodeKind::Text(text) => out.push_str(&escape(text, false)),
            NodeKind::Element(element) => {
                let is_control = is_form_control(&element.tag);
                out.push('<');
                out.push_str(&element.tag);
                for (name, value) in &element.attrs {
                    if is_control && name == "value" {
                        continue;
                    }
                    out.push_str(&format!(" {}=\"{}\"", name, escape(value, true)));
                }
                if is_control && !element.value.is_empty() {
                    out.push_str(&format!(" value=\"{}\"", escape(&element.value, true)));
                }
                out.push('>');

                if is_void(&element.tag) {
                    return Ok(());
                }
                for child in &data.children {
                    self.write_html(*child, out)?;
                }
                out.push_str(&format!("</{}>", element.tag));
            }
        }
        Ok(())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

fn is_form_control(tag: &str) -> bool {
    matches!(tag, "input" | "textarea" | "select")
}

fn is_void(tag: &str) -> bool {
    matches!(tag, "input" | "br" | "hr" | "img" | "meta" | "link")
}

fn escape(text: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
