use crate::dom::{Document, DomResult, EventKind, NodeId};
use crate::multivalued::MultivaluedController;

/// The "Add value" and "Remove" links currently attached to an element
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Affordances {
    pub add: Option<NodeId>,
    pub remove: Option<NodeId>,
}

impl MultivaluedController {
    /// Links keyed by the element's current id
    pub fn affordances(&self, document: &Document, element: NodeId) -> Affordances {
        let Some(id) = document.attribute(element, "id") else {
            return Affordances::default();
        };
        Affordances {
            add: document.get_element_by_id(&format!("{}{}", self.settings.add_id_prefix, id)),
            remove: document
                .get_element_by_id(&format!("{}{}", self.settings.remove_id_prefix, id)),
        }
    }

    pub(crate) fn remove_affordances(&self, document: &mut Document, element: NodeId) -> DomResult<()> {
        let Some(id) = document.attribute(element, "id").map(str::to_string) else {
            return Ok(());
        };

        for prefix in [&self.settings.add_id_prefix, &self.settings.remove_id_prefix] {
            for link in document.elements_by_id(&format!("{prefix}{id}")) {
                document.remove(link)?;
            }
        }
        Ok(())
    }

    /// Place an "Add value" link right after `element`
    pub(crate) fn attach_add(&self, document: &mut Document, element: NodeId) -> DomResult<NodeId> {
        let link = self.create_link(
            document,
            element,
            &self.settings.add_id_prefix,
            &self.settings.add_label,
        )?;

        let controller = self.clone();
        document.add_event_listener(link, EventKind::Click, move |document, _| {
            let Some(name) = document.attribute(element, "name").map(str::to_string) else {
                tracing::warn!("Add clicked for {} which has no name", element);
                return;
            };
            if let Err(error) = controller.add_value(document, &name) {
                tracing::warn!("Could not add a value to '{}': {}", name, error);
            }
        })?;

        document.insert_after(element, link)?;
        Ok(link)
    }

    /// Place a "Remove" link right after `element`, ahead of any "Add" link
    pub(crate) fn attach_remove(
        &self,
        document: &mut Document,
        element: NodeId,
        is_last: bool,
    ) -> DomResult<NodeId> {
        let label = if is_last {
            format!("{}{}", self.settings.remove_label, self.settings.remove_separator)
        } else {
            self.settings.remove_label.clone()
        };
        let link = self.create_link(document, element, &self.settings.remove_id_prefix, &label)?;

        let controller = self.clone();
        document.add_event_listener(link, EventKind::Click, move |document, _| {
            if let Err(error) = controller.remove_value(document, element) {
                tracing::warn!("Could not remove {}: {}", element, error);
            }
        })?;

        document.insert_after(element, link)?;
        Ok(link)
    }

    fn create_link(
        &self,
        document: &mut Document,
        element: NodeId,
        prefix: &str,
        label: &str,
    ) -> DomResult<NodeId> {
        let id = document.attribute(element, "id").unwrap_or_default().to_string();
        let link = document.create_element("a");
        document.set_attribute(link, "id", &format!("{prefix}{id}"))?;
        document.set_attribute(link, "href", "#")?;
        document.set_text_content(link, label)?;
        Ok(link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FieldsConfig;
    use crate::multivalued::MultivaluedSettings;

    fn setup(count: usize) -> (Document, MultivaluedController, Vec<NodeId>) {
        let mut document = Document::new();
        let body = document.body();
        let inputs = (0..count)
            .map(|_| {
                let input = document.create_element("input");
                document.set_attribute(input, "name", "emails").unwrap();
                document.set_attribute(input, "data-kcMultivalued", "").unwrap();
                document.append_child(body, input).unwrap();
                input
            })
            .collect();
        let controller =
            MultivaluedController::new(MultivaluedSettings::from(&FieldsConfig::development()));
        controller.render(&mut document).unwrap();
        (document, controller, inputs)
    }

    #[test]
    fn test_links_point_nowhere_and_carry_prefixed_ids() {
        let (document, controller, inputs) = setup(2);
        let links = controller.affordances(&document, inputs[1]);
        let add = links.add.unwrap();

        assert_eq!(document.tag_name(add), Some("a"));
        assert_eq!(document.attribute(add, "href"), Some("#"));
        assert_eq!(document.attribute(add, "id"), Some("kc-add-emails-1"));
        assert_eq!(
            document.attribute(links.remove.unwrap(), "id"),
            Some("kc-remove-emails-1")
        );
    }

    #[test]
    fn test_clicking_add_grows_the_group() {
        let (mut document, controller, inputs) = setup(1);
        let add = controller.affordances(&document, inputs[0]).add.unwrap();

        document.dispatch_event(add, EventKind::Click).unwrap();

        let group = controller.group(&document, "emails").unwrap();
        assert_eq!(group.len(), 2);
        assert!(!document.is_connected(add));
    }

    #[test]
    fn test_clicking_remove_shrinks_the_group() {
        let (mut document, controller, inputs) = setup(2);
        let remove = controller.affordances(&document, inputs[0]).remove.unwrap();

        document.dispatch_event(remove, EventKind::Click).unwrap();

        let group = controller.group(&document, "emails").unwrap();
        assert_eq!(group.elements, vec![inputs[1]]);
        assert!(!document.is_connected(inputs[0]));
        assert_eq!(controller.affordances(&document, inputs[1]).remove, None);
    }

    #[test]
    fn test_remove_affordances_ignores_elements_without_links() {
        let (mut document, controller, _) = setup(0);
        let bare = document.create_element("input");
        controller.remove_affordances(&mut document, bare).unwrap();
    }
}
