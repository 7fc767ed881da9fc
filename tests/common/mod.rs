#![allow(dead_code)]

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::Result;
use kc_login_fields::config::FieldsConfig;
use kc_login_fields::dom::{Document, NodeId};
use kc_login_fields::fields::FieldDescriptor;
use kc_login_fields::multivalued::MultivaluedGroup;
use kc_login_fields::Page;

/// Mount and cleanup calls seen by a [`Journal`] descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Mount(NodeId),
    Cleanup(NodeId),
}

/// Shared log of lifecycle calls for one descriptor name
#[derive(Debug, Clone, Default)]
pub struct Journal {
    calls: Rc<RefCell<Vec<Call>>>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn descriptor(&self, name: &str) -> FieldDescriptor {
        let calls = Rc::clone(&self.calls);
        FieldDescriptor::from_fn(name, move |_, element| {
            calls.borrow_mut().push(Call::Mount(element));
            let calls = Rc::clone(&calls);
            Some(Box::new(move |_: &mut Document| {
                calls.borrow_mut().push(Call::Cleanup(element));
            }))
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn mounts(&self, element: NodeId) -> usize {
        self.count(Call::Mount(element))
    }

    pub fn cleanups(&self, element: NodeId) -> usize {
        self.count(Call::Cleanup(element))
    }

    fn count(&self, call: Call) -> usize {
        self.calls.borrow().iter().filter(|seen| **seen == call).count()
    }
}

pub fn config() -> FieldsConfig {
    FieldsConfig::development()
}

pub fn page() -> Result<Page> {
    Ok(Page::new(&config())?)
}

/// Append an `<input>` with `attributes` to the body and settle
pub fn append_input(page: &mut Page, attributes: &[(&str, &str)], value: &str) -> Result<NodeId> {
    let input = page.mutate(|document| -> Result<NodeId> {
        let input = document.create_element("input");
        for (name, attribute) in attributes {
            document.set_attribute(input, name, attribute)?;
        }
        document.set_value(input, value)?;
        let body = document.body();
        document.append_child(body, input)?;
        Ok(input)
    })?;
    Ok(input)
}

/// Page with one multivalued input per value, rendered
pub fn multivalued_page(name: &str, values: &[&str]) -> Result<Page> {
    let mut page = page()?;
    for value in values {
        append_input(&mut page, &[("name", name), ("data-kcMultivalued", "")], value)?;
    }
    page.install_multivalued()?;
    Ok(page)
}

pub fn group(page: &Page, name: &str) -> MultivaluedGroup {
    page.multivalued()
        .group(page.document(), name)
        .unwrap_or_else(|| MultivaluedGroup {
            name: name.to_string(),
            elements: Vec::new(),
        })
}

/// Ids are `name-0..name-(k-1)`; only the last member has "Add"; every
/// member of a group larger than one has "Remove"
pub fn assert_group_invariants(page: &Page, name: &str) {
    let group = group(page, name);
    let document = page.document();

    for (index, &element) in group.elements.iter().enumerate() {
        let expected = format!("{}-{}", name, index);
        assert_eq!(document.attribute(element, "id"), Some(expected.as_str()));

        let links = page.multivalued().affordances(document, element);
        assert_eq!(links.add.is_some(), index + 1 == group.len(), "add link on {}", expected);
        assert_eq!(links.remove.is_some(), group.len() > 1, "remove link on {}", expected);
    }
}

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}
