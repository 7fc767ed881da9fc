use crate::config::FieldsConfig;
use crate::dom::{Document, DomResult, EventKind, NodeId, NodeSnapshot};
use crate::error::{PageError, PageResult};
use crate::fields::behaviors::builtin_descriptors;
use crate::fields::{BatchOutcome, FieldContext, FieldDescriptor};
use crate::multivalued::{MultivaluedController, MultivaluedSettings};

/// A document plus the field machinery composed over its body.
///
/// Each user action is one turn of the event loop: dispatch, deliver the
/// mutation batches it caused, then release detached nodes.
#[derive(Debug)]
pub struct Page {
    document: Document,
    fields: FieldContext,
    multivalued: MultivaluedController,
}

impl Page {
    pub fn new(config: &FieldsConfig) -> DomResult<Self> {
        Self::from_document(Document::new(), config)
    }

    /// Start observing the body of an already populated document
    pub fn from_document(mut document: Document, config: &FieldsConfig) -> DomResult<Self> {
        let mut fields = FieldContext::new(config);
        let body = document.body();
        fields.observe(&mut document, body)?;

        Ok(Self {
            document,
            fields,
            multivalued: MultivaluedController::new(MultivaluedSettings::from(config)),
        })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn fields(&self) -> &FieldContext {
        &self.fields
    }

    pub fn multivalued(&self) -> &MultivaluedController {
        &self.multivalued
    }

    pub fn register_field(&mut self, descriptor: FieldDescriptor) -> usize {
        self.fields.register_field(&mut self.document, descriptor)
    }

    /// Register every built-in behavior
    pub fn install_builtin_fields(&mut self, config: &FieldsConfig) -> usize {
        builtin_descriptors(config)
            .into_iter()
            .map(|descriptor| self.register_field(descriptor))
            .sum()
    }

    /// Run the multivalued render pass once over the current document
    pub fn install_multivalued(&mut self) -> DomResult<()> {
        self.multivalued.render(&mut self.document)?;
        self.settle();
        Ok(())
    }

    pub fn dispatch(&mut self, target: NodeId, kind: EventKind) -> DomResult<usize> {
        let invoked = self.document.dispatch_event(target, kind)?;
        self.settle();
        Ok(invoked)
    }

    pub fn click_by_id(&mut self, id: &str) -> PageResult<usize> {
        let target = self.element_by_id(id)?;
        Ok(self.dispatch(target, EventKind::Click)?)
    }

    /// Replace the value of the element with `id` and fire `keyup`, as typing does
    pub fn type_into(&mut self, id: &str, value: &str) -> PageResult<usize> {
        let target = self.element_by_id(id)?;
        self.document.set_value(target, value)?;
        Ok(self.dispatch(target, EventKind::KeyUp)?)
    }

    pub fn remove_by_id(&mut self, id: &str) -> PageResult<()> {
        let target = self.element_by_id(id)?;
        self.mutate(|document| document.remove(target))?;
        Ok(())
    }

    /// Edit the document directly, as a script outside the field machinery
    /// would, then settle.
    pub fn mutate<T, F>(&mut self, edit: F) -> T
    where
        F: FnOnce(&mut Document) -> T,
    {
        let result = edit(&mut self.document);
        self.settle();
        result
    }

    /// Deliver queued mutation batches, then free nodes that stayed detached.
    ///
    /// Nothing is freed while records are still queued: their removed nodes
    /// have not been cleaned yet, and a later settle picks them up.
    pub fn settle(&mut self) -> BatchOutcome {
        let outcome = self.fields.deliver(&mut self.document);
        if self.fields.has_pending_records(&self.document) {
            tracing::trace!(
                "Settled page: {} batches, reclaim deferred until the queue drains",
                outcome.batches
            );
            return outcome;
        }

        let reclaimed = self.document.reclaim_detached();
        if outcome.batches > 0 || reclaimed > 0 {
            tracing::trace!(
                "Settled page: {} batches, {} nodes reclaimed",
                outcome.batches,
                reclaimed
            );
        }
        outcome
    }

    /// Stop watching the body; queued batches are still delivered
    pub fn stop(&mut self) -> BatchOutcome {
        self.fields.stop(&mut self.document)
    }

    pub fn element_by_id(&self, id: &str) -> PageResult<NodeId> {
        self.document
            .get_element_by_id(id)
            .ok_or_else(|| PageError::ElementNotFound(id.to_string()))
    }

    pub fn snapshot(&self) -> DomResult<NodeSnapshot> {
        self.document.snapshot(self.document.body())
    }

    pub fn to_html(&self) -> DomResult<String> {
        self.document.outer_html(self.document.body())
    }
}
