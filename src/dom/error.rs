use thiserror::Error;

use crate::dom::node::NodeId;

/// Document tree errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomError {
    #[error("Stale node: {0} is no longer part of the document")]
    StaleNode(NodeId),

    #[error("Not an element: {0}")]
    NotAnElement(NodeId),

    #[error("Detached target: {0} has no parent")]
    DetachedTarget(NodeId),

    #[error("Invalid hierarchy: {0}")]
    InvalidHierarchy(String),
}

pub type DomResult<T> = Result<T, DomError>;
