// In-memory document tree with listeners and subtree mutation records

pub mod document;
pub mod error;
pub mod events;
pub mod mutation;
pub mod node;

pub use document::*;
pub use error::*;
pub use events::*;
pub use mutation::*;
pub use node::{NodeId, NodeSnapshot};
